//! Hash computation for tree nodes using BLAKE3

use crate::types::Hash;
use blake3::Hasher;

/// Compute content hash for file bytes
///
/// This is the leaf hash of the Merkle tree and the key of a blob object.
pub fn compute_content_hash(content: &[u8]) -> Hash {
    let mut hasher = Hasher::new();
    hasher.update(content);
    *hasher.finalize().as_bytes()
}

/// Compute the hash of a directory from its children
///
/// DirHash = hash("tree" || children_count || (name_len || name || child_hash)*)
///
/// Children must be sorted by name. The empty directory hashes the tag and a
/// zero count, so it has a well-defined value like any other directory.
pub fn compute_directory_hash<'a, I>(children: I) -> Hash
where
    I: IntoIterator<Item = (&'a str, &'a Hash)>,
    I::IntoIter: ExactSizeIterator,
{
    let children = children.into_iter();
    let mut hasher = Hasher::new();

    // Hash type discriminator
    hasher.update(b"tree");

    // Hash children count (8 bytes, big-endian)
    hasher.update(&(children.len() as u64).to_be_bytes());

    for (name, child_hash) in children {
        hasher.update(&(name.len() as u64).to_be_bytes());
        hasher.update(name.as_bytes());
        hasher.update(child_hash);
    }

    *hasher.finalize().as_bytes()
}

/// Hash of a directory with no children
pub fn empty_directory_hash() -> Hash {
    compute_directory_hash(std::iter::empty::<(&str, &Hash)>())
}
