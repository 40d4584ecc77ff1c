//! Hasher Implementation Verification Tests
//!
//! Checks the staging tree hashes against BLAKE3 computed directly, following
//! the documented directory hash layout.

use crate::integration::test_utils::tp;
use blake3::Hasher as Blake3Hasher;
use twig::tree::hasher;
use twig::tree::{MemTree, TreeView};

/// Content hash matches BLAKE3 directly
#[test]
fn test_content_hash_matches_blake3() {
    let content = b"test content";
    let blake3_hash = *blake3::hash(content).as_bytes();
    assert_eq!(hasher::compute_content_hash(content), blake3_hash);
}

/// Directory hash follows "tree" || count || (name_len || name || hash)*
#[test]
fn test_directory_hash_layout() {
    let a = hasher::compute_content_hash(b"a");
    let b = hasher::compute_content_hash(b"b");

    let mut expected = Blake3Hasher::new();
    expected.update(b"tree");
    expected.update(&2u64.to_be_bytes());
    expected.update(&5u64.to_be_bytes());
    expected.update(b"a.txt");
    expected.update(&a);
    expected.update(&5u64.to_be_bytes());
    expected.update(b"b.txt");
    expected.update(&b);
    let expected = *expected.finalize().as_bytes();

    let mut tree = MemTree::new();
    tree.mkfile(&tp("/b.txt"), b).unwrap();
    tree.mkfile(&tp("/a.txt"), a).unwrap();
    assert_eq!(tree.hash(), expected);
}

/// The empty directory has a fixed, well-defined hash
#[test]
fn test_empty_directory_hash() {
    let mut expected = Blake3Hasher::new();
    expected.update(b"tree");
    expected.update(&0u64.to_be_bytes());
    assert_eq!(hasher::empty_directory_hash(), *expected.finalize().as_bytes());
    assert_eq!(MemTree::new().hash(), hasher::empty_directory_hash());
}

/// Changing a nested file rehashes every ancestor
#[test]
fn test_nested_directory_hash_changes_with_child() {
    let mut tree = MemTree::new();
    tree.mkfile_all(&tp("/x/y/z.txt"), [1u8; 32]).unwrap();
    let before = tree.hash();
    let dir_before = tree.get(&tp("/x")).unwrap().hash();

    tree.mkfile(&tp("/x/y/z.txt"), [2u8; 32]).unwrap();
    assert_ne!(tree.hash(), before);
    assert_ne!(tree.get(&tp("/x")).unwrap().hash(), dir_before);
}
