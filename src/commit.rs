//! Commit chain
//!
//! A commit records a snapshot root, its parent commit, an author and a
//! comment. The commit hash covers all four:
//!
//! ```text
//! CommitHash = hash("commit" || snapshot || has_parent (0/1) || parent? ||
//!                   author_len || author || comment_len || comment)
//! ```
//!
//! Lengths are 8-byte big-endian. The stored payload is JSON with hex hashes;
//! loading re-derives the hash and rejects records that disagree with their key.

use crate::error::StorageError;
use crate::store::object;
use crate::store::{ObjectKind, ObjectStore};
use crate::types::{hash_to_hex, hex_hash, Hash};
use blake3::Hasher;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Root hash of the snapshot tree
    #[serde(with = "hex_hash")]
    pub snapshot: Hash,
    /// Previous commit; `None` for the first commit of a branch
    #[serde(with = "hex_hash::option")]
    pub parent: Option<Hash>,
    pub author: String,
    pub comment: String,
}

impl Commit {
    pub fn new(
        snapshot: Hash,
        parent: Option<Hash>,
        author: impl Into<String>,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            snapshot,
            parent,
            author: author.into(),
            comment: comment.into(),
        }
    }

    /// Content hash identifying this commit
    pub fn hash(&self) -> Hash {
        compute_commit_hash(&self.snapshot, self.parent.as_ref(), &self.author, &self.comment)
    }
}

pub fn compute_commit_hash(
    snapshot: &Hash,
    parent: Option<&Hash>,
    author: &str,
    comment: &str,
) -> Hash {
    let mut hasher = Hasher::new();
    hasher.update(b"commit");
    hasher.update(snapshot);
    match parent {
        Some(parent) => {
            hasher.update(&[1u8]);
            hasher.update(parent);
        }
        None => {
            hasher.update(&[0u8]);
        }
    }
    hasher.update(&(author.len() as u64).to_be_bytes());
    hasher.update(author.as_bytes());
    hasher.update(&(comment.len() as u64).to_be_bytes());
    hasher.update(comment.as_bytes());
    *hasher.finalize().as_bytes()
}

/// Store `commit` and return its hash
///
/// The snapshot and parent must already be stored.
pub fn create_commit(store: &dyn ObjectStore, commit: &Commit) -> Result<Hash, StorageError> {
    if !store.contains(ObjectKind::Tree, &commit.snapshot)? {
        return Err(StorageError::ObjectNotFound(commit.snapshot));
    }
    if let Some(parent) = &commit.parent {
        if !store.contains(ObjectKind::Commit, parent)? {
            return Err(StorageError::ObjectNotFound(*parent));
        }
    }

    let hash = commit.hash();
    let payload = serde_json::to_vec(commit)
        .map_err(|e| StorageError::Serialization(format!("Failed to encode commit: {}", e)))?;
    object::put_object(store, &hash, ObjectKind::Commit, &payload)?;
    debug!(
        commit = %hash_to_hex(&hash),
        snapshot = %hash_to_hex(&commit.snapshot),
        "Commit stored"
    );
    Ok(hash)
}

/// Load and verify the commit stored under `hash`
pub fn load_commit(store: &dyn ObjectStore, hash: &Hash) -> Result<Commit, StorageError> {
    let payload = object::get_object(store, hash, ObjectKind::Commit)?;
    let commit: Commit = serde_json::from_slice(&payload).map_err(|e| {
        StorageError::Serialization(format!("Failed to decode commit {}: {}", hash_to_hex(hash), e))
    })?;
    let actual = commit.hash();
    if actual != *hash {
        return Err(StorageError::HashMismatch {
            expected: *hash,
            actual,
        });
    }
    Ok(commit)
}

/// Parent of `commit`, or `None` for a root commit
pub fn prev_commit(
    store: &dyn ObjectStore,
    commit: &Commit,
) -> Result<Option<(Hash, Commit)>, StorageError> {
    commit
        .parent
        .map(|parent| load_commit(store, &parent).map(|c| (parent, c)))
        .transpose()
}

/// Iterator over a commit chain, newest first
///
/// Stops after the root commit, or after yielding the first error.
pub struct History<'a> {
    store: &'a dyn ObjectStore,
    next: Option<Hash>,
}

impl<'a> History<'a> {
    pub fn new(store: &'a dyn ObjectStore, start: Option<Hash>) -> Self {
        Self { store, next: start }
    }
}

impl Iterator for History<'_> {
    type Item = Result<(Hash, Commit), StorageError>;

    fn next(&mut self) -> Option<Self::Item> {
        let hash = self.next.take()?;
        match load_commit(self.store, &hash) {
            Ok(commit) => {
                self.next = commit.parent;
                Some(Ok((hash, commit)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
