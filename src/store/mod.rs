//! Object Store
//!
//! Content-addressed storage for blobs, snapshot trees and commits. Every
//! payload is keyed by its kind and the hash of the object it holds, and is
//! written at most once: storing an object that is already present is a no-op.

pub mod fs;
pub mod object;
pub mod persistence;

pub use fs::FsObjectStore;
pub use object::{EntryKind, TreeEntry};
pub use persistence::SledObjectStore;

use crate::error::StorageError;
use crate::types::Hash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Directory (filesystem backend) or database (sled backend) name under `.twig`
pub const OBJECTS_DIR_NAME: &str = "objects";
pub const OBJECTS_DB_NAME: &str = "objects.db";

/// Kind of a stored object
///
/// Every kind has its own key space, so a blob and a tree whose hashes happen
/// to coincide are still two distinct objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    /// Name of the kind's namespace: a directory (fs) or a sled tree
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw payload storage keyed by (kind, hash)
///
/// Implementations only move bytes and own the existence check on `put`;
/// integrity checks live in [`object`].
pub trait ObjectStore: Send + Sync {
    fn contains(&self, kind: ObjectKind, hash: &Hash) -> Result<bool, StorageError>;

    /// Fetch the payload stored under `hash` in `kind`'s namespace, if any
    fn get(&self, kind: ObjectKind, hash: &Hash) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `payload` under `hash` unless already present
    ///
    /// Returns `true` when the payload was newly written.
    fn put(&self, kind: ObjectKind, hash: &Hash, payload: &[u8]) -> Result<bool, StorageError>;

    /// Make every completed `put` durable
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }
}

/// Which object store implementation a repository uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One file per object under `.twig/objects/<kind>`
    #[default]
    Fs,
    /// A single sled database at `.twig/objects.db`, one tree per kind
    Sled,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Fs => write!(f, "fs"),
            StorageBackend::Sled => write!(f, "sled"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fs" => Ok(StorageBackend::Fs),
            "sled" => Ok(StorageBackend::Sled),
            other => Err(format!("Unknown storage backend: {}", other)),
        }
    }
}

/// Open the object store for the repository metadata directory `repo_dir`
pub fn open_store(
    backend: StorageBackend,
    repo_dir: &Path,
) -> Result<Box<dyn ObjectStore>, StorageError> {
    match backend {
        StorageBackend::Fs => Ok(Box::new(FsObjectStore::new(
            repo_dir.join(OBJECTS_DIR_NAME),
        )?)),
        StorageBackend::Sled => Ok(Box::new(SledObjectStore::new(
            repo_dir.join(OBJECTS_DB_NAME),
        )?)),
    }
}
