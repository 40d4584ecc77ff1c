//! Sled-backed object store

use crate::error::StorageError;
use crate::store::{ObjectKind, ObjectStore};
use crate::types::{hash_to_hex, Hash};
use std::path::Path;
use tracing::trace;

/// Object store keeping each object kind in its own sled tree
pub struct SledObjectStore {
    db: sled::Db,
    blobs: sled::Tree,
    trees: sled::Tree,
    commits: sled::Tree,
}

impl SledObjectStore {
    /// Open (or create) the database at `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| backend_error("open sled database", e))?;
        let open = |kind: ObjectKind| {
            db.open_tree(kind.as_str())
                .map_err(|e| backend_error("open sled tree", e))
        };
        Ok(Self {
            blobs: open(ObjectKind::Blob)?,
            trees: open(ObjectKind::Tree)?,
            commits: open(ObjectKind::Commit)?,
            db,
        })
    }

    fn tree(&self, kind: ObjectKind) -> &sled::Tree {
        match kind {
            ObjectKind::Blob => &self.blobs,
            ObjectKind::Tree => &self.trees,
            ObjectKind::Commit => &self.commits,
        }
    }
}

impl ObjectStore for SledObjectStore {
    fn contains(&self, kind: ObjectKind, hash: &Hash) -> Result<bool, StorageError> {
        self.tree(kind)
            .contains_key(hash.as_slice())
            .map_err(|e| backend_error("check object", e))
    }

    fn get(&self, kind: ObjectKind, hash: &Hash) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .tree(kind)
            .get(hash.as_slice())
            .map_err(|e| backend_error("get object", e))?
            .map(|value| value.to_vec()))
    }

    fn put(&self, kind: ObjectKind, hash: &Hash, payload: &[u8]) -> Result<bool, StorageError> {
        // Insert only when absent; an existing payload under the same key wins.
        let outcome = self
            .tree(kind)
            .compare_and_swap(hash.as_slice(), None::<&[u8]>, Some(payload.to_vec()))
            .map_err(|e| backend_error("put object", e))?;
        let written = outcome.is_ok();
        if written {
            trace!(kind = %kind, object = %hash_to_hex(hash), bytes = payload.len(), "Object written");
        }
        Ok(written)
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db
            .flush()
            .map_err(|e| backend_error("flush sled database", e))?;
        Ok(())
    }
}

fn backend_error(action: &str, err: sled::Error) -> StorageError {
    match err {
        sled::Error::Io(io) => StorageError::io_context(format!("Failed to {}", action), io),
        other => StorageError::Backend(format!("Failed to {}: {}", action, other)),
    }
}
