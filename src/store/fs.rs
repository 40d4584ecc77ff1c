//! Filesystem object store
//!
//! Objects live at `{root}/{kind}/{hex[0..2]}/{hex[2..4]}/{hex}`. The two-level
//! fanout keeps directories small; identical (kind, hash) pairs share one path,
//! which is what makes stores idempotent.

use crate::error::StorageError;
use crate::store::{ObjectKind, ObjectStore};
use crate::types::{hash_to_hex, Hash};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Content-addressed object storage on the local filesystem
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| {
            StorageError::io_context(format!("Failed to create objects directory {:?}", root), e)
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem location of the object of `kind` keyed by `hash`
    pub fn object_path(&self, kind: ObjectKind, hash: &Hash) -> PathBuf {
        let hex = hash_to_hex(hash);
        self.root
            .join(kind.as_str())
            .join(&hex[0..2])
            .join(&hex[2..4])
            .join(hex)
    }
}

impl ObjectStore for FsObjectStore {
    fn contains(&self, kind: ObjectKind, hash: &Hash) -> Result<bool, StorageError> {
        Ok(self.object_path(kind, hash).is_file())
    }

    fn get(&self, kind: ObjectKind, hash: &Hash) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.object_path(kind, hash);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io_context(
                format!("Failed to read object from {:?}", path),
                e,
            )),
        }
    }

    fn put(&self, kind: ObjectKind, hash: &Hash, payload: &[u8]) -> Result<bool, StorageError> {
        let path = self.object_path(kind, hash);
        if path.is_file() {
            return Ok(false);
        }
        write_atomic(&path, payload)?;
        trace!(kind = %kind, object = %hash_to_hex(hash), bytes = payload.len(), "Object written");
        Ok(true)
    }
}

/// Replace `path` with `bytes` so readers see either the old or the new file
///
/// Writes to a sibling temporary file, syncs it, then renames it into place.
/// Parent directories are created as needed.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            StorageError::io_context(format!("Failed to create parent directory {:?}", parent), e)
        })?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.tmp-{}", file_name, std::process::id()));

    let write_temp = || -> std::io::Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()
    };
    if let Err(e) = write_temp() {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::io_context(
            format!("Failed to write {:?}", temp_path),
            e,
        ));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StorageError::io_context(format!("Failed to rename temp file to {:?}", path), e)
    })
}
