//! Durable staging index
//!
//! A [`MemTree`] backed by a single file. Every successful mutation is written
//! through before it becomes visible: the change is applied to a copy, the
//! copy is encoded and atomically written, and only then does it replace the
//! in-memory tree. A failed mutation leaves both memory and disk untouched.

use crate::error::{StorageError, TreeError};
use crate::store::fs::write_atomic;
use crate::tree::node::Node;
use crate::tree::{MemTree, TreePath, TreeView};
use crate::types::{hash_to_hex, Hash};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// File name of the index inside `.twig`
pub const INDEX_FILE_NAME: &str = "index";

/// Staging tree persisted after every mutation
#[derive(Debug)]
pub struct IndexTree {
    path: PathBuf,
    tree: MemTree,
}

impl TreeView for IndexTree {
    fn root_node(&self) -> &Node {
        self.tree.root_node()
    }
}

impl IndexTree {
    /// Load the index at `path`, or create and persist an empty one
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        match fs::read(&path) {
            Ok(bytes) => {
                let tree = MemTree::deserialize(&bytes)?;
                debug!(root_hash = %hash_to_hex(&tree.hash()), "Index loaded");
                Ok(Self { path, tree })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let tree = MemTree::new();
                write_atomic(&path, &tree.serialize()?)?;
                debug!("Empty index created");
                Ok(Self { path, tree })
            }
            Err(e) => Err(StorageError::io_context(
                format!("Failed to read index {:?}", path),
                e,
            )),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current in-memory view
    pub fn tree(&self) -> &MemTree {
        &self.tree
    }

    pub fn mkdir(&mut self, path: &TreePath) -> Result<(), StorageError> {
        self.write_through(|tree| tree.mkdir(path))
    }

    pub fn mkdir_all(&mut self, path: &TreePath) -> Result<(), StorageError> {
        self.write_through(|tree| tree.mkdir_all(path))
    }

    pub fn mkfile(&mut self, path: &TreePath, content_hash: Hash) -> Result<(), StorageError> {
        self.write_through(|tree| tree.mkfile(path, content_hash))
    }

    pub fn mkfile_all(&mut self, path: &TreePath, content_hash: Hash) -> Result<(), StorageError> {
        self.write_through(|tree| tree.mkfile_all(path, content_hash))
    }

    pub fn delete(&mut self, path: &TreePath) -> Result<(), StorageError> {
        self.write_through(|tree| tree.delete(path))
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.write_through(|tree| {
            tree.clear();
            Ok(())
        })
    }

    /// Apply several mutations and persist once
    ///
    /// Either all of them become visible or none do.
    pub fn batch<F>(&mut self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut MemTree) -> Result<(), StorageError>,
    {
        let mut next = self.tree.clone();
        mutate(&mut next)?;
        self.publish(next)
    }

    fn write_through<F>(&mut self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut MemTree) -> Result<(), TreeError>,
    {
        let mut next = self.tree.clone();
        mutate(&mut next)?;
        self.publish(next)
    }

    fn publish(&mut self, next: MemTree) -> Result<(), StorageError> {
        if next == self.tree {
            return Ok(());
        }
        write_atomic(&self.path, &next.serialize()?)?;
        self.tree = next;
        Ok(())
    }
}
