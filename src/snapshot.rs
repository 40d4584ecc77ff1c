//! Snapshot builder
//!
//! Turns a staging tree into stored tree objects, bottom-up, so that a tree
//! object is only ever written after every object it references. A stored
//! tree object therefore implies a complete subtree, which lets a rebuild skip
//! any directory whose hash is already present.

use crate::error::StorageError;
use crate::store::object::{self, EntryKind, TreeEntry};
use crate::store::{ObjectKind, ObjectStore};
use crate::tree::node::{DirectoryNode, Node};
use crate::tree::{MemTree, TreeView};
use crate::types::{hash_to_hex, Hash};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, instrument};

/// Outcome of [`SnapshotBuilder::build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotReport {
    /// Hash of the root tree object; equals the staging tree's root hash
    pub root: Hash,
    /// Tree objects newly written by this build
    pub objects_written: usize,
}

/// Writes and reads snapshots against one object store
pub struct SnapshotBuilder<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Store file content as a blob and return its hash
    pub fn store_blob(&self, content: &[u8]) -> Result<Hash, StorageError> {
        let (hash, _) = object::write_blob(self.store, content)?;
        Ok(hash)
    }

    /// Read a stored blob, verified against its hash
    pub fn read_blob(&self, hash: &Hash) -> Result<Vec<u8>, StorageError> {
        object::read_blob(self.store, hash)
    }

    /// Persist every directory of `tree` as a tree object
    ///
    /// Every file's blob must already be stored; a missing blob fails with
    /// `ObjectNotFound`. Rebuilding an unchanged tree writes nothing.
    #[instrument(skip_all)]
    pub fn build<T: TreeView + ?Sized>(&self, tree: &T) -> Result<SnapshotReport, StorageError> {
        let start = Instant::now();
        let root = match tree.root_node() {
            Node::Directory(dir) => dir,
            Node::File(_) => {
                return Err(StorageError::Serialization(
                    "Snapshot root is not a directory".to_string(),
                ))
            }
        };

        let mut objects_written = 0;
        let root_hash = self.build_directory(root, &mut objects_written)?;

        debug!(
            root = %hash_to_hex(&root_hash),
            objects_written,
            duration_ms = start.elapsed().as_millis(),
            "Snapshot built"
        );
        Ok(SnapshotReport {
            root: root_hash,
            objects_written,
        })
    }

    fn build_directory(
        &self,
        dir: &DirectoryNode,
        objects_written: &mut usize,
    ) -> Result<Hash, StorageError> {
        if self.store.contains(ObjectKind::Tree, &dir.hash())? {
            return Ok(dir.hash());
        }

        let mut entries = Vec::with_capacity(dir.len());
        for (name, child) in dir.children() {
            let (kind, hash) = match child {
                Node::File(file) => {
                    if !self.store.contains(ObjectKind::Blob, &file.content_hash)? {
                        return Err(StorageError::ObjectNotFound(file.content_hash));
                    }
                    (EntryKind::Blob, file.content_hash)
                }
                Node::Directory(sub) => {
                    (EntryKind::Tree, self.build_directory(sub, objects_written)?)
                }
            };
            entries.push(TreeEntry {
                name: name.to_string(),
                kind,
                hash,
            });
        }

        let (hash, written) = object::write_tree(self.store, &entries)?;
        if hash != dir.hash() {
            return Err(StorageError::HashMismatch {
                expected: dir.hash(),
                actual: hash,
            });
        }
        if written {
            *objects_written += 1;
        }
        Ok(hash)
    }

    /// Rebuild the staging tree recorded by the snapshot rooted at `root`
    pub fn load(&self, root: &Hash) -> Result<MemTree, StorageError> {
        let dir = self.load_directory(root)?;
        Ok(MemTree::from_root(dir))
    }

    fn load_directory(&self, hash: &Hash) -> Result<DirectoryNode, StorageError> {
        let mut children = BTreeMap::new();
        for entry in object::read_tree(self.store, hash)? {
            let node = match entry.kind {
                EntryKind::Blob => Node::file(entry.hash),
                EntryKind::Tree => Node::Directory(self.load_directory(&entry.hash)?),
            };
            children.insert(entry.name, node);
        }
        Ok(DirectoryNode::from_children(children))
    }
}
