//! In-memory staging tree
//!
//! Path-addressed create/update/delete over a hierarchy of [`Node`]s. Every
//! mutation recomputes the hashes of the directories along the mutation path
//! on the way back up, so the root hash is always current.

use crate::error::{StorageError, TreeError};
use crate::tree::codec;
use crate::tree::node::{DirectoryNode, Node};
use crate::tree::path::TreePath;
use crate::tree::TreeView;
use crate::types::Hash;

/// Mutable Merkle tree rooted at an empty directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemTree {
    root: Node,
}

impl Default for MemTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeView for MemTree {
    fn root_node(&self) -> &Node {
        &self.root
    }
}

impl MemTree {
    /// Create a tree holding only an empty root directory
    pub fn new() -> Self {
        Self {
            root: Node::empty_directory(),
        }
    }

    pub(crate) fn from_root(root: DirectoryNode) -> Self {
        Self {
            root: Node::Directory(root),
        }
    }

    /// Create an empty directory. The parent must exist.
    pub fn mkdir(&mut self, path: &TreePath) -> Result<(), TreeError> {
        if path.is_root() {
            return Err(TreeError::AlreadyExists(path.clone()));
        }
        self.mutate(path, false, |dir, name, target| {
            if dir.child(name).is_some() {
                return Err(TreeError::AlreadyExists(target.clone()));
            }
            dir.entries_mut()
                .insert(name.to_string(), Node::empty_directory());
            Ok(())
        })
    }

    /// Create a directory along with any missing parents
    ///
    /// Existing directories along the way (including the target) are kept.
    pub fn mkdir_all(&mut self, path: &TreePath) -> Result<(), TreeError> {
        if path.is_root() {
            return Ok(());
        }
        self.mutate(path, true, |dir, name, target| match dir.child(name) {
            Some(Node::Directory(_)) => Ok(()),
            Some(Node::File(_)) => Err(TreeError::NotDirectory(target.clone())),
            None => {
                dir.entries_mut()
                    .insert(name.to_string(), Node::empty_directory());
                Ok(())
            }
        })
    }

    /// Create or overwrite a file. The parent must exist.
    pub fn mkfile(&mut self, path: &TreePath, content_hash: Hash) -> Result<(), TreeError> {
        self.put_file(path, content_hash, false)
    }

    /// Create or overwrite a file, creating missing parents
    pub fn mkfile_all(&mut self, path: &TreePath, content_hash: Hash) -> Result<(), TreeError> {
        self.put_file(path, content_hash, true)
    }

    /// Remove a node. Directories are removed with their whole subtree.
    pub fn delete(&mut self, path: &TreePath) -> Result<(), TreeError> {
        if path.is_root() {
            return Err(TreeError::InvalidPath(
                "cannot delete the root directory".to_string(),
            ));
        }
        self.mutate(path, false, |dir, name, target| {
            dir.entries_mut()
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| TreeError::PathNotExist(target.clone()))
        })
    }

    /// Reset to a single empty root directory
    pub fn clear(&mut self) {
        self.root = Node::empty_directory();
    }

    /// Deterministic byte encoding of the whole tree
    pub fn serialize(&self) -> Result<Vec<u8>, StorageError> {
        codec::encode(self)
    }

    /// Rebuild a tree from [`MemTree::serialize`] output
    pub fn deserialize(bytes: &[u8]) -> Result<Self, StorageError> {
        codec::decode(bytes)
    }

    pub(crate) fn root_directory(&self) -> Option<&DirectoryNode> {
        self.root.as_directory()
    }

    fn put_file(
        &mut self,
        path: &TreePath,
        content_hash: Hash,
        create_parents: bool,
    ) -> Result<(), TreeError> {
        if path.is_root() {
            return Err(TreeError::NotFile(path.clone()));
        }
        self.mutate(path, create_parents, |dir, name, target| {
            if let Some(Node::Directory(_)) = dir.child(name) {
                return Err(TreeError::NotFile(target.clone()));
            }
            dir.entries_mut()
                .insert(name.to_string(), Node::file(content_hash));
            Ok(())
        })
    }

    /// Descend to the parent of `path` and apply `op` to it
    fn mutate<F>(&mut self, path: &TreePath, create_parents: bool, op: F) -> Result<(), TreeError>
    where
        F: FnOnce(&mut DirectoryNode, &str, &TreePath) -> Result<(), TreeError>,
    {
        let segments: Vec<&str> = path.segments().collect();
        let (leaf, parents) = segments
            .split_last()
            .ok_or_else(|| TreeError::InvalidPath("operation requires a non-root path".to_string()))?;
        apply(
            &mut self.root,
            &TreePath::root(),
            parents,
            leaf,
            path,
            create_parents,
            op,
        )
    }
}

fn apply<F>(
    node: &mut Node,
    current: &TreePath,
    parents: &[&str],
    leaf: &str,
    target: &TreePath,
    create_parents: bool,
    op: F,
) -> Result<(), TreeError>
where
    F: FnOnce(&mut DirectoryNode, &str, &TreePath) -> Result<(), TreeError>,
{
    let dir = match node {
        Node::Directory(dir) => dir,
        Node::File(_) => return Err(TreeError::NotDirectory(current.clone())),
    };

    let result = match parents.split_first() {
        None => op(dir, leaf, target),
        Some((name, rest)) => {
            let child_path = current.join(name)?;
            if dir.child(name).is_none() {
                if !create_parents {
                    return Err(TreeError::PathNotExist(child_path));
                }
                dir.entries_mut()
                    .insert(name.to_string(), Node::empty_directory());
            }
            match dir.entries_mut().get_mut(*name) {
                Some(child) => apply(
                    child,
                    &child_path,
                    rest,
                    leaf,
                    target,
                    create_parents,
                    op,
                ),
                None => Err(TreeError::PathNotExist(child_path)),
            }
        }
    };

    // Rehash even on failure: a parent created above may still be in place.
    dir.rehash();
    result
}
