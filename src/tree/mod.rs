//! Staging Merkle Tree
//!
//! Represents a directory hierarchy as a Merkle tree, where each node
//! (file or directory) has a deterministic hash based on content and structure.
//! The same read interface ([`TreeView`]) is shared by the in-memory tree, the
//! durable index tree and the scanned working tree.

pub mod codec;
pub mod hasher;
pub mod mem;
pub mod node;
pub mod path;
pub mod walker;
pub mod working;

pub use mem::MemTree;
pub use node::{DirectoryNode, FileNode, Node};
pub use path::TreePath;
pub use working::WorkingTree;

use crate::error::TreeError;
use crate::types::Hash;

/// Read-only, path-addressed access to a Merkle tree
pub trait TreeView {
    /// Root directory node
    fn root_node(&self) -> &Node;

    /// Root hash of the whole tree
    fn hash(&self) -> Hash {
        self.root_node().hash()
    }

    /// Look up the node at `path`
    fn get(&self, path: &TreePath) -> Result<&Node, TreeError> {
        let mut node = self.root_node();
        for segment in path.segments() {
            node = match node {
                Node::Directory(dir) => dir.child(segment),
                Node::File(_) => None,
            }
            .ok_or_else(|| TreeError::PathNotExist(path.clone()))?;
        }
        Ok(node)
    }

    /// Depth-first pre-order walk starting at `root`
    ///
    /// `visit` is called for `root` itself and then every descendant, with
    /// siblings in lexical order. Returning an error from `visit` stops the
    /// walk and the error is returned as-is.
    fn traverse<E, F>(&self, root: &TreePath, mut visit: F) -> Result<(), E>
    where
        E: From<TreeError>,
        F: FnMut(&TreePath, &Node) -> Result<(), E>,
    {
        let start = self.get(root)?;
        walk(root, start, &mut visit)
    }
}

fn walk<E, F>(path: &TreePath, node: &Node, visit: &mut F) -> Result<(), E>
where
    E: From<TreeError>,
    F: FnMut(&TreePath, &Node) -> Result<(), E>,
{
    visit(path, node)?;
    if let Node::Directory(dir) = node {
        for (name, child) in dir.children() {
            let child_path = path.join(name)?;
            walk(&child_path, child, visit)?;
        }
    }
    Ok(())
}
