//! Tree node types and directory hash maintenance

use crate::tree::hasher;
use crate::types::Hash;
use std::collections::BTreeMap;

/// File node: a leaf carrying the hash of its content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    pub content_hash: Hash,
}

/// Directory node: name-ordered children plus the Merkle hash over them
///
/// The hash is recomputed whenever the children change, so [`DirectoryNode::hash`]
/// is always consistent with the current children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    children: BTreeMap<String, Node>,
    hash: Hash,
}

/// Merkle node type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(FileNode),
    Directory(DirectoryNode),
}

impl Node {
    pub fn file(content_hash: Hash) -> Self {
        Node::File(FileNode { content_hash })
    }

    pub fn empty_directory() -> Self {
        Node::Directory(DirectoryNode::new())
    }

    /// Content hash for files, Merkle hash for directories
    pub fn hash(&self) -> Hash {
        *self.hash_ref()
    }

    pub(crate) fn hash_ref(&self) -> &Hash {
        match self {
            Node::File(file) => &file.content_hash,
            Node::Directory(dir) => &dir.hash,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Node::Directory(dir) => Some(dir),
            Node::File(_) => None,
        }
    }
}

impl Default for DirectoryNode {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryNode {
    pub fn new() -> Self {
        Self {
            children: BTreeMap::new(),
            hash: hasher::empty_directory_hash(),
        }
    }

    /// Build a directory from already-hashed children
    pub(crate) fn from_children(children: BTreeMap<String, Node>) -> Self {
        let mut dir = Self {
            children,
            hash: [0u8; 32],
        };
        dir.rehash();
        dir
    }

    pub fn hash(&self) -> Hash {
        self.hash
    }

    /// Children in ascending name order
    pub fn children(&self) -> impl ExactSizeIterator<Item = (&str, &Node)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Raw access to the children. Callers must call [`DirectoryNode::rehash`] afterwards.
    pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<String, Node> {
        &mut self.children
    }

    pub(crate) fn rehash(&mut self) {
        self.hash = hasher::compute_directory_hash(
            self.children
                .iter()
                .map(|(name, node)| (name.as_str(), node.hash_ref())),
        );
    }
}
