//! Working tree: read-only Merkle view of the files on disk
//!
//! Built by scanning the repository directory once; reconciliation and status
//! compare it against the staging tree through [`TreeView`].

use crate::error::StorageError;
use crate::tree::hasher;
use crate::tree::mem::MemTree;
use crate::tree::node::Node;
use crate::tree::path::TreePath;
use crate::tree::walker::{Entry, Walker, WalkerConfig};
use crate::tree::TreeView;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Snapshot of the working directory, hashed with the same rules as the index
#[derive(Debug, Clone)]
pub struct WorkingTree {
    root: PathBuf,
    tree: MemTree,
}

impl TreeView for WorkingTree {
    fn root_node(&self) -> &Node {
        self.tree.root_node()
    }
}

impl WorkingTree {
    /// Scan `root` and hash every regular file beneath it
    #[instrument(skip(root, config), fields(root = %root.display()))]
    pub fn scan(root: &Path, config: &WalkerConfig) -> Result<Self, StorageError> {
        let start = Instant::now();
        let entries = Walker::with_config(root.to_path_buf(), config.clone()).walk()?;

        let mut tree = MemTree::new();
        let mut file_count = 0usize;
        for entry in entries {
            let relative = match entry.path().strip_prefix(root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };
            let tree_path = match TreePath::from_relative(relative) {
                Ok(path) => path,
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e, "Skipping unaddressable path");
                    continue;
                }
            };

            match entry {
                Entry::Directory { .. } => tree.mkdir_all(&tree_path)?,
                Entry::File { ref path } => {
                    let content = read_bytes(path)?;
                    tree.mkfile_all(&tree_path, hasher::compute_content_hash(&content))?;
                    file_count += 1;
                }
            }
        }

        debug!(
            file_count,
            root_hash = %hex::encode(tree.hash()),
            duration_ms = start.elapsed().as_millis(),
            "Working tree scanned"
        );

        Ok(Self {
            root: root.to_path_buf(),
            tree,
        })
    }

    /// Filesystem directory this view was scanned from
    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    /// Read the current bytes of a file in the working directory
    pub fn read_file(&self, path: &TreePath) -> Result<Vec<u8>, StorageError> {
        read_bytes(&path.to_fs_path(&self.root))
    }

    /// The scanned tree as a plain in-memory tree
    pub fn as_mem_tree(&self) -> &MemTree {
        &self.tree
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, StorageError> {
    std::fs::read(path).map_err(|e| StorageError::io_context(format!("Failed to read {:?}", path), e))
}
