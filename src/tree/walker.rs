//! Filesystem walker for scanning the working directory

use crate::error::StorageError;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Name of the repository metadata directory; never part of the working tree.
pub const REPO_DIR_NAME: &str = ".twig";

/// Filesystem entry types
#[derive(Debug, Clone)]
pub enum Entry {
    /// A regular file
    File { path: PathBuf },
    /// A directory entry with its path
    Directory { path: PathBuf },
}

impl Entry {
    pub fn path(&self) -> &Path {
        match self {
            Entry::File { path } | Entry::Directory { path } => path,
        }
    }
}

/// Filesystem walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false for determinism)
    pub follow_symlinks: bool,
    /// Entry names to skip anywhere below the root (e.g. ".git")
    pub ignore_patterns: Vec<String>,
    /// Maximum depth to traverse (None = unlimited)
    pub max_depth: Option<usize>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            ignore_patterns: vec![REPO_DIR_NAME.to_string(), ".git".to_string()],
            max_depth: None,
        }
    }
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Walk the filesystem and collect all entries below the root
    ///
    /// Returns entries sorted by path for determinism. Ignored directories
    /// are not descended into. Symlinks are skipped unless followed.
    pub fn walk(&self) -> Result<Vec<Entry>, StorageError> {
        let mut entries = Vec::new();

        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(self.config.max_depth.unwrap_or(usize::MAX))
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.should_ignore(entry));

        for entry in walker {
            let entry = entry.map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to walk directory: {}", e),
                ))
            })?;

            // Skip the root directory itself (we only want its contents)
            if entry.depth() == 0 {
                continue;
            }

            let path = entry.path().to_path_buf();
            let metadata = entry.metadata().map_err(|e| {
                StorageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("Failed to read metadata for {:?}: {}", path, e),
                ))
            })?;

            if metadata.is_file() {
                entries.push(Entry::File { path });
            } else if metadata.is_dir() {
                entries.push(Entry::Directory { path });
            }
        }

        entries.sort_by(|a, b| a.path().cmp(b.path()));

        Ok(entries)
    }

    /// Check if an entry's own name matches an ignore pattern
    ///
    /// The metadata directory is always ignored, whatever the configuration says.
    fn should_ignore(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        name == REPO_DIR_NAME
            || self
                .config
                .ignore_patterns
                .iter()
                .any(|pattern| name == pattern.as_str())
    }
}
