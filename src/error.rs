//! Error types for the twig version-control core.

use crate::tree::path::TreePath;
use crate::types::{hash_to_hex, Hash};
use std::path::PathBuf;
use thiserror::Error;

/// Structural errors raised by path-addressed tree operations.
///
/// These are recoverable: callers match on them to decide what to do next.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Path does not exist: {0}")]
    PathNotExist(TreePath),

    #[error("Not a directory: {0}")]
    NotDirectory(TreePath),

    #[error("Not a file: {0}")]
    NotFile(TreePath),

    #[error("Path already exists: {0}")]
    AlreadyExists(TreePath),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("HEAD does not reference a branch")]
    NotBranch,

    #[error("No HEAD file: the repository has no history yet")]
    NoHeadFile,

    #[error("Object not found: {}", hash_to_hex(.0))]
    ObjectNotFound(Hash),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Hash mismatch: expected {}, got {}", hash_to_hex(.expected), hash_to_hex(.actual))]
    HashMismatch { expected: Hash, actual: Hash },

    #[error("Invalid reference: {0}")]
    InvalidRef(String),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Integrity violations: the on-disk state can no longer be trusted.
    ///
    /// Callers must abort the current operation on these and never retry.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(
            self,
            StorageError::HashMismatch { .. }
                | StorageError::Serialization(_)
                | StorageError::ObjectNotFound(_)
        )
    }

    /// The structural tree error behind this error, if any
    pub fn as_tree_error(&self) -> Option<&TreeError> {
        match self {
            StorageError::Tree(e) => Some(e),
            _ => None,
        }
    }

    pub(crate) fn io_context(context: String, err: std::io::Error) -> Self {
        StorageError::IoError(std::io::Error::new(err.kind(), format!("{}: {}", context, err)))
    }
}

/// Repository-level errors surfaced to the command line
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not a twig repository (or any parent up to /): {0}")]
    NotARepository(PathBuf),

    #[error("Repository already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("Path is outside the repository: {0}")]
    OutsideRepository(PathBuf),
}

impl ApiError {
    /// See [`StorageError::is_unrecoverable`]
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, ApiError::Storage(e) if e.is_unrecoverable())
    }
}

impl From<TreeError> for ApiError {
    fn from(err: TreeError) -> Self {
        ApiError::Storage(StorageError::Tree(err))
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
