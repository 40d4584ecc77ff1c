//! Branch references
//!
//! `.twig/HEAD` holds either `ref:<branch>` or a bare commit hash (detached).
//! Branch heads live in `.twig/refs/heads/<branch>` as a hex hash. Every ref
//! file is replaced atomically.

use crate::error::StorageError;
use crate::store::fs::write_atomic;
use crate::types::{hash_from_hex, hash_to_hex, Hash};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const HEAD_FILE_NAME: &str = "HEAD";
pub const DEFAULT_BRANCH: &str = "master";
const BRANCH_PREFIX: &str = "ref:";

/// What HEAD points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadRef {
    Branch(String),
    Detached(Hash),
}

impl HeadRef {
    fn encode(&self) -> String {
        match self {
            HeadRef::Branch(name) => format!("{}{}\n", BRANCH_PREFIX, name),
            HeadRef::Detached(hash) => format!("{}\n", hash_to_hex(hash)),
        }
    }

    fn decode(contents: &str) -> Result<Self, StorageError> {
        let contents = contents.trim();
        if let Some(name) = contents.strip_prefix(BRANCH_PREFIX) {
            let name = name.trim();
            validate_branch_name(name)?;
            return Ok(HeadRef::Branch(name.to_string()));
        }
        hash_from_hex(contents)
            .map(HeadRef::Detached)
            .ok_or_else(|| StorageError::InvalidRef(format!("Malformed HEAD: {:?}", contents)))
    }
}

/// Reads and writes HEAD and branch heads under one metadata directory
#[derive(Debug, Clone)]
pub struct RefStore {
    dir: PathBuf,
}

impl RefStore {
    pub fn new<P: AsRef<Path>>(repo_dir: P) -> Self {
        Self {
            dir: repo_dir.as_ref().to_path_buf(),
        }
    }

    fn head_path(&self) -> PathBuf {
        self.dir.join(HEAD_FILE_NAME)
    }

    fn branch_path(&self, name: &str) -> PathBuf {
        self.dir.join("refs").join("heads").join(name)
    }

    /// Parse HEAD; `NoHeadFile` when it has never been written
    pub fn head(&self) -> Result<HeadRef, StorageError> {
        match read_ref_file(&self.head_path())? {
            Some(contents) => HeadRef::decode(&contents),
            None => Err(StorageError::NoHeadFile),
        }
    }

    /// Branch HEAD points at; `NotBranch` when detached
    pub fn current_branch(&self) -> Result<String, StorageError> {
        match self.head()? {
            HeadRef::Branch(name) => Ok(name),
            HeadRef::Detached(_) => Err(StorageError::NotBranch),
        }
    }

    pub fn write_head(&self, head: &HeadRef) -> Result<(), StorageError> {
        if let HeadRef::Branch(name) = head {
            validate_branch_name(name)?;
        }
        write_atomic(&self.head_path(), head.encode().as_bytes())?;
        debug!(head = ?head, "HEAD updated");
        Ok(())
    }

    /// Newest commit of `name`, or `None` for a branch without commits
    pub fn branch_head(&self, name: &str) -> Result<Option<Hash>, StorageError> {
        validate_branch_name(name)?;
        match read_ref_file(&self.branch_path(name))? {
            Some(contents) => hash_from_hex(&contents).map(Some).ok_or_else(|| {
                StorageError::InvalidRef(format!("Malformed head of branch {}", name))
            }),
            None => Ok(None),
        }
    }

    pub fn update_branch_head(&self, name: &str, commit: &Hash) -> Result<(), StorageError> {
        validate_branch_name(name)?;
        let contents = format!("{}\n", hash_to_hex(commit));
        write_atomic(&self.branch_path(name), contents.as_bytes())?;
        debug!(branch = name, commit = %hash_to_hex(commit), "Branch head updated");
        Ok(())
    }

    /// Commit HEAD resolves to
    ///
    /// `NoHeadFile` when HEAD is missing; `None` when it names a branch that has
    /// no commits yet.
    pub fn head_commit(&self) -> Result<Option<Hash>, StorageError> {
        match self.head()? {
            HeadRef::Branch(name) => self.branch_head(&name),
            HeadRef::Detached(hash) => Ok(Some(hash)),
        }
    }
}

/// Branch names are single path segments without whitespace
pub fn validate_branch_name(name: &str) -> Result<(), StorageError> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with('.')
        && !name
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control());
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidRef(format!(
            "Invalid branch name: {:?}",
            name
        )))
    }
}

fn read_ref_file(path: &Path) -> Result<Option<String>, StorageError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::io_context(
            format!("Failed to read {:?}", path),
            e,
        )),
    }
}
