//! Tree path validation and normalization
//!
//! Every node in a staging tree is addressed by an absolute, slash-delimited
//! [`TreePath`]. Paths are validated once at construction so tree operations
//! never see empty segments, `.`/`..` components or relative paths.

use crate::error::{StorageError, TreeError};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Validated absolute path into a staging or working tree
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TreePath(String);

impl TreePath {
    /// The root directory `/`
    pub fn root() -> Self {
        TreePath("/".to_string())
    }

    /// Parse and validate an absolute path string
    ///
    /// A trailing slash is stripped, so `/docs/` and `/docs` address the same
    /// node. Segment bytes are kept exactly as given.
    pub fn parse(path: &str) -> Result<Self, TreeError> {
        let normalized = normalize_path_string(path);
        if !normalized.starts_with('/') {
            return Err(TreeError::InvalidPath(format!(
                "path must be absolute: {:?}",
                path
            )));
        }
        if normalized == "/" {
            return Ok(Self::root());
        }
        for segment in normalized[1..].split('/') {
            validate_name(segment).map_err(|reason| {
                TreeError::InvalidPath(format!("{:?}: {}", path, reason))
            })?;
        }
        Ok(TreePath(normalized))
    }

    /// Build a tree path from a path relative to the repository root
    pub fn from_relative(relative: &Path) -> Result<Self, TreeError> {
        let mut result = Self::root();
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| {
                        TreeError::InvalidPath(format!("non UTF-8 path: {:?}", relative))
                    })?;
                    result = result.join(name)?;
                }
                Component::CurDir => {}
                _ => {
                    return Err(TreeError::InvalidPath(format!(
                        "path escapes the tree: {:?}",
                        relative
                    )))
                }
            }
        }
        Ok(result)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Path segments from the root down. Empty for `/`.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment, `None` for the root
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit('/').next()
        }
    }

    /// Parent directory, `None` for the root
    pub fn parent(&self) -> Option<TreePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(TreePath(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Append a single validated child name
    pub fn join(&self, name: &str) -> Result<TreePath, TreeError> {
        validate_name(name)
            .map_err(|reason| TreeError::InvalidPath(format!("{:?}: {}", name, reason)))?;
        if self.is_root() {
            Ok(TreePath(format!("/{}", name)))
        } else {
            Ok(TreePath(format!("{}/{}", self.0, name)))
        }
    }

    /// True if `self` equals `ancestor` or lies beneath it
    pub fn starts_with(&self, ancestor: &TreePath) -> bool {
        if ancestor.is_root() || self == ancestor {
            return true;
        }
        self.0.starts_with(&ancestor.0) && self.0.as_bytes().get(ancestor.0.len()) == Some(&b'/')
    }

    /// Resolve against a filesystem root directory
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.segments() {
            path.push(segment);
        }
        path
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TreePath {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreePath::parse(s)
    }
}

/// Check that a single child name is usable as a path segment
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("empty path segment");
    }
    if name == "." || name == ".." {
        return Err("relative path segment");
    }
    if name.contains('/') {
        return Err("segment contains '/'");
    }
    if name.contains('\0') {
        return Err("segment contains NUL");
    }
    Ok(())
}

/// Canonicalize a filesystem path (resolves symlinks, `..`, `.`)
///
/// Used to locate repository roots; tree paths never touch the filesystem.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, StorageError> {
    dunce::canonicalize(path)
        .map_err(|e| StorageError::io_context(format!("Failed to canonicalize {:?}", path), e))
}

/// Normalize a path string without filesystem access
///
/// Removes trailing slashes (except root). Unicode is left untouched so a
/// name always maps back to the same filesystem entry.
pub fn normalize_path_string(path: &str) -> String {
    let mut result = path.to_string();
    while result.len() > 1 && result.ends_with('/') {
        result.pop();
    }
    result
}
