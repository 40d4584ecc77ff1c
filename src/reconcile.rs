//! Stage-all reconciliation
//!
//! Compares the staging tree with the working tree and brings the staging
//! tree in line for every path it already tracks. Untracked working files are
//! reported but never staged here.

use crate::error::{StorageError, TreeError};
use crate::index::IndexTree;
use crate::snapshot::SnapshotBuilder;
use crate::tree::node::Node;
use crate::tree::{TreePath, TreeView, WorkingTree};
use crate::types::Hash;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

/// Tracked paths whose working copy differs from the staged one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Staged files whose working content hashes differently, with the observed hash
    pub modified: BTreeMap<TreePath, Hash>,
    /// Staged paths missing from the working tree, or whose kind changed
    pub deleted: Vec<TreePath>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.deleted.is_empty()
    }
}

/// Classify every staged path against the working tree
pub fn classify<S, W>(staging: &S, working: &W) -> Result<Reconciliation, TreeError>
where
    S: TreeView + ?Sized,
    W: TreeView + ?Sized,
{
    let mut plan = Reconciliation::default();
    staging.traverse(&TreePath::root(), |path, staged| -> Result<(), TreeError> {
        if path.is_root() {
            return Ok(());
        }
        match (staged, working.get(path)) {
            (_, Err(TreeError::PathNotExist(_))) => plan.deleted.push(path.clone()),
            (_, Err(e)) => return Err(e),
            (Node::File(_), Ok(Node::Directory(_))) | (Node::Directory(_), Ok(Node::File(_))) => {
                plan.deleted.push(path.clone())
            }
            (Node::File(file), Ok(Node::File(current))) => {
                if file.content_hash != current.content_hash {
                    plan.modified.insert(path.clone(), current.content_hash);
                }
            }
            (Node::Directory(_), Ok(Node::Directory(_))) => {}
        }
        Ok(())
    })?;
    Ok(plan)
}

/// Apply `plan` to the index
///
/// Modified files are re-read, stored as blobs and re-staged first. A file
/// whose stored hash no longer matches the classified hash changed during
/// the run and aborts with `HashMismatch`. Deletions follow, deepest first.
#[instrument(skip_all, fields(modified = plan.modified.len(), deleted = plan.deleted.len()))]
pub fn apply(
    index: &mut IndexTree,
    builder: &SnapshotBuilder<'_>,
    working: &WorkingTree,
    plan: &Reconciliation,
) -> Result<(), StorageError> {
    let mut blobs = Vec::with_capacity(plan.modified.len());
    for (path, observed) in &plan.modified {
        let content = working.read_file(path)?;
        let stored = builder.store_blob(&content)?;
        if stored != *observed {
            return Err(StorageError::HashMismatch {
                expected: *observed,
                actual: stored,
            });
        }
        blobs.push((path, stored));
    }

    let mut deleted: Vec<&TreePath> = plan.deleted.iter().collect();
    deleted.sort_unstable_by(|a, b| b.cmp(a));

    index.batch(|tree| {
        for (path, hash) in blobs {
            tree.mkfile(path, hash)?;
        }
        for path in deleted {
            tree.delete(path)?;
        }
        Ok(())
    })?;
    debug!(root_hash = %hex::encode(index.hash()), "Staging tree reconciled");
    Ok(())
}

/// Classify and apply in one step
pub fn stage_all(
    index: &mut IndexTree,
    builder: &SnapshotBuilder<'_>,
    working: &WorkingTree,
) -> Result<Reconciliation, StorageError> {
    let plan = classify(&*index, working)?;
    if !plan.is_empty() {
        apply(index, builder, working, &plan)?;
    }
    Ok(plan)
}

/// Working files that the staging tree does not track
pub fn untracked<S, W>(staging: &S, working: &W) -> Result<Vec<TreePath>, TreeError>
where
    S: TreeView + ?Sized,
    W: TreeView + ?Sized,
{
    let mut found = Vec::new();
    working.traverse(&TreePath::root(), |path, node| -> Result<(), TreeError> {
        if let Node::File(_) = node {
            if !matches!(staging.get(path), Ok(Node::File(_))) {
                found.push(path.clone());
            }
        }
        Ok(())
    })?;
    Ok(found)
}

/// File-level differences between two trees
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    pub added: Vec<TreePath>,
    pub modified: Vec<TreePath>,
    pub deleted: Vec<TreePath>,
}

impl TreeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }
}

/// Compare the files of `old` and `new`, in path order
pub fn diff_files<A, B>(old: &A, new: &B) -> Result<TreeDiff, TreeError>
where
    A: TreeView + ?Sized,
    B: TreeView + ?Sized,
{
    let old_files = file_hashes(old)?;
    let new_files = file_hashes(new)?;
    let mut diff = TreeDiff::default();

    let paths: BTreeSet<&TreePath> = old_files.keys().chain(new_files.keys()).collect();
    for path in paths {
        match (old_files.get(path), new_files.get(path)) {
            (None, Some(_)) => diff.added.push(path.clone()),
            (Some(_), None) => diff.deleted.push(path.clone()),
            (Some(a), Some(b)) if a != b => diff.modified.push(path.clone()),
            _ => {}
        }
    }
    Ok(diff)
}

fn file_hashes<T: TreeView + ?Sized>(tree: &T) -> Result<BTreeMap<TreePath, Hash>, TreeError> {
    let mut files = BTreeMap::new();
    tree.traverse(&TreePath::root(), |path, node| -> Result<(), TreeError> {
        if let Node::File(file) = node {
            files.insert(path.clone(), file.content_hash);
        }
        Ok(())
    })?;
    Ok(files)
}
