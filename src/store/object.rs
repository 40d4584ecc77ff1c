//! Typed objects on top of raw store payloads
//!
//! - blob: the raw file bytes, keyed by their content hash
//! - tree: bincode of the sorted entry list, keyed by the directory hash
//! - commit: see [`crate::commit`]
//!
//! Every read re-derives the key from the payload and rejects payloads whose
//! hash does not match.

use crate::error::StorageError;
use crate::store::{ObjectKind, ObjectStore};
use crate::tree::hasher;
use crate::tree::path::validate_name;
use crate::types::{hash_to_hex, Hash};
use bincode::Options;
use serde::{Deserialize, Serialize};

/// Kind of a snapshot tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Blob,
    Tree,
}

/// One child of a stored directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
    pub hash: Hash,
}

fn bincode_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

/// Store `payload` as an object of `kind` under `hash`
///
/// Returns `true` when the object was newly written.
pub fn put_object(
    store: &dyn ObjectStore,
    hash: &Hash,
    kind: ObjectKind,
    payload: &[u8],
) -> Result<bool, StorageError> {
    store.put(kind, hash, payload)
}

/// Fetch the payload of the object of `kind` stored under `hash`
///
/// Fails with `ObjectNotFound` when absent. The payload itself is not
/// verified here.
pub fn get_object(
    store: &dyn ObjectStore,
    hash: &Hash,
    kind: ObjectKind,
) -> Result<Vec<u8>, StorageError> {
    store
        .get(kind, hash)?
        .ok_or(StorageError::ObjectNotFound(*hash))
}

/// Store file content; returns its hash and whether it was newly written
pub fn write_blob(store: &dyn ObjectStore, content: &[u8]) -> Result<(Hash, bool), StorageError> {
    let hash = hasher::compute_content_hash(content);
    let written = put_object(store, &hash, ObjectKind::Blob, content)?;
    Ok((hash, written))
}

/// Read file content back, verifying it still hashes to `hash`
pub fn read_blob(store: &dyn ObjectStore, hash: &Hash) -> Result<Vec<u8>, StorageError> {
    let content = get_object(store, hash, ObjectKind::Blob)?;
    let actual = hasher::compute_content_hash(&content);
    if actual != *hash {
        return Err(StorageError::HashMismatch {
            expected: *hash,
            actual,
        });
    }
    Ok(content)
}

/// Directory hash of an entry list, using the staging tree's rule
pub fn tree_hash(entries: &[TreeEntry]) -> Hash {
    hasher::compute_directory_hash(entries.iter().map(|e| (e.name.as_str(), &e.hash)))
}

/// Store a directory listing; entries must be sorted by name
pub fn write_tree(
    store: &dyn ObjectStore,
    entries: &[TreeEntry],
) -> Result<(Hash, bool), StorageError> {
    check_entry_order(entries)?;
    let hash = tree_hash(entries);
    let payload = bincode_options()
        .serialize(entries)
        .map_err(|e| StorageError::Serialization(format!("Failed to encode tree: {}", e)))?;
    let written = put_object(store, &hash, ObjectKind::Tree, &payload)?;
    Ok((hash, written))
}

/// Read a directory listing, verifying order and hash
pub fn read_tree(store: &dyn ObjectStore, hash: &Hash) -> Result<Vec<TreeEntry>, StorageError> {
    let payload = get_object(store, hash, ObjectKind::Tree)?;
    let entries: Vec<TreeEntry> = bincode_options()
        .with_limit(payload.len() as u64)
        .deserialize(&payload)
        .map_err(|e| {
            StorageError::Serialization(format!(
                "Failed to decode tree {}: {}",
                hash_to_hex(hash),
                e
            ))
        })?;
    check_entry_order(&entries)?;
    let actual = tree_hash(&entries);
    if actual != *hash {
        return Err(StorageError::HashMismatch {
            expected: *hash,
            actual,
        });
    }
    Ok(entries)
}

fn check_entry_order(entries: &[TreeEntry]) -> Result<(), StorageError> {
    for entry in entries {
        validate_name(&entry.name).map_err(|reason| {
            StorageError::Serialization(format!("Invalid entry name {:?}: {}", entry.name, reason))
        })?;
    }
    for pair in entries.windows(2) {
        if pair[0].name >= pair[1].name {
            return Err(StorageError::Serialization(format!(
                "Tree entries out of order or duplicated: {:?} after {:?}",
                pair[1].name, pair[0].name
            )));
        }
    }
    Ok(())
}
