//! Object store integration: deduplication, layout and integrity checks

use std::fs;
use tempfile::TempDir;
use twig::error::StorageError;
use twig::store::object::{self, EntryKind, TreeEntry};
use twig::store::{open_store, FsObjectStore, ObjectKind, ObjectStore, StorageBackend};
use twig::tree::hasher::compute_content_hash;
use twig::types::hash_to_hex;

/// Identical content is stored once on every backend
#[test]
fn test_blob_dedup_on_both_backends() {
    for backend in [StorageBackend::Fs, StorageBackend::Sled] {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(backend, temp_dir.path()).unwrap();

        let (hash, written) = object::write_blob(store.as_ref(), b"same bytes").unwrap();
        assert!(written, "{} backend should write a new blob", backend);
        let (again, written) = object::write_blob(store.as_ref(), b"same bytes").unwrap();
        assert_eq!(hash, again);
        assert!(!written, "{} backend should skip a known blob", backend);

        assert_eq!(object::read_blob(store.as_ref(), &hash).unwrap(), b"same bytes");
    }
}

/// Objects live under their kind and fan out into two levels named after the hash
#[test]
fn test_fs_layout() {
    let temp_dir = TempDir::new().unwrap();
    let store = FsObjectStore::new(temp_dir.path()).unwrap();
    let (hash, _) = object::write_blob(&store, b"layout").unwrap();

    let hex = hash_to_hex(&hash);
    let expected = temp_dir
        .path()
        .join("blob")
        .join(&hex[0..2])
        .join(&hex[2..4])
        .join(&hex);
    assert_eq!(store.object_path(ObjectKind::Blob, &hash), expected);
    assert!(expected.is_file());
}

/// A tampered blob is rejected when read back
#[test]
fn test_tampered_blob_detected() {
    let temp_dir = TempDir::new().unwrap();
    let store = FsObjectStore::new(temp_dir.path()).unwrap();
    let (hash, _) = object::write_blob(&store, b"original").unwrap();

    fs::write(store.object_path(ObjectKind::Blob, &hash), b"tampered").unwrap();

    assert!(matches!(
        object::read_blob(&store, &hash),
        Err(StorageError::HashMismatch { expected, .. }) if expected == hash
    ));
}

/// A blob is invisible when looked up as another kind
#[test]
fn test_kind_mismatch() {
    for backend in [StorageBackend::Fs, StorageBackend::Sled] {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(backend, temp_dir.path()).unwrap();
        let (hash, _) = object::write_blob(store.as_ref(), b"blob").unwrap();

        assert!(!store.contains(ObjectKind::Tree, &hash).unwrap());
        assert!(matches!(
            object::read_tree(store.as_ref(), &hash),
            Err(StorageError::ObjectNotFound(missing)) if missing == hash
        ));
    }
}

/// A blob whose bytes are an empty tree preimage does not shadow the tree
#[test]
fn test_blob_and_tree_with_same_hash_coexist() {
    for backend in [StorageBackend::Fs, StorageBackend::Sled] {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(backend, temp_dir.path()).unwrap();

        let mut content = b"tree".to_vec();
        content.extend_from_slice(&0u64.to_be_bytes());
        let (blob_hash, _) = object::write_blob(store.as_ref(), &content).unwrap();
        let (tree_hash, written) = object::write_tree(store.as_ref(), &[]).unwrap();
        assert_eq!(blob_hash, tree_hash);
        assert!(written, "{} backend skipped the empty tree", backend);

        assert_eq!(object::read_blob(store.as_ref(), &blob_hash).unwrap(), content);
        assert!(object::read_tree(store.as_ref(), &tree_hash).unwrap().is_empty());
    }
}

/// Tree objects hash like the staging tree directory they mirror
#[test]
fn test_tree_object_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let store = open_store(StorageBackend::Fs, temp_dir.path()).unwrap();
    let entries = vec![
        TreeEntry {
            name: "a.txt".to_string(),
            kind: EntryKind::Blob,
            hash: compute_content_hash(b"a"),
        },
        TreeEntry {
            name: "b".to_string(),
            kind: EntryKind::Tree,
            hash: object::tree_hash(&[]),
        },
    ];

    let (hash, written) = object::write_tree(store.as_ref(), &entries).unwrap();
    assert!(written);
    assert_eq!(object::read_tree(store.as_ref(), &hash).unwrap(), entries);

    let unsorted: Vec<TreeEntry> = entries.into_iter().rev().collect();
    assert!(object::write_tree(store.as_ref(), &unsorted).is_err());
}

/// Records survive reopening a store
#[test]
fn test_objects_persist_across_reopen() {
    for backend in [StorageBackend::Fs, StorageBackend::Sled] {
        let temp_dir = TempDir::new().unwrap();
        let hash = {
            let store = open_store(backend, temp_dir.path()).unwrap();
            let (hash, _) = object::write_blob(store.as_ref(), b"durable").unwrap();
            store.flush().unwrap();
            hash
        };
        let store: Box<dyn ObjectStore> = open_store(backend, temp_dir.path()).unwrap();
        assert!(store.contains(ObjectKind::Blob, &hash).unwrap());
    }
}
