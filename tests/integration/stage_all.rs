//! Stage-all reconciliation against a real working directory

use crate::integration::test_utils::{init_repo, tp, write_file};
use std::fs;
use twig::error::TreeError;
use twig::store::{ObjectKind, ObjectStore, StorageBackend};
use twig::tree::hasher::compute_content_hash;
use twig::tree::node::Node;
use twig::tree::TreeView;

/// Deleting one of two staged files keeps the parent directory
#[test]
fn test_delete_one_of_two_files() {
    let (_temp_dir, mut repo) = init_repo(StorageBackend::Fs);
    let root = repo.root().to_path_buf();
    write_file(&root, "dir/a.txt", "a");
    write_file(&root, "dir/b.txt", "b");
    repo.add(&tp("/dir/a.txt")).unwrap();
    repo.add(&tp("/dir/b.txt")).unwrap();

    fs::remove_file(root.join("dir/a.txt")).unwrap();
    let plan = repo.stage_all().unwrap();

    assert_eq!(plan.deleted, vec![tp("/dir/a.txt")]);
    assert!(plan.modified.is_empty());
    let index = repo.index();
    assert!(matches!(
        index.get(&tp("/dir/a.txt")),
        Err(TreeError::PathNotExist(_))
    ));
    assert!(index.get(&tp("/dir")).unwrap().is_dir());
    assert!(index.get(&tp("/dir/b.txt")).is_ok());
}

/// Modified files are re-staged with the new content hash
#[test]
fn test_modified_file_restaged() {
    let (_temp_dir, mut repo) = init_repo(StorageBackend::Fs);
    let root = repo.root().to_path_buf();
    write_file(&root, "notes.md", "v1");
    repo.add(&tp("/notes.md")).unwrap();

    write_file(&root, "notes.md", "v2");
    let plan = repo.stage_all().unwrap();

    let expected = compute_content_hash(b"v2");
    assert_eq!(plan.modified.get(&tp("/notes.md")), Some(&expected));
    match repo.index().get(&tp("/notes.md")).unwrap() {
        Node::File(file) => assert_eq!(file.content_hash, expected),
        Node::Directory(_) => panic!("expected a file"),
    }
    assert!(repo.objects().contains(ObjectKind::Blob, &expected).unwrap());
}

/// Untracked files are reported by status but never staged
#[test]
fn test_untracked_files_not_staged() {
    let (_temp_dir, mut repo) = init_repo(StorageBackend::Fs);
    let root = repo.root().to_path_buf();
    write_file(&root, "tracked.txt", "t");
    repo.add(&tp("/tracked.txt")).unwrap();
    write_file(&root, "loose.txt", "l");

    let plan = repo.stage_all().unwrap();
    assert!(plan.is_empty());
    assert!(repo.index().get(&tp("/loose.txt")).is_err());
    assert_eq!(repo.status().unwrap().untracked, vec![tp("/loose.txt")]);
}

/// A staged file that became a directory counts as deleted
#[test]
fn test_kind_change_counts_as_delete() {
    let (_temp_dir, mut repo) = init_repo(StorageBackend::Fs);
    let root = repo.root().to_path_buf();
    write_file(&root, "thing", "file");
    repo.add(&tp("/thing")).unwrap();

    fs::remove_file(root.join("thing")).unwrap();
    write_file(&root, "thing/inner.txt", "nested");
    let plan = repo.stage_all().unwrap();

    assert_eq!(plan.deleted, vec![tp("/thing")]);
    assert!(repo.index().get(&tp("/thing")).is_err());
}

/// Removing a whole tracked directory deletes it from the index
#[test]
fn test_deleted_directory() {
    let (_temp_dir, mut repo) = init_repo(StorageBackend::Fs);
    let root = repo.root().to_path_buf();
    write_file(&root, "gone/one.txt", "1");
    write_file(&root, "gone/deeper/two.txt", "2");
    write_file(&root, "stay.txt", "s");
    repo.add(&tp("/gone")).unwrap();
    repo.add(&tp("/stay.txt")).unwrap();

    fs::remove_dir_all(root.join("gone")).unwrap();
    repo.stage_all().unwrap();

    assert!(repo.index().get(&tp("/gone")).is_err());
    assert!(repo.index().get(&tp("/stay.txt")).is_ok());
}

/// Decomposed Unicode names stage under their exact bytes
#[test]
fn test_decomposed_unicode_name_staged() {
    let (_temp_dir, mut repo) = init_repo(StorageBackend::Fs);
    let root = repo.root().to_path_buf();
    write_file(&root, "cafe\u{301}.txt", "coffee");

    let staged = repo.add(&tp("/")).unwrap();
    assert_eq!(staged, vec![tp("/cafe\u{301}.txt")]);
    assert!(repo.index().get(&tp("/cafe\u{301}.txt")).is_ok());
    assert!(repo.index().get(&tp("/caf\u{e9}.txt")).is_err());

    let status = repo.status().unwrap();
    assert!(status.untracked.is_empty());
    assert!(status.unstaged.is_empty());
}
