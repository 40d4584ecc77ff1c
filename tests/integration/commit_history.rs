//! Commit chain tests: history order, parent links and "nothing to commit"

use crate::integration::test_utils::{init_repo, tp, write_file};
use std::fs;
use twig::commit;
use twig::error::{ApiError, StorageError};
use twig::repository::{CommitOutcome, Repository};
use twig::store::StorageBackend;
use twig::tree::TreeView;

fn committed_hash(outcome: CommitOutcome) -> [u8; 32] {
    match outcome {
        CommitOutcome::Committed { hash, .. } => hash,
        CommitOutcome::NothingToCommit => panic!("expected a commit"),
    }
}

/// Stage, commit, modify, stage all, commit: two commits newest first
#[test]
fn test_two_commit_history() {
    let (_temp_dir, mut repo) = init_repo(StorageBackend::Fs);
    let root = repo.root().to_path_buf();

    write_file(&root, "a.txt", "first content");
    repo.add(&tp("/a.txt")).unwrap();
    let first = committed_hash(repo.commit("first", false).unwrap());

    let (head, current) = repo.current_commit().unwrap().unwrap();
    assert_eq!(head, first);
    assert_eq!(current.comment, "first");
    assert!(commit::prev_commit(repo.objects(), &current).unwrap().is_none());

    write_file(&root, "a.txt", "second content");
    let second = committed_hash(repo.commit("second", true).unwrap());

    let history: Vec<_> = repo
        .history()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].0, second);
    assert_eq!(history[1].0, first);
    assert_eq!(history[0].1.parent, Some(first));
    assert_ne!(history[0].1.snapshot, history[1].1.snapshot);
}

/// Committing an unchanged staging tree reports nothing to commit
#[test]
fn test_nothing_to_commit_keeps_history() {
    let (_temp_dir, mut repo) = init_repo(StorageBackend::Fs);
    write_file(repo.root(), "a.txt", "content");
    repo.add(&tp("/a.txt")).unwrap();
    repo.commit("first", false).unwrap();

    assert_eq!(
        repo.commit("again", false).unwrap(),
        CommitOutcome::NothingToCommit
    );
    assert_eq!(
        repo.commit("again with stage all", true).unwrap(),
        CommitOutcome::NothingToCommit
    );
    assert_eq!(repo.history().unwrap().count(), 1);
}

/// The first commit may record an empty staging tree
#[test]
fn test_first_commit_of_empty_index() {
    let (_temp_dir, mut repo) = init_repo(StorageBackend::Fs);
    let outcome = repo.commit("empty", false).unwrap();
    let CommitOutcome::Committed { branch, snapshot, .. } = outcome else {
        panic!("expected a commit");
    };
    assert_eq!(branch, "master");
    assert_eq!(snapshot.root, repo.index().hash());
}

/// A commit's snapshot loads back as the staged tree
#[test]
fn test_snapshot_tree_matches_index() {
    let (_temp_dir, mut repo) = init_repo(StorageBackend::Sled);
    write_file(repo.root(), "src/main.rs", "fn main() {}");
    write_file(repo.root(), "README", "readme");
    repo.add(&tp("/src")).unwrap();
    repo.add(&tp("/README")).unwrap();
    repo.commit("tree", false).unwrap();

    let (_, current) = repo.current_commit().unwrap().unwrap();
    let tree = repo.snapshot_tree(&current).unwrap();
    assert_eq!(tree.hash(), repo.index().hash());
    assert!(tree.get(&tp("/src/main.rs")).is_ok());
}

/// History survives reopening the repository
#[test]
fn test_history_after_reopen() {
    let (temp_dir, mut repo) = init_repo(StorageBackend::Fs);
    write_file(repo.root(), "a.txt", "a");
    repo.add(&tp("/a.txt")).unwrap();
    let first = committed_hash(repo.commit("first", false).unwrap());
    drop(repo);

    let repo = Repository::open(temp_dir.path()).unwrap();
    assert_eq!(repo.current_branch().unwrap().as_deref(), Some("master"));
    assert_eq!(repo.current_commit().unwrap().unwrap().0, first);
}

/// A detached HEAD rejects commits
#[test]
fn test_detached_head_rejects_commit() {
    let (_temp_dir, mut repo) = init_repo(StorageBackend::Fs);
    write_file(repo.root(), "a.txt", "a");
    repo.add(&tp("/a.txt")).unwrap();
    let first = committed_hash(repo.commit("first", false).unwrap());

    let head_file = repo.repo_dir().join("HEAD");
    fs::write(&head_file, format!("{}\n", hex::encode(first))).unwrap();
    write_file(repo.root(), "b.txt", "b");
    repo.add(&tp("/b.txt")).unwrap();

    assert!(matches!(
        repo.commit("second", false),
        Err(ApiError::Storage(StorageError::NotBranch))
    ));
}

/// A file holding the empty tree preimage commits next to an empty directory
#[test]
fn test_commit_file_shaped_like_empty_tree() {
    for backend in [StorageBackend::Fs, StorageBackend::Sled] {
        let (_temp_dir, mut repo) = init_repo(backend);
        let mut content = b"tree".to_vec();
        content.extend_from_slice(&0u64.to_be_bytes());
        fs::write(repo.root().join("preimage"), &content).unwrap();
        fs::create_dir(repo.root().join("empty")).unwrap();

        repo.add(&tp("/preimage")).unwrap();
        repo.add(&tp("/empty")).unwrap();
        committed_hash(repo.commit("collide", false).unwrap());

        let (_, current) = repo.current_commit().unwrap().unwrap();
        let tree = repo.snapshot_tree(&current).unwrap();
        assert_eq!(tree.hash(), repo.index().hash());
        assert!(tree.get(&tp("/empty")).unwrap().is_dir());

        let status = repo.status().unwrap();
        assert!(status.staged.is_empty(), "{} backend", backend);
        assert!(status.unstaged.is_empty());
        assert!(status.untracked.is_empty());
    }
}
