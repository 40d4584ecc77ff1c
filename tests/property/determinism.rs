//! Property-based tests for determinism guarantees

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use twig::tree::hasher;
use twig::tree::{MemTree, TreePath, TreeView};

/// File sets under up to two directory levels
///
/// Directories are named `dN` and files `fN`, so no path is ever both.
fn file_set() -> impl Strategy<Value = BTreeMap<String, [u8; 32]>> {
    prop::collection::btree_map(
        "(d[0-2]/){0,2}f[0-9]",
        any::<[u8; 32]>(),
        0..12,
    )
}

/// Empty directories that never collide with `file_set` paths
fn dir_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("(d[0-2]/){0,1}e[0-2]", 0..4)
}

/// Files below `xN` directories, all of which get deleted again
fn scratch_set() -> impl Strategy<Value = BTreeMap<String, [u8; 32]>> {
    prop::collection::btree_map("x[0-2]/(d[0-2]/){0,1}g[0-9]", any::<[u8; 32]>(), 0..6)
}

#[derive(Debug, Clone)]
enum Op {
    Mkdir(String),
    Mkfile(String, [u8; 32]),
}

fn tp(path: &str) -> TreePath {
    TreePath::parse(&format!("/{}", path)).unwrap()
}

fn build(files: &[(String, [u8; 32])]) -> MemTree {
    let mut tree = MemTree::new();
    for (path, hash) in files {
        tree.mkfile_all(&tp(path), *hash).unwrap();
    }
    tree
}

/// Content hash computation is deterministic
#[test]
fn test_content_hash_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<Vec<u8>>(), any::<Vec<u8>>()), |(content1, content2)| {
            let hash1 = hasher::compute_content_hash(&content1);
            let hash2 = hasher::compute_content_hash(&content2);

            prop_assert_eq!(hash1, hasher::compute_content_hash(&content1));
            if content1 == content2 {
                prop_assert_eq!(hash1, hash2);
            } else {
                prop_assert_ne!(hash1, hash2);
            }
            Ok(())
        })
        .unwrap();
}

proptest! {
    /// Insertion order never changes the root hash
    #[test]
    fn test_root_hash_independent_of_order(
        (forward, shuffled) in file_set().prop_flat_map(|files| {
            let forward: Vec<_> = files.into_iter().collect();
            (Just(forward.clone()), Just(forward).prop_shuffle())
        })
    ) {
        prop_assert_eq!(build(&forward).hash(), build(&shuffled).hash());
    }

    /// Creates in any order, then scratch deletes in any order, hash like
    /// building the surviving nodes directly
    #[test]
    fn test_mixed_operations_independent_of_order(
        (files, dirs, ops, deletes) in (file_set(), dir_set(), scratch_set()).prop_flat_map(
            |(files, dirs, scratch)| {
                let ops: Vec<Op> = files
                    .iter()
                    .chain(scratch.iter())
                    .map(|(path, hash)| Op::Mkfile(path.clone(), *hash))
                    .chain(dirs.iter().map(|dir| Op::Mkdir(dir.clone())))
                    .collect();
                let tops: BTreeSet<String> = scratch
                    .keys()
                    .filter_map(|path| path.split('/').next())
                    .map(str::to_string)
                    .collect();
                let deletes: Vec<String> = tops.into_iter().collect();
                (
                    Just(files),
                    Just(dirs),
                    Just(ops).prop_shuffle(),
                    Just(deletes).prop_shuffle(),
                )
            }
        )
    ) {
        let mut direct = MemTree::new();
        for (path, hash) in &files {
            direct.mkfile_all(&tp(path), *hash).unwrap();
        }
        for dir in &dirs {
            direct.mkdir_all(&tp(dir)).unwrap();
        }

        let mut replayed = MemTree::new();
        for op in &ops {
            match op {
                Op::Mkdir(dir) => replayed.mkdir_all(&tp(dir)).unwrap(),
                Op::Mkfile(path, hash) => replayed.mkfile_all(&tp(path), *hash).unwrap(),
            }
        }
        for top in &deletes {
            replayed.delete(&tp(top)).unwrap();
        }

        prop_assert_eq!(replayed.hash(), direct.hash());
    }

    /// Adding then deleting a file restores the previous root hash
    #[test]
    fn test_add_delete_restores_hash(files in file_set(), extra in any::<[u8; 32]>()) {
        let files: Vec<_> = files.into_iter().collect();
        let mut tree = build(&files);
        let before = tree.hash();

        let path = TreePath::parse("/zz_extra").unwrap();
        tree.mkfile(&path, extra).unwrap();
        prop_assert_ne!(tree.hash(), before);
        tree.delete(&path).unwrap();
        prop_assert_eq!(tree.hash(), before);
    }

    /// The staging file format reproduces the tree and its bytes exactly
    #[test]
    fn test_codec_round_trip(files in file_set()) {
        let files: Vec<_> = files.into_iter().collect();
        let tree = build(&files);
        let bytes = tree.serialize().unwrap();
        let decoded = MemTree::deserialize(&bytes).unwrap();
        prop_assert_eq!(decoded.hash(), tree.hash());
        prop_assert_eq!(decoded.serialize().unwrap(), bytes);
    }
}
