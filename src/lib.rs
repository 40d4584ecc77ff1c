//! Twig: Content-Addressed Version Control on a Merkle Staging Tree
//!
//! The storage core of a small git-like version-control system: an in-memory
//! Merkle tree used as the staging area, a durable write-through index, a
//! content-addressed object store, snapshots, a linear commit chain and the
//! "stage all" reconciliation between the index and the working directory.

pub mod cli;
pub mod commit;
pub mod config;
pub mod error;
pub mod index;
pub mod logging;
pub mod reconcile;
pub mod refs;
pub mod repository;
pub mod snapshot;
pub mod store;
pub mod tree;
pub mod types;

pub use commit::{Commit, History};
pub use error::{ApiError, StorageError, TreeError};
pub use index::IndexTree;
pub use repository::{CommitOutcome, Repository, Status};
pub use snapshot::{SnapshotBuilder, SnapshotReport};
pub use store::{ObjectStore, StorageBackend};
pub use tree::{MemTree, TreePath, TreeView};
pub use types::Hash;
