//! Repository context
//!
//! Ties the staging index, object store, refs and configuration of one
//! repository together and implements the user-level operations on top.
//!
//! Layout of the metadata directory:
//!
//! ```text
//! .twig/
//!   config.toml        repository configuration
//!   index              staging tree
//!   HEAD               ref:<branch> or a detached commit hash
//!   refs/heads/<name>  branch heads
//!   objects/           blobs, trees and commits (fs backend)
//!   objects.db         the same, sled backend
//! ```

use crate::commit::{self, Commit, History};
use crate::config::{self, TwigConfig};
use crate::error::{ApiError, StorageError};
use crate::index::{IndexTree, INDEX_FILE_NAME};
use crate::reconcile::{self, Reconciliation, TreeDiff};
use crate::refs::{HeadRef, RefStore, DEFAULT_BRANCH};
use crate::snapshot::{SnapshotBuilder, SnapshotReport};
use crate::store::{self, ObjectStore};
use crate::tree::path::canonicalize_path;
use crate::tree::walker::{Entry, Walker, WalkerConfig, REPO_DIR_NAME};
use crate::tree::{MemTree, TreePath, TreeView, WorkingTree};
use crate::types::{hash_to_hex, Hash, HASH_ALGORITHM};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, instrument};

/// Result of [`Repository::commit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed {
        hash: Hash,
        branch: String,
        snapshot: SnapshotReport,
    },
    /// The staging tree equals the snapshot of the current commit
    NothingToCommit,
}

/// Working-directory state relative to the index and the current commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Status {
    /// Current branch; `None` before the first commit or when detached
    pub branch: Option<String>,
    /// Staged differences against the current commit
    pub staged: TreeDiff,
    /// Tracked paths whose working copy differs from the index
    pub unstaged: Reconciliation,
    /// Working files the index does not track
    pub untracked: Vec<TreePath>,
}

pub struct Repository {
    root: PathBuf,
    dir: PathBuf,
    config: TwigConfig,
    index: IndexTree,
    objects: Box<dyn ObjectStore>,
    refs: RefStore,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .field("dir", &self.dir)
            .field("config", &self.config)
            .field("index", &self.index)
            .field("refs", &self.refs)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Create the metadata directory under `root` and open the repository
    #[instrument(skip(root, config), fields(root = %root.display()))]
    pub fn init(root: &Path, config: &TwigConfig) -> Result<Self, ApiError> {
        let root = canonicalize_path(root)?;
        let dir = root.join(REPO_DIR_NAME);
        if dir.exists() {
            return Err(ApiError::AlreadyInitialized(root));
        }
        fs::create_dir_all(dir.join("refs").join("heads")).map_err(|e| {
            StorageError::io_context(format!("Failed to create {:?}", dir), e)
        })?;

        let repo_config = TwigConfig {
            user: config.user.clone(),
            storage: config.storage.clone(),
            ..TwigConfig::default()
        };
        repo_config.save_to_repo(&dir)?;

        let repo = Self::open_with_config(&root, config.clone())?;
        info!(
            root = %root.display(),
            backend = %config.storage.backend,
            hash = HASH_ALGORITHM,
            "Repository initialized"
        );
        Ok(repo)
    }

    /// Open the repository rooted at `root`, loading its configuration
    pub fn open(root: &Path) -> Result<Self, ApiError> {
        let root = canonicalize_path(root)?;
        let config = TwigConfig::load(&root.join(REPO_DIR_NAME))?;
        Self::open_with_config(&root, config)
    }

    /// Open the repository rooted at `root` with an already merged configuration
    pub fn open_with_config(root: &Path, config: TwigConfig) -> Result<Self, ApiError> {
        let root = canonicalize_path(root)?;
        let dir = root.join(REPO_DIR_NAME);
        if !dir.is_dir() {
            return Err(ApiError::NotARepository(root));
        }
        let index = IndexTree::open(dir.join(INDEX_FILE_NAME))?;
        let objects = store::open_store(config.storage.backend, &dir)?;
        let refs = RefStore::new(&dir);
        debug!(root = %root.display(), backend = %config.storage.backend, "Repository opened");
        Ok(Self {
            root,
            dir,
            config,
            index,
            objects,
            refs,
        })
    }

    /// Find the repository root containing `start`
    pub fn discover(start: &Path) -> Result<PathBuf, ApiError> {
        let start = canonicalize_path(start)?;
        start
            .ancestors()
            .find(|candidate| candidate.join(REPO_DIR_NAME).is_dir())
            .map(Path::to_path_buf)
            .ok_or_else(|| ApiError::NotARepository(start.clone()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.twig` metadata directory
    pub fn repo_dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &TwigConfig {
        &self.config
    }

    pub fn index(&self) -> &IndexTree {
        &self.index
    }

    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    pub fn snapshot_builder(&self) -> SnapshotBuilder<'_> {
        SnapshotBuilder::new(self.objects.as_ref())
    }

    pub fn author(&self) -> String {
        config::resolve_author(&self.config)
    }

    /// Scan the working directory
    pub fn working_tree(&self) -> Result<WorkingTree, ApiError> {
        Ok(WorkingTree::scan(&self.root, &WalkerConfig::default())?)
    }

    /// Map a filesystem path (absolute, or relative to `cwd`) to a tree path
    pub fn resolve_path(&self, cwd: &Path, path: &Path) -> Result<TreePath, ApiError> {
        let absolute = normalize_lexically(&cwd.join(path));
        let relative = absolute
            .strip_prefix(&self.root)
            .map_err(|_| ApiError::OutsideRepository(absolute.clone()))?;
        if relative.components().next() == Some(Component::Normal(REPO_DIR_NAME.as_ref())) {
            return Err(ApiError::OutsideRepository(absolute));
        }
        Ok(TreePath::from_relative(relative)?)
    }

    /// Stage a file, or every file below a directory
    ///
    /// Contents are stored as blobs before the index is touched. Returns the
    /// staged file paths.
    #[instrument(skip(self, path), fields(path = %path))]
    pub fn add(&mut self, path: &TreePath) -> Result<Vec<TreePath>, ApiError> {
        let fs_path = path.to_fs_path(&self.root);
        let metadata = fs::metadata(&fs_path).map_err(|e| {
            StorageError::io_context(format!("Cannot stage {}", path), e)
        })?;

        let mut files = Vec::new();
        if metadata.is_dir() {
            let walker = Walker::with_config(fs_path.clone(), WalkerConfig::default());
            for entry in walker.walk()? {
                if let Entry::File { path: file } = entry {
                    let relative = file.strip_prefix(&self.root).map_err(|_| {
                        ApiError::OutsideRepository(file.clone())
                    })?;
                    files.push(TreePath::from_relative(relative)?);
                }
            }
        } else {
            files.push(path.clone());
        }

        let builder = SnapshotBuilder::new(self.objects.as_ref());
        let mut staged = Vec::with_capacity(files.len());
        for file in files {
            let content = fs::read(file.to_fs_path(&self.root)).map_err(|e| {
                StorageError::io_context(format!("Failed to read {}", file), e)
            })?;
            staged.push((file, builder.store_blob(&content)?));
        }
        self.objects.flush()?;

        self.index.batch(|tree| {
            if metadata.is_dir() {
                tree.mkdir_all(path)?;
            }
            for (file, hash) in &staged {
                tree.mkfile_all(file, *hash)?;
            }
            Ok(())
        })?;
        debug!(count = staged.len(), "Files staged");
        Ok(staged.into_iter().map(|(file, _)| file).collect())
    }

    /// Remove a path from the index; the working copy is left alone
    pub fn remove(&mut self, path: &TreePath) -> Result<(), ApiError> {
        self.index.delete(path)?;
        Ok(())
    }

    /// Stage modifications and deletions of every tracked path
    pub fn stage_all(&mut self) -> Result<Reconciliation, ApiError> {
        let working = self.working_tree()?;
        let builder = SnapshotBuilder::new(self.objects.as_ref());
        let plan = reconcile::stage_all(&mut self.index, &builder, &working)?;
        self.objects.flush()?;
        Ok(plan)
    }

    /// Current branch, or `None` when there is no HEAD yet
    pub fn current_branch(&self) -> Result<Option<String>, ApiError> {
        match self.refs.current_branch() {
            Ok(branch) => Ok(Some(branch)),
            Err(StorageError::NoHeadFile) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Commit HEAD resolves to, or `None` when there is no history
    pub fn current_commit(&self) -> Result<Option<(Hash, Commit)>, ApiError> {
        let head = match self.refs.head_commit() {
            Ok(Some(hash)) => hash,
            Ok(None) | Err(StorageError::NoHeadFile) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let commit = commit::load_commit(self.objects.as_ref(), &head)?;
        Ok(Some((head, commit)))
    }

    /// Record the staging tree as a new commit on the current branch
    ///
    /// With `stage_all`, tracked modifications and deletions are staged first.
    /// Without a HEAD, the default branch is created.
    #[instrument(skip(self, comment))]
    pub fn commit(&mut self, comment: &str, stage_all: bool) -> Result<CommitOutcome, ApiError> {
        let branch = match self.refs.current_branch() {
            Ok(branch) => Some(branch),
            Err(StorageError::NoHeadFile) => None,
            Err(e) => return Err(e.into()),
        };

        if stage_all {
            self.stage_all()?;
        }

        let parent = self.current_commit()?;
        if let Some((_, current)) = &parent {
            if current.snapshot == self.index.hash() {
                info!("Nothing to commit");
                return Ok(CommitOutcome::NothingToCommit);
            }
        }

        let snapshot = self.snapshot_builder().build(&self.index)?;
        let commit = Commit::new(
            snapshot.root,
            parent.map(|(hash, _)| hash),
            self.author(),
            comment,
        );
        let hash = commit::create_commit(self.objects.as_ref(), &commit)?;
        self.objects.flush()?;

        let branch = match branch {
            Some(branch) => branch,
            None => {
                self.refs
                    .write_head(&HeadRef::Branch(DEFAULT_BRANCH.to_string()))?;
                DEFAULT_BRANCH.to_string()
            }
        };
        self.refs.update_branch_head(&branch, &hash)?;

        info!(
            commit = %hash_to_hex(&hash),
            branch = %branch,
            objects_written = snapshot.objects_written,
            "Committed"
        );
        Ok(CommitOutcome::Committed {
            hash,
            branch,
            snapshot,
        })
    }

    /// Commits reachable from HEAD, newest first
    pub fn history(&self) -> Result<History<'_>, ApiError> {
        let start = match self.refs.head_commit() {
            Ok(start) => start,
            Err(StorageError::NoHeadFile) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(History::new(self.objects.as_ref(), start))
    }

    /// Tree recorded by a commit's snapshot
    pub fn snapshot_tree(&self, commit: &Commit) -> Result<MemTree, ApiError> {
        Ok(self.snapshot_builder().load(&commit.snapshot)?)
    }

    /// Compare the current commit, the index and the working directory
    pub fn status(&self) -> Result<Status, ApiError> {
        let branch = match self.refs.current_branch() {
            Ok(branch) => Some(branch),
            Err(StorageError::NoHeadFile) | Err(StorageError::NotBranch) => None,
            Err(e) => return Err(e.into()),
        };

        let committed = match self.current_commit()? {
            Some((_, commit)) => self.snapshot_tree(&commit)?,
            None => MemTree::new(),
        };
        let working = self.working_tree()?;

        Ok(Status {
            branch,
            staged: reconcile::diff_files(&committed, &self.index)?,
            unstaged: reconcile::classify(&self.index, &working)?,
            untracked: reconcile::untracked(&self.index, &working)?,
        })
    }
}

/// Resolve `.` and `..` without touching the filesystem
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
