//! CLI route: single route table and run context. Dispatches to the repository and presentation.

use crate::cli::help::{command_name, creates_repository};
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_add_result, format_commit_outcome, format_init_summary, format_log_json,
    format_log_text, format_remove_result, format_status_text,
};
use crate::config::TwigConfig;
use crate::error::{ApiError, StorageError};
use crate::repository::Repository;
use crate::tree::path::canonicalize_path;
use crate::tree::walker::REPO_DIR_NAME;
use crate::tree::TreePath;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, info_span};

/// Runtime context for CLI execution: repository location, config path and working directory.
pub struct RunContext {
    repo: PathBuf,
    config_path: Option<PathBuf>,
    cwd: PathBuf,
}

impl RunContext {
    /// Create run context from the `--repo` directory and optional config path.
    pub fn new(repo: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let cwd = std::env::current_dir()
            .map_err(|e| StorageError::io_context("Failed to read current directory".into(), e))?;
        Ok(Self {
            repo,
            config_path,
            cwd,
        })
    }

    /// Configuration for a repository whose metadata directory is `repo_dir`.
    fn load_config(&self, repo_dir: &Path) -> Result<TwigConfig, ApiError> {
        match &self.config_path {
            Some(path) => TwigConfig::load_with_override(repo_dir, path),
            None => TwigConfig::load(repo_dir),
        }
    }

    fn open_repository(&self) -> Result<Repository, ApiError> {
        let root = Repository::discover(&self.repo)?;
        let config = self.load_config(&root.join(REPO_DIR_NAME))?;
        Repository::open_with_config(&root, config)
    }

    /// Base directory for relative path arguments
    fn path_base(&self, repo: &Repository) -> PathBuf {
        match canonicalize_path(&self.cwd) {
            Ok(cwd) if cwd.starts_with(repo.root()) => cwd,
            _ => repo.root().to_path_buf(),
        }
    }

    fn resolve_paths(&self, repo: &Repository, paths: &[PathBuf]) -> Result<Vec<TreePath>, ApiError> {
        let base = self.path_base(repo);
        paths
            .iter()
            .map(|path| repo.resolve_path(&base, path))
            .collect()
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let span = info_span!("command", name = command_name(command));
        let _guard = span.enter();
        let started = Instant::now();

        let result = if creates_repository(command) {
            self.execute_init(command)
        } else {
            let mut repo = self.open_repository()?;
            self.execute_inner(&mut repo, command)
        };

        info!(
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis(),
            "Command finished"
        );
        result
    }

    fn execute_init(&self, command: &Commands) -> Result<String, ApiError> {
        let Commands::Init { backend } = command else {
            return Err(ApiError::ConfigError(format!(
                "{} requires an existing repository",
                command_name(command)
            )));
        };
        std::fs::create_dir_all(&self.repo)
            .map_err(|e| StorageError::io_context(format!("Failed to create {:?}", self.repo), e))?;
        let root = canonicalize_path(&self.repo)?;
        let mut config = self.load_config(&root.join(REPO_DIR_NAME))?;
        if let Some(backend) = backend {
            config.storage.backend = *backend;
        }
        let repo = Repository::init(&root, &config)?;
        Ok(format_init_summary(repo.repo_dir()))
    }

    fn execute_inner(&self, repo: &mut Repository, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Init { .. } => Err(ApiError::AlreadyInitialized(repo.root().to_path_buf())),
            Commands::Add { paths } => {
                let mut staged = Vec::new();
                for path in self.resolve_paths(repo, paths)? {
                    staged.extend(repo.add(&path)?);
                }
                Ok(format_add_result(&staged))
            }
            Commands::Rm { paths, .. } => {
                let paths = self.resolve_paths(repo, paths)?;
                for path in &paths {
                    repo.remove(path)?;
                }
                Ok(format_remove_result(&paths))
            }
            Commands::Commit { all, message } => {
                let outcome = repo.commit(message, *all)?;
                Ok(format_commit_outcome(&outcome, message))
            }
            Commands::Log { format, max_count } => {
                let limit = max_count.unwrap_or(usize::MAX);
                let entries = repo
                    .history()?
                    .take(limit)
                    .collect::<Result<Vec<_>, _>>()?;
                if format == "json" {
                    format_log_json(&entries)
                } else {
                    Ok(format_log_text(&entries))
                }
            }
            Commands::Status => Ok(format_status_text(&repo.status()?)),
        }
    }
}
