//! MergeService: orchestrates sources, applies merge policy, deserializes to TwigConfig.

use crate::config::sources::{environment, global_file, repo_file};
use crate::config::TwigConfig;
use config::{ConfigError, File, FileFormat};
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from the repository and standard sources.
    /// Precedence: defaults (lowest) -> global file -> repository file -> environment (highest).
    pub fn load(repo_dir: &Path) -> Result<TwigConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = repo_file::add_to_builder(builder, repo_dir)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load the repository's layered config with an explicit file on top.
    /// Precedence: defaults -> global file -> repository file -> `path` -> environment.
    /// Unlike the other files, `path` must exist.
    pub fn load_with_override(repo_dir: &Path, path: &Path) -> Result<TwigConfig, ConfigError> {
        let path = path
            .to_str()
            .ok_or_else(|| ConfigError::Message(format!("Non UTF-8 config path: {:?}", path)))?;
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = repo_file::add_to_builder(builder, repo_dir)?;
        let builder = builder.add_source(File::new(path, FileFormat::Toml));
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
