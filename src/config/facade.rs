//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::TwigConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the repository whose metadata directory is `repo_dir`.
    pub fn load(repo_dir: &Path) -> Result<TwigConfig, ConfigError> {
        MergeService::load(repo_dir)
    }

    /// Load repository configuration with an explicit file layered on top.
    pub fn load_with_override(repo_dir: &Path, path: &Path) -> Result<TwigConfig, ConfigError> {
        MergeService::load_with_override(repo_dir, path)
    }

    /// Create default configuration.
    pub fn default() -> TwigConfig {
        TwigConfig::default()
    }
}
