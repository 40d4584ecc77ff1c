//! Configuration System
//!
//! Layered configuration: built-in defaults, then the global file
//! (`~/.config/twig/config.toml`), then the repository file
//! (`.twig/config.toml`), then `TWIG_*` environment variables with `__`
//! separating nested keys. Command-line flags are applied on top by the CLI.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::store::fs::write_atomic;
use crate::store::StorageBackend;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;
pub use sources::repo_file::{repo_config_path, CONFIG_FILE_NAME};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwigConfig {
    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Identity recorded as the commit author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Object store selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

impl TwigConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.user.name {
            if name.trim().is_empty() {
                return Err(ApiError::ConfigError(
                    "user.name cannot be empty".to_string(),
                ));
            }
        }
        self.logging
            .validate()
            .map_err(|e| ApiError::ConfigError(format!("logging: {}", e)))
    }

    /// Load and validate the configuration for a repository
    pub fn load(repo_dir: &Path) -> Result<Self, ApiError> {
        let config = ConfigLoader::load(repo_dir)
            .map_err(|e| ApiError::ConfigError(format!("Failed to load config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a repository's configuration, with `path` layered
    /// over the repository file
    pub fn load_with_override(repo_dir: &Path, path: &Path) -> Result<Self, ApiError> {
        let config = ConfigLoader::load_with_override(repo_dir, path)
            .map_err(|e| ApiError::ConfigError(format!("Failed to load config {:?}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Write this configuration as the repository config file
    pub fn save_to_repo(&self, repo_dir: &Path) -> Result<(), ApiError> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| ApiError::ConfigError(format!("Failed to encode config: {}", e)))?;
        write_atomic(&repo_config_path(repo_dir), text.as_bytes())?;
        Ok(())
    }
}

/// Commit author: `user.name`, else `$USER`, else `$USERNAME`, else "unknown"
pub fn resolve_author(config: &TwigConfig) -> String {
    config
        .user
        .name
        .clone()
        .or_else(|| non_empty_env("USER"))
        .or_else(|| non_empty_env("USERNAME"))
        .unwrap_or_else(|| "unknown".to_string())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
