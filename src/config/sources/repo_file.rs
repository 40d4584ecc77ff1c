//! Repository config file source: .twig/config.toml

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Path to the repository config file inside the metadata directory.
pub fn repo_config_path(repo_dir: &Path) -> PathBuf {
    repo_dir.join(CONFIG_FILE_NAME)
}

/// Add the repository config file to builder when present.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    repo_dir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = repo_config_path(repo_dir);
    if !path.is_file() {
        return Ok(builder);
    }
    match path.to_str() {
        Some(name) => Ok(builder.add_source(File::new(name, FileFormat::Toml).required(false))),
        None => Err(ConfigError::Message(format!(
            "Non UTF-8 config path: {:?}",
            path
        ))),
    }
}
