//! Configuration precedence: defaults, global file, repository file, environment

use crate::integration::test_utils::{test_config, with_xdg_env};
use std::fs;
use tempfile::TempDir;
use twig::config::{global_config_path, repo_config_path, TwigConfig};
use twig::repository::Repository;
use twig::store::StorageBackend;

fn write_global(config_home: &TempDir, contents: &str) {
    let dir = config_home.path().join("twig");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), contents).unwrap();
}

/// Global path follows XDG_CONFIG_HOME
#[test]
fn test_global_path_uses_xdg() {
    let config_home = TempDir::new().unwrap();
    with_xdg_env(&config_home, || {
        assert_eq!(
            global_config_path().unwrap(),
            config_home.path().join("twig").join("config.toml")
        );
    });
}

/// Repository values override global ones; untouched global values remain
#[test]
fn test_repo_file_overrides_global() {
    let config_home = TempDir::new().unwrap();
    let repo_dir = TempDir::new().unwrap();
    write_global(
        &config_home,
        "[user]\nname = \"Global\"\n\n[logging]\nlevel = \"debug\"\n",
    );
    fs::write(
        repo_config_path(repo_dir.path()),
        "[user]\nname = \"Repo\"\n",
    )
    .unwrap();

    let config = with_xdg_env(&config_home, || TwigConfig::load(repo_dir.path()).unwrap());
    assert_eq!(config.user.name.as_deref(), Some("Repo"));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.storage.backend, StorageBackend::Fs);
}

/// TWIG_ variables override every file
#[test]
fn test_environment_overrides_files() {
    let config_home = TempDir::new().unwrap();
    let repo_dir = TempDir::new().unwrap();
    write_global(&config_home, "[user]\nname = \"Global\"\n");

    let config = with_xdg_env(&config_home, || {
        std::env::set_var("TWIG_USER__NAME", "From Env");
        let loaded = TwigConfig::load(repo_dir.path());
        std::env::remove_var("TWIG_USER__NAME");
        loaded.unwrap()
    });
    assert_eq!(config.user.name.as_deref(), Some("From Env"));
}

/// The backend chosen at init is recorded and used on reopen
#[test]
fn test_backend_recorded_at_init() {
    let config_home = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();

    with_xdg_env(&config_home, || {
        let repo = Repository::init(work.path(), &test_config(StorageBackend::Sled)).unwrap();
        assert!(repo.repo_dir().join("objects.db").exists());
        drop(repo);

        let repo = Repository::open(work.path()).unwrap();
        assert_eq!(repo.config().storage.backend, StorageBackend::Sled);
        assert_eq!(repo.author(), "Test Author");
    });
}
