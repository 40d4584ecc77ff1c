//! Shared test utilities for integration tests
//!
//! Provides isolated XDG/HOME directories so the global config file of the
//! machine running the tests never leaks into a repository under test.

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;
use twig::config::TwigConfig;
use twig::repository::Repository;
use twig::store::StorageBackend;
use twig::tree::TreePath;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Environment variable state to restore after test
struct EnvState {
    home: Option<String>,
    xdg_config_home: Option<String>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            home: std::env::var("HOME").ok(),
            xdg_config_home: std::env::var("XDG_CONFIG_HOME").ok(),
        }
    }

    fn restore(self) {
        match self.home {
            Some(orig) => std::env::set_var("HOME", orig),
            None => std::env::remove_var("HOME"),
        }
        match self.xdg_config_home {
            Some(orig) => std::env::set_var("XDG_CONFIG_HOME", orig),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }
}

/// Run `f` with HOME and XDG_CONFIG_HOME pointing inside `test_dir`
///
/// The global config file then lives at `<test_dir>/twig/config.toml`.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_home = test_dir.path().join("home");
    fs::create_dir_all(&test_home).unwrap();
    std::env::set_var("HOME", test_home.to_str().unwrap());
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path().to_str().unwrap());

    let result = f();

    env_state.restore();
    result
}

/// Configuration with a fixed author so commit hashes are reproducible
pub fn test_config(backend: StorageBackend) -> TwigConfig {
    let mut config = TwigConfig::default();
    config.user.name = Some("Test Author".to_string());
    config.storage.backend = backend;
    config
}

/// Initialize a repository in a fresh temp directory
pub fn init_repo(backend: StorageBackend) -> (TempDir, Repository) {
    let temp_dir = TempDir::new().unwrap();
    let repo = Repository::init(temp_dir.path(), &test_config(backend)).unwrap();
    (temp_dir, repo)
}

/// Write a working file, creating parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub fn tp(path: &str) -> TreePath {
    TreePath::parse(path).unwrap()
}
