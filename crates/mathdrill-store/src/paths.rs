//! Data directory resolution.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "MATHDRILL_DATA_DIR";

/// File name of the test history inside the data directory.
pub const HISTORY_FILE: &str = "history.json";

/// File name of the saved quiz settings inside the data directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// Resolve the data directory.
///
/// Search order:
/// 1. `explicit`, when given
/// 2. `$MATHDRILL_DATA_DIR`
/// 3. `$HOME/.local/share/mathdrill`
/// 4. `./.mathdrill`
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    resolve_with(
        explicit,
        std::env::var_os(DATA_DIR_ENV).map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn resolve_with(explicit: Option<&Path>, env_dir: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    if let Some(dir) = env_dir.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    match home.filter(|h| !h.as_os_str().is_empty()) {
        Some(home) => home.join(".local").join("share").join("mathdrill"),
        None => PathBuf::from(".mathdrill"),
    }
}

/// A resolved data directory and the files inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve using [`resolve_data_dir`].
    pub fn resolve(explicit: Option<&Path>) -> Self {
        Self::new(resolve_data_dir(explicit))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn history_path(&self) -> PathBuf {
        self.root.join(HISTORY_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }
}
