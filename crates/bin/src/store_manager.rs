//! Result store location.
//!
//! The store lives in a platform-specific data directory unless a path is
//! configured.

use kessan_data::{DataError, ResultStore};
use std::path::{Path, PathBuf};

/// Get the default data directory path.
///
/// Uses platform-specific data directories:
/// - Linux: `~/.local/share/kessan/`
/// - macOS: `~/Library/Application Support/kessan/`
/// - Windows: `%APPDATA%\kessan\`
pub(crate) fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kessan")
}

/// Get the default store database path.
pub(crate) fn default_db_path() -> PathBuf {
    default_data_dir().join("kessan.db")
}

/// Open the store, creating the parent directory if needed.
pub(crate) fn open_store(path: &Path, prefix: &str) -> Result<ResultStore, DataError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    ResultStore::new(path, prefix)
}
