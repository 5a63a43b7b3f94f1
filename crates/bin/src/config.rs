//! Runtime settings resolved from flags, environment and defaults.
//!
//! Flags win over environment variables (`KESSAN_*`, `JQUANTS_*`, also read
//! from `.env`), which win over the built-in defaults.

use crate::store_manager;
use kessan_core::PipelineConfig;
use std::path::PathBuf;

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    /// Store database file
    pub(crate) db_path: PathBuf,
    /// Table name prefix
    pub(crate) prefix: String,
    /// Pipeline configuration
    pub(crate) pipeline: PipelineConfig,
}

impl Settings {
    pub(crate) fn new(db_path: Option<PathBuf>, prefix: String, sequential: bool) -> Self {
        Self {
            db_path: db_path.unwrap_or_else(store_manager::default_db_path),
            prefix,
            pipeline: PipelineConfig {
                parallel: !sequential,
                ..PipelineConfig::default()
            },
        }
    }
}

/// J-Quants account credentials.
#[derive(Clone)]
pub(crate) struct Credentials {
    pub(crate) email: String,
    pub(crate) password: String,
}

impl Credentials {
    /// Both parts, or `None` when either is missing or empty.
    pub(crate) fn from_parts(email: Option<String>, password: Option<String>) -> Option<Self> {
        match (email, password) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(Self { email, password })
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}
