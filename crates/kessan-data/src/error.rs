//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while fetching, reading or storing data.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The statements API answered with an error status
    #[error("J-Quants API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Authentication did not yield a token
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A request was made before authenticating
    #[error("Not authenticated, call authenticate() first")]
    NotAuthenticated,

    /// A statements query named neither a code nor a date
    #[error("Either a company code or a disclosure date must be given")]
    EmptyQuery,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A table the operation needs does not exist
    #[error("Table not found: {0}")]
    MissingTable(String),

    /// A table prefix that is not a plain SQL identifier
    #[error("Invalid table prefix: {0:?}")]
    InvalidTablePrefix(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
