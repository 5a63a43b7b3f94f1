//! Row-level derivation errors.

use thiserror::Error;

/// Result type for single-row derivations.
pub type Result<T> = std::result::Result<T, DeriveError>;

/// Errors raised while deriving metrics for a single row.
///
/// These never abort a company or a run: the row is logged and skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeriveError {
    /// A figure required by the derivation is null
    #[error("missing required field `{field}`")]
    MissingField {
        /// Column name of the missing field
        field: &'static str,
    },

    /// A derived figure is NaN or infinite
    #[error("non-finite value for `{field}`: {value}")]
    NonFinite {
        /// Column name of the derived figure
        field: &'static str,
        /// The offending value
        value: f64,
    },
}

/// Require a nullable figure to be present.
pub(crate) const fn require(value: Option<f64>, field: &'static str) -> Result<f64> {
    match value {
        Some(v) => Ok(v),
        None => Err(DeriveError::MissingField { field }),
    }
}

/// Require a derived figure to be finite.
pub(crate) fn finite(value: f64, field: &'static str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DeriveError::NonFinite { field, value })
    }
}
