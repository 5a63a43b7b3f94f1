#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/kessan-rs/kessan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod ingest;
pub mod jquants;
pub mod source;
pub mod store;

pub use error::{DataError, Result};
pub use ingest::{CompanyDirectory, IngestStats, ingest};
pub use jquants::{JQuantsClient, RawStatement, StatementsQuery};
pub use source::{read_listed_info_file, read_statements_file, read_statements_files};
pub use store::{DEFAULT_TABLE_PREFIX, ResultStore, StoreStats, TableNames};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
