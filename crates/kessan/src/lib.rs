#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/kessan-rs/kessan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export main types from sub-crates
pub use kessan_core as core;
pub use kessan_data as data;
pub use kessan_output as output;

pub use kessan_core::{Pipeline, PipelineConfig, PipelineOutput, ValuationConfig};

use chrono::{DateTime, Utc};

/// Derive every dataset from the raw table of `store` and replace the derived tables.
///
/// Returns the pipeline output with the number of raw records it was derived from.
pub fn rederive(
    store: &data::ResultStore,
    config: PipelineConfig,
    stamped_at: DateTime<Utc>,
) -> data::Result<(PipelineOutput, usize)> {
    let records = store.load_disclosures()?;
    let input = records.len();
    let output = Pipeline::new(config).run_at(records, stamped_at);
    store.replace_derived(&output)?;
    Ok((output, input))
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
