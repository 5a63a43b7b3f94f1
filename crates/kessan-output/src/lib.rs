#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/kessan-rs/kessan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod frame;
pub mod summary;

pub use export::{ExportError, ExportFormat, Exporter, export_pipeline_output};
pub use frame::to_dataframe;
pub use summary::RunSummary;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
