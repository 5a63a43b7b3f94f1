#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/kessan-rs/kessan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod group;
pub mod growth;
pub mod pipeline;
pub mod reconcile;
pub mod record;
pub mod schema;
pub mod valuation;

pub use error::{DeriveError, Result};
pub use group::{CompanyGroup, CompanyRecord, group_by_company};
pub use growth::{
    NetSalesGrowthRecord, OpValueGrowth, OpValueGrowthRecord, SalesGrowth, derive_opvalue_growth,
    derive_sales_growth,
};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput};
pub use reconcile::reconcile;
pub use record::{
    DisclosureRecord, ForecastField, Quarter, ReconciledRecord, Revision, RevisionMark,
};
pub use schema::{Column, ColumnKind, TabularRecord, Value};
pub use valuation::{ValuationConfig, ValuationEngine, ValuationRecord};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
