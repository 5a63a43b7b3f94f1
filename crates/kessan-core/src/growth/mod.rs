//! Growth derivations.
//!
//! Two structurally similar derivations over a company's filings ordered by
//! period-end date:
//!
//! - [`netsales`]: year-over-year net-sales growth against the same quarter
//!   one fiscal year earlier, and projected growth from forecasts
//! - [`opvalue`]: operation-value growth against the company's FY filing of
//!   the previous fiscal year, or against its own next-year forecast
//!
//! Percentages divide by the absolute value of the baseline so that growth
//! from a negative baseline keeps a meaningful sign.

pub mod netsales;
pub mod opvalue;

pub use netsales::{NetSalesGrowthRecord, SalesGrowth, derive_sales_growth};
pub use opvalue::{OpValueGrowth, OpValueGrowthRecord, derive_opvalue_growth};

/// `amount / |baseline| * 100`, or `None` when the baseline is zero.
pub fn percentage_of(amount: f64, baseline: f64) -> Option<f64> {
    (baseline != 0.0).then(|| amount / baseline.abs() * 100.0)
}
