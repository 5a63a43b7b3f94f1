//! Operation-value growth.

use super::percentage_of;
use crate::group::{CompanyGroup, group_by_company, map_groups};
use crate::valuation::ValuationRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Operation-value growth of one filing.
///
/// Every figure defaults to `0.0`; a zero baseline leaves the percentages
/// at `0.0` rather than null.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OpValueGrowth {
    /// Growth amount in operation value
    pub growth_amount_opvalue: f64,
    /// Growth amount as a percentage of the baseline operation value
    pub growth_percentage_opvalue: f64,
    /// Forecast growth in percent
    pub projected_growth_rate_opvalue: f64,
}

/// A valuation with its operation-value growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpValueGrowthRecord {
    /// The valuation
    #[serde(flatten)]
    pub valuation: ValuationRecord,
    /// Growth figures
    #[serde(flatten)]
    pub growth: OpValueGrowth,
}

/// Most recent FY valuation of `fiscal_year` in a period-end-ordered slice.
fn prior_full_year(company: &[ValuationRecord], fiscal_year: i32) -> Option<&ValuationRecord> {
    company
        .iter()
        .rev()
        .find(|v| v.quarter.is_full_year() && v.fiscal_year() == Some(fiscal_year))
}

/// Operation-value growth of `valuation` relative to the other valuations of its company.
///
/// FY filings grow from their own operation value to their next-year
/// forecast. Quarterly filings grow from the previous fiscal year's FY
/// operation value to their current-year forecast.
pub fn opvalue_growth(valuation: &ValuationRecord, company: &[ValuationRecord]) -> OpValueGrowth {
    if valuation.quarter.is_full_year() {
        let next = valuation.next_year_forecast_opvalue;
        if next == 0.0 {
            return OpValueGrowth::default();
        }
        let amount = next - valuation.opvalue;
        let percentage = percentage_of(amount, valuation.opvalue).unwrap_or(0.0);
        return OpValueGrowth {
            growth_amount_opvalue: amount,
            growth_percentage_opvalue: percentage,
            projected_growth_rate_opvalue: percentage,
        };
    }

    let Some(prior) = valuation
        .fiscal_year()
        .and_then(|year| prior_full_year(company, year - 1))
    else {
        return OpValueGrowth::default();
    };

    let forecast = valuation.forecast_opvalue;
    let amount = forecast - prior.opvalue;
    let percentage = percentage_of(amount, prior.opvalue).unwrap_or(0.0);
    OpValueGrowth {
        growth_amount_opvalue: amount,
        growth_percentage_opvalue: percentage,
        projected_growth_rate_opvalue: if forecast == 0.0 { 0.0 } else { percentage },
    }
}

/// Operation-value growth for every valuation of one company.
pub fn company_opvalue_growth(
    mut group: CompanyGroup<ValuationRecord>,
) -> Vec<OpValueGrowthRecord> {
    debug!(seccode = %group.seccode, rows = group.len(), "processing operation value");
    group.sort_by_period_end();

    let growth: Vec<OpValueGrowth> = group
        .records
        .iter()
        .map(|valuation| opvalue_growth(valuation, &group.records))
        .collect();

    group
        .records
        .into_iter()
        .zip(growth)
        .map(|(valuation, growth)| OpValueGrowthRecord { valuation, growth })
        .collect()
}

/// Operation-value growth for a valuation collection.
pub fn derive_opvalue_growth(
    valuations: Vec<ValuationRecord>,
    parallel: bool,
) -> Vec<OpValueGrowthRecord> {
    info!(rows = valuations.len(), "deriving operation value growth");
    map_groups(group_by_company(valuations), parallel, company_opvalue_growth)
}
