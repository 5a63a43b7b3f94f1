//! Net-sales growth.

use super::percentage_of;
use crate::group::{CompanyGroup, group_by_company, map_groups};
use crate::record::{Quarter, ReconciledRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Net-sales growth of one filing.
///
/// Without a prior-year filing of the same quarter, the amount and the
/// percentage are both `0.0`. With one whose net sales are zero, the amount
/// is still computed and the percentage is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesGrowth {
    /// Net sales minus the prior-year net sales
    pub growth_amount: f64,
    /// Growth amount as a percentage of the prior-year net sales
    pub growth_percentage: Option<f64>,
    /// Forecast growth in percent
    pub projected_growth_rate: Option<f64>,
}

impl Default for SalesGrowth {
    fn default() -> Self {
        Self {
            growth_amount: 0.0,
            growth_percentage: Some(0.0),
            projected_growth_rate: Some(0.0),
        }
    }
}

/// A reconciled filing with its net-sales growth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetSalesGrowthRecord {
    /// The reconciled filing
    #[serde(flatten)]
    pub record: ReconciledRecord,
    /// Growth figures
    #[serde(flatten)]
    pub growth: SalesGrowth,
}

fn net_sales(record: &ReconciledRecord) -> f64 {
    record.disclosure.net_sales.unwrap_or(0.0)
}

/// First filing of `fiscal_year` labelled `quarter`.
fn find_filing<'a>(
    records: &'a [ReconciledRecord],
    fiscal_year: i32,
    quarter: &Quarter,
) -> Option<&'a ReconciledRecord> {
    records.iter().find(|r| {
        r.disclosure.fiscal_year() == Some(fiscal_year) && r.disclosure.quarter == *quarter
    })
}

/// Net-sales growth of `record` relative to the other filings of its company.
pub fn sales_growth(record: &ReconciledRecord, company: &[ReconciledRecord]) -> SalesGrowth {
    let d = &record.disclosure;
    let previous_year = d.fiscal_year().map(|year| year - 1);
    let current = net_sales(record);

    let prior = previous_year.and_then(|year| find_filing(company, year, &d.quarter));
    let (growth_amount, growth_percentage) = match prior {
        Some(prior) => {
            let baseline = net_sales(prior);
            let amount = current - baseline;
            (amount, percentage_of(amount, baseline))
        }
        None => (0.0, Some(0.0)),
    };

    let projected_growth_rate = if d.quarter.is_full_year() {
        match d.next_year_forecast_net_sales {
            Some(next) if next != 0.0 => {
                Some(percentage_of(next - current, current).unwrap_or(0.0))
            }
            _ => Some(0.0),
        }
    } else {
        match d.forecast_net_sales {
            Some(forecast) if forecast != 0.0 => {
                let prior_full_year = previous_year
                    .and_then(|year| find_filing(company, year, &Quarter::FullYear));
                match prior_full_year {
                    Some(prior_full_year) => {
                        let baseline = net_sales(prior_full_year);
                        percentage_of(forecast - baseline, baseline)
                    }
                    None => Some(0.0),
                }
            }
            _ => Some(0.0),
        }
    };

    SalesGrowth {
        growth_amount,
        growth_percentage,
        projected_growth_rate,
    }
}

/// Net-sales growth for every filing of one company, ordered by period-end date.
pub fn company_sales_growth(
    mut group: CompanyGroup<ReconciledRecord>,
    stamped_at: DateTime<Utc>,
) -> Vec<NetSalesGrowthRecord> {
    debug!(seccode = %group.seccode, rows = group.len(), "processing net sales");
    group.sort_by_period_end();

    let growth: Vec<SalesGrowth> = group
        .records
        .iter()
        .map(|record| sales_growth(record, &group.records))
        .collect();

    group
        .records
        .into_iter()
        .zip(growth)
        .map(|(mut record, growth)| {
            record.disclosure.timestamp = stamped_at;
            NetSalesGrowthRecord { record, growth }
        })
        .collect()
}

/// Net-sales growth for every non-revision filing of a reconciled collection.
pub fn derive_sales_growth(
    records: Vec<ReconciledRecord>,
    stamped_at: DateTime<Utc>,
    parallel: bool,
) -> Vec<NetSalesGrowthRecord> {
    let substantive: Vec<_> = records
        .into_iter()
        .filter(|r| !r.disclosure.is_revision())
        .collect();
    info!(rows = substantive.len(), "deriving net sales growth");

    map_groups(group_by_company(substantive), parallel, |group| {
        company_sales_growth(group, stamped_at)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DisclosureRecord;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn filing(quarter: Quarter, fiscal_year: i32, net_sales: Option<f64>) -> ReconciledRecord {
        let (year, month, day) = match quarter {
            Quarter::First => (fiscal_year - 1, 6, 30),
            Quarter::Second => (fiscal_year - 1, 9, 30),
            Quarter::Third => (fiscal_year - 1, 12, 31),
            _ => (fiscal_year, 3, 31),
        };
        let mut d = DisclosureRecord::new("1301", "FinancialStatements", quarter);
        d.fiscal_year_end = NaiveDate::from_ymd_opt(fiscal_year, 3, 31);
        d.period_end = NaiveDate::from_ymd_opt(year, month, day);
        d.net_sales = net_sales;
        ReconciledRecord::unflagged(d)
    }

    #[test]
    fn test_year_over_year_growth() {
        let company = vec![
            filing(Quarter::FullYear, 2023, Some(1000.0)),
            filing(Quarter::FullYear, 2024, Some(1200.0)),
        ];

        let growth = sales_growth(&company[1], &company);

        assert_relative_eq!(growth.growth_amount, 200.0);
        assert_relative_eq!(growth.growth_percentage.unwrap(), 20.0);
    }

    #[test]
    fn test_no_prior_year_defaults_to_zero() {
        let company = vec![filing(Quarter::FullYear, 2024, Some(1200.0))];
        let growth = sales_growth(&company[0], &company);
        assert_eq!(growth, SalesGrowth::default());
    }

    #[test]
    fn test_zero_baseline_leaves_percentage_null() {
        let company = vec![
            filing(Quarter::Second, 2023, Some(0.0)),
            filing(Quarter::Second, 2024, Some(300.0)),
        ];

        let growth = sales_growth(&company[1], &company);

        assert_relative_eq!(growth.growth_amount, 300.0);
        assert_eq!(growth.growth_percentage, None);
    }

    #[test]
    fn test_quarter_must_match() {
        let company = vec![
            filing(Quarter::First, 2023, Some(100.0)),
            filing(Quarter::Second, 2024, Some(300.0)),
        ];
        let growth = sales_growth(&company[1], &company);
        assert_relative_eq!(growth.growth_amount, 0.0);
        assert_eq!(growth.growth_percentage, Some(0.0));
    }

    #[test]
    fn test_negative_baseline_uses_absolute_value() {
        let company = vec![
            filing(Quarter::FullYear, 2023, Some(-100.0)),
            filing(Quarter::FullYear, 2024, Some(50.0)),
        ];
        let growth = sales_growth(&company[1], &company);
        assert_relative_eq!(growth.growth_percentage.unwrap(), 150.0);
    }

    #[test]
    fn test_full_year_projection_from_next_year_forecast() {
        let mut fy = filing(Quarter::FullYear, 2024, Some(1000.0));
        fy.disclosure.next_year_forecast_net_sales = Some(1100.0);
        let mut zero_sales = filing(Quarter::FullYear, 2025, Some(0.0));
        zero_sales.disclosure.next_year_forecast_net_sales = Some(500.0);
        let company = vec![fy, zero_sales];

        assert_relative_eq!(
            sales_growth(&company[0], &company).projected_growth_rate.unwrap(),
            10.0
        );
        assert_eq!(
            sales_growth(&company[1], &company).projected_growth_rate,
            Some(0.0)
        );
    }

    #[test]
    fn test_full_year_projection_without_fiscal_year_end() {
        let mut fy = filing(Quarter::FullYear, 2024, Some(1000.0));
        fy.disclosure.fiscal_year_end = None;
        fy.disclosure.next_year_forecast_net_sales = Some(1100.0);
        let company = vec![fy];

        let growth = sales_growth(&company[0], &company);

        assert_relative_eq!(growth.growth_amount, 0.0);
        assert_eq!(growth.growth_percentage, Some(0.0));
        assert_relative_eq!(growth.projected_growth_rate.unwrap(), 10.0);
    }

    #[test]
    fn test_quarter_projection_against_prior_full_year() {
        let prior = filing(Quarter::FullYear, 2023, Some(800.0));
        let mut q2 = filing(Quarter::Second, 2024, Some(450.0));
        q2.disclosure.forecast_net_sales = Some(1000.0);
        let zero_prior = filing(Quarter::FullYear, 2024, Some(0.0));
        let mut q1 = filing(Quarter::First, 2025, Some(100.0));
        q1.disclosure.forecast_net_sales = Some(900.0);
        let company = vec![prior, q2, zero_prior, q1];

        assert_relative_eq!(
            sales_growth(&company[1], &company).projected_growth_rate.unwrap(),
            25.0
        );
        assert_eq!(sales_growth(&company[3], &company).projected_growth_rate, None);
    }

    #[test]
    fn test_missing_net_sales_counts_as_zero() {
        let company = vec![
            filing(Quarter::FullYear, 2023, Some(1000.0)),
            filing(Quarter::FullYear, 2024, None),
        ];
        let growth = sales_growth(&company[1], &company);
        assert_relative_eq!(growth.growth_amount, -1000.0);
        assert_relative_eq!(growth.growth_percentage.unwrap(), -100.0);
    }

    #[test]
    fn test_derive_excludes_revisions_and_sorts_by_period_end() {
        let stamp = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        let mut revision = filing(Quarter::FullYear, 2024, Some(1.0));
        revision.disclosure.docname = "DividendForecastRevision".to_string();
        let records = vec![
            filing(Quarter::FullYear, 2024, Some(1200.0)),
            revision,
            filing(Quarter::FullYear, 2023, Some(1000.0)),
        ];

        let out = derive_sales_growth(records, stamp, true);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].record.disclosure.fiscal_year(), Some(2023));
        assert_relative_eq!(out[1].growth.growth_amount, 200.0);
        assert!(out.iter().all(|r| r.record.disclosure.timestamp == stamp));
    }
}
