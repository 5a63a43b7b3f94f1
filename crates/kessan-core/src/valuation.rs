//! Valuation derivation.
//!
//! Computes book value per share, an evaluation-adjusted book value, a
//! heuristic operation value built from earnings power, return on assets
//! and a leverage factor, and the resulting fair value. Per-share figures
//! are expressed against the company's most recent share count so that a
//! history spanning splits or issuances stays comparable.

use crate::error::{Result, finite, require};
use crate::group::{CompanyGroup, CompanyRecord, group_by_company, map_groups};
use crate::record::{Quarter, ReconciledRecord};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Configuration for the valuation engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Multiplier applied to `eps * roa * leverage` (default: 150)
    pub operation_value_multiplier: f64,
    /// Share of ordinary profit used as the earnings basis (default: 0.7)
    pub ordinary_profit_ratio: f64,
    /// Upper bound for the absolute return on assets (default: 0.30)
    pub roa_cap: f64,
    /// Offset added to the equity ratio before inverting it (default: 0.33)
    pub leverage_offset: f64,
    /// Lower bound for the leverage factor (default: 1.0)
    pub leverage_floor: f64,
    /// Upper bound for the leverage factor (default: 1.5)
    pub leverage_cap: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            operation_value_multiplier: 150.0,
            ordinary_profit_ratio: 0.7,
            roa_cap: 0.30,
            leverage_offset: 0.33,
            leverage_floor: 1.0,
            leverage_cap: 1.5,
        }
    }
}

/// Valuation metrics for one non-revision filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRecord {
    /// When the record was derived
    pub timestamp: DateTime<Utc>,
    /// Filing date (after reconciliation)
    #[serde(rename = "filingdate")]
    pub filing_date: Option<NaiveDate>,
    /// Company identifier
    pub seccode: String,
    /// Company name
    #[serde(rename = "companyname")]
    pub company_name: String,
    /// Period label
    pub quarter: Quarter,
    /// Period-end date
    #[serde(rename = "quarterenddate")]
    pub period_end: Option<NaiveDate>,

    /// Book value per share
    pub bps: f64,
    /// Book value per share scaled by the asset evaluation rate
    pub bps_eval: f64,
    /// Operation value from actual results
    pub opvalue: f64,
    /// Operation value from the current-year forecast
    #[serde(rename = "fcastopvalue")]
    pub forecast_opvalue: f64,
    /// Operation value from the next-year forecast
    #[serde(rename = "nextyrfcastopvalue")]
    pub next_year_forecast_opvalue: f64,

    /// Actual annual dividend as filed
    #[serde(rename = "original_divannual_for_chart")]
    pub original_dividend_for_chart: Option<f64>,
    /// Actual (or forecast) annual dividend on the latest share count
    #[serde(rename = "adjusted_divannual_for_chart")]
    pub adjusted_dividend_for_chart: Option<f64>,
    /// Next-year forecast dividend as filed
    #[serde(rename = "original_fcastdivannual_for_chart")]
    pub original_forecast_dividend_for_chart: Option<f64>,
    /// Next-year (or current-year) forecast dividend on the latest share count
    #[serde(rename = "adjusted_fcastdivannual_for_chart")]
    pub adjusted_forecast_dividend_for_chart: Option<f64>,
    /// Annual dividend per share (result)
    #[serde(rename = "divannual")]
    pub dividend_annual: Option<f64>,
    /// Current-year forecast annual dividend
    #[serde(rename = "fcastdivannual")]
    pub forecast_dividend_annual: Option<f64>,
    /// Next-year forecast annual dividend
    #[serde(rename = "nextyrfcastdivannual")]
    pub next_year_forecast_dividend_annual: Option<f64>,

    /// Fiscal-year-end date
    #[serde(rename = "fiscalyearend")]
    pub fiscal_year_end: Option<NaiveDate>,
    /// Issued shares of this filing, including treasury stock
    #[serde(rename = "issuedsharesincltreasury")]
    pub issued_shares: f64,
    /// Most recent share count of the company
    pub latest_shares: f64,
    /// Total assets
    #[serde(rename = "totassets")]
    pub total_assets: f64,
    /// Equity
    pub equity: f64,
    /// `equity / total_assets`
    #[serde(rename = "equityratio")]
    pub equity_ratio: f64,
    /// Discount applied to book value, stepped on the equity ratio
    #[serde(rename = "assetevalrate")]
    pub asset_eval_rate: f64,
    /// Leverage factor in `[leverage_floor, leverage_cap]`
    #[serde(rename = "roaleverage")]
    pub roa_leverage: f64,

    /// Earnings per latest share
    pub eps: f64,
    /// Forecast earnings per latest share
    #[serde(rename = "fcasteps")]
    pub forecast_eps: f64,
    /// Next-year forecast earnings per latest share
    #[serde(rename = "nextyrfcasteps")]
    pub next_year_forecast_eps: f64,
    /// Return on assets, rounded to two decimals
    pub roa: f64,
    /// Forecast return on assets
    #[serde(rename = "fcastroa")]
    pub forecast_roa: f64,
    /// Next-year forecast return on assets
    #[serde(rename = "nextyrfcastroa")]
    pub next_year_forecast_roa: f64,

    /// `bps_eval + max(0, opvalue)`
    #[serde(rename = "fairvalue")]
    pub fair_value: f64,
    /// Fair value from the current-year forecast
    #[serde(rename = "fcastfairvalue")]
    pub forecast_fair_value: f64,
    /// Fair value from the next-year forecast
    #[serde(rename = "nextyrfcastfairvalue")]
    pub next_year_forecast_fair_value: f64,
    /// Document type
    pub docname: String,
}

impl ValuationRecord {
    /// Calendar year of the fiscal-year-end date.
    pub fn fiscal_year(&self) -> Option<i32> {
        self.fiscal_year_end.map(|d| d.year())
    }
}

impl CompanyRecord for ValuationRecord {
    fn seccode(&self) -> &str {
        &self.seccode
    }

    fn filing_date(&self) -> Option<NaiveDate> {
        self.filing_date
    }

    fn period_end(&self) -> Option<NaiveDate> {
        self.period_end
    }
}

/// Asset evaluation rate for an equity ratio.
///
/// | equity ratio | rate |
/// |---|---|
/// | < 0.10 | 0.50 |
/// | [0.10, 0.33) | 0.60 |
/// | [0.33, 0.50) | 0.65 |
/// | [0.50, 0.67) | 0.70 |
/// | [0.67, 0.80) | 0.75 |
/// | >= 0.80 | 0.80 |
pub const fn asset_evaluation_rate(equity_ratio: f64) -> f64 {
    if equity_ratio < 0.10 {
        0.50
    } else if equity_ratio < 0.33 {
        0.60
    } else if equity_ratio < 0.50 {
        0.65
    } else if equity_ratio < 0.67 {
        0.70
    } else if equity_ratio < 0.80 {
        0.75
    } else {
        0.80
    }
}

/// Most recent positive share count of a company.
///
/// The count of the record with the latest period-end date wins; records
/// without a period-end date only count when no dated record qualifies.
pub fn latest_share_count(records: &[ReconciledRecord]) -> Option<f64> {
    records
        .iter()
        .filter_map(|r| {
            r.disclosure
                .issued_shares
                .filter(|shares| *shares > 0.0)
                .map(|shares| (r.disclosure.period_end, shares))
        })
        .max_by_key(|(period_end, _)| (period_end.is_some(), *period_end))
        .map(|(_, shares)| shares)
}

/// Per-share earnings power derived from one earnings basis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct EarningsPower {
    eps: f64,
    roa: f64,
    opvalue: f64,
    fair_value: f64,
}

/// Computes [`ValuationRecord`]s from reconciled filings
#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    config: ValuationConfig,
}

impl ValuationEngine {
    /// Create an engine with the given configuration.
    pub const fn with_config(config: ValuationConfig) -> Self {
        Self { config }
    }

    /// The engine configuration.
    pub const fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Leverage factor `1 / (equity_ratio + offset)` bounded to the configured range.
    pub fn roa_leverage(&self, equity_ratio: f64) -> f64 {
        (1.0 / (equity_ratio + self.config.leverage_offset))
            .max(self.config.leverage_floor)
            .min(self.config.leverage_cap)
    }

    /// Earnings basis: a share of ordinary profit, or profit when ordinary
    /// profit is missing or zero.
    fn earnings_basis(&self, ordinary_profit: Option<f64>, profit: Option<f64>) -> Option<f64> {
        match ordinary_profit {
            Some(ordinary) if ordinary != 0.0 => Some(ordinary * self.config.ordinary_profit_ratio),
            _ => profit,
        }
    }

    fn earnings_power(
        &self,
        basis: f64,
        latest_shares: f64,
        total_assets: f64,
        leverage: f64,
        bps_eval: f64,
    ) -> EarningsPower {
        let eps = basis / latest_shares;
        let roa = (basis / total_assets).abs().min(self.config.roa_cap);
        let opvalue = eps * roa * self.config.operation_value_multiplier * leverage;
        EarningsPower {
            eps,
            roa,
            opvalue,
            fair_value: bps_eval + opvalue.max(0.0),
        }
    }

    /// Whether a filing can be valued at all.
    fn is_eligible(record: &ReconciledRecord) -> bool {
        let d = &record.disclosure;
        matches!(d.total_assets, Some(assets) if assets > 0.0)
            && matches!(d.issued_shares, Some(shares) if shares > 0.0)
    }

    /// Value a single eligible filing.
    pub fn derive_row(
        &self,
        record: &ReconciledRecord,
        latest_shares: f64,
        stamped_at: DateTime<Utc>,
    ) -> Result<ValuationRecord> {
        let d = &record.disclosure;
        let total_assets = require(d.total_assets, "totassets")?;
        let shares = require(d.issued_shares, "issuedsharesincltreasury")?;
        let equity = require(d.equity, "equity")?;

        let equity_ratio = finite(equity / total_assets, "equityratio")?;
        let asset_eval_rate = asset_evaluation_rate(equity_ratio);
        let bps = equity / latest_shares;
        let bps_eval = equity * asset_eval_rate / latest_shares;
        let roa_leverage = self.roa_leverage(equity_ratio);

        let basis = require(self.earnings_basis(d.ordinary_profit, d.profit), "profit")?;
        let actual =
            self.earnings_power(basis, latest_shares, total_assets, roa_leverage, bps_eval);

        let (forecast, next_year) = if d.quarter.is_full_year() {
            let basis = self
                .earnings_basis(
                    d.next_year_forecast_ordinary_profit,
                    d.next_year_forecast_profit,
                )
                .unwrap_or(0.0);
            let next_year =
                self.earnings_power(basis, latest_shares, total_assets, roa_leverage, bps_eval);
            (EarningsPower::default(), next_year)
        } else {
            let basis = self
                .earnings_basis(d.forecast_ordinary_profit, d.forecast_profit)
                .unwrap_or(0.0);
            let forecast =
                self.earnings_power(basis, latest_shares, total_assets, roa_leverage, bps_eval);
            // Quarterly filings carry the current-year forecast forward.
            (forecast, forecast)
        };

        // Exactly 1.0 when this filing reports the latest share count.
        let share_scale = shares / latest_shares;
        let adjusted_dividend = match d.dividend_annual {
            Some(dividend) if dividend != 0.0 => Some(dividend),
            _ => d.forecast_dividend_annual,
        }
        .map(|dividend| dividend * share_scale);
        let adjusted_forecast_dividend = match d.next_year_forecast_dividend_annual {
            Some(dividend) if dividend != 0.0 => Some(dividend),
            _ => d.forecast_dividend_annual,
        }
        .map(|dividend| dividend * share_scale);

        Ok(ValuationRecord {
            timestamp: stamped_at,
            filing_date: d.filing_date,
            seccode: d.seccode.clone(),
            company_name: d.company_name.clone(),
            quarter: d.quarter.clone(),
            period_end: d.period_end,
            bps: finite(bps, "bps")?,
            bps_eval: finite(bps_eval, "bps_eval")?,
            opvalue: finite(actual.opvalue, "opvalue")?,
            forecast_opvalue: finite(forecast.opvalue, "fcastopvalue")?,
            next_year_forecast_opvalue: finite(next_year.opvalue, "nextyrfcastopvalue")?,
            original_dividend_for_chart: d.dividend_annual,
            adjusted_dividend_for_chart: adjusted_dividend,
            original_forecast_dividend_for_chart: d.next_year_forecast_dividend_annual,
            adjusted_forecast_dividend_for_chart: adjusted_forecast_dividend,
            dividend_annual: d.dividend_annual,
            forecast_dividend_annual: d.forecast_dividend_annual,
            next_year_forecast_dividend_annual: d.next_year_forecast_dividend_annual,
            fiscal_year_end: d.fiscal_year_end,
            issued_shares: shares,
            latest_shares,
            total_assets,
            equity,
            equity_ratio,
            asset_eval_rate,
            roa_leverage,
            eps: actual.eps,
            forecast_eps: forecast.eps,
            next_year_forecast_eps: next_year.eps,
            roa: round_to_hundredths(actual.roa),
            forecast_roa: forecast.roa,
            next_year_forecast_roa: next_year.roa,
            fair_value: finite(actual.fair_value, "fairvalue")?,
            forecast_fair_value: finite(forecast.fair_value, "fcastfairvalue")?,
            next_year_forecast_fair_value: finite(next_year.fair_value, "nextyrfcastfairvalue")?,
            docname: d.docname.clone(),
        })
    }

    /// Value every eligible filing of one company, ordered by period-end date.
    ///
    /// Filings with non-positive total assets or share count are left out.
    /// A filing whose derivation fails is logged and left out; the rest of
    /// the company is still valued.
    pub fn value_company(
        &self,
        mut group: CompanyGroup<ReconciledRecord>,
        stamped_at: DateTime<Utc>,
    ) -> Vec<ValuationRecord> {
        let Some(latest_shares) = latest_share_count(&group.records) else {
            debug!(seccode = %group.seccode, "no valid share count, skipping company");
            return Vec::new();
        };

        group.sort_by_period_end();
        group
            .records
            .iter()
            .filter(|record| Self::is_eligible(record))
            .filter_map(
                |record| match self.derive_row(record, latest_shares, stamped_at) {
                    Ok(valuation) => Some(valuation),
                    Err(e) => {
                        warn!(
                            seccode = %group.seccode,
                            filingdate = ?record.disclosure.filing_date,
                            error = %e,
                            "error processing row"
                        );
                        None
                    }
                },
            )
            .collect()
    }

    /// Value every non-revision filing in a reconciled collection.
    pub fn derive(
        &self,
        records: Vec<ReconciledRecord>,
        stamped_at: DateTime<Utc>,
        parallel: bool,
    ) -> Vec<ValuationRecord> {
        let total = records.len();
        let substantive: Vec<_> = records
            .into_iter()
            .filter(|r| !r.disclosure.is_revision())
            .collect();
        info!(
            rows = substantive.len(),
            revisions = total - substantive.len(),
            "valuing filings"
        );

        let groups = group_by_company(substantive);
        map_groups(groups, parallel, |group| {
            self.value_company(group, stamped_at)
        })
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::DisclosureRecord;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn stamp() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn filing(quarter: Quarter, period_end: (i32, u32, u32), shares: f64) -> ReconciledRecord {
        let mut d = DisclosureRecord::new("1301", "FYFinancialStatements", quarter);
        d.period_end = NaiveDate::from_ymd_opt(period_end.0, period_end.1, period_end.2);
        d.fiscal_year_end = d.period_end;
        d.total_assets = Some(1000.0);
        d.equity = Some(400.0);
        d.ordinary_profit = Some(100.0);
        d.profit = Some(60.0);
        d.issued_shares = Some(shares);
        ReconciledRecord::unflagged(d)
    }

    #[rstest]
    #[case(-0.2, 0.50)]
    #[case(0.0999, 0.50)]
    #[case(0.10, 0.60)]
    #[case(0.3299, 0.60)]
    #[case(0.33, 0.65)]
    #[case(0.50, 0.70)]
    #[case(0.67, 0.75)]
    #[case(0.7999, 0.75)]
    #[case(0.80, 0.80)]
    #[case(1.2, 0.80)]
    fn test_asset_evaluation_rate_steps(#[case] equity_ratio: f64, #[case] expected: f64) {
        assert_relative_eq!(asset_evaluation_rate(equity_ratio), expected);
    }

    #[rstest]
    #[case(0.125, 0.12)]
    #[case(0.375, 0.38)]
    #[case(0.1234, 0.12)]
    #[case(0.2999, 0.30)]
    fn test_roa_rounds_half_to_even(#[case] roa: f64, #[case] expected: f64) {
        assert_relative_eq!(round_to_hundredths(roa), expected);
    }

    #[rstest]
    #[case(-5.0)]
    #[case(-0.33)]
    #[case(0.0)]
    #[case(0.2)]
    #[case(0.5)]
    #[case(3.0)]
    fn test_roa_leverage_bounded(#[case] equity_ratio: f64) {
        let leverage = ValuationEngine::default().roa_leverage(equity_ratio);
        assert!((1.0..=1.5).contains(&leverage), "leverage {leverage}");
    }

    #[test]
    fn test_derive_row_actual_metrics() {
        let engine = ValuationEngine::default();
        let record = filing(Quarter::FullYear, (2024, 3, 31), 100.0);

        let v = engine.derive_row(&record, 100.0, stamp()).unwrap();

        let leverage = 1.0 / (0.4 + 0.33);
        assert_relative_eq!(v.equity_ratio, 0.4);
        assert_relative_eq!(v.asset_eval_rate, 0.65);
        assert_relative_eq!(v.bps, 4.0);
        assert_relative_eq!(v.bps_eval, 2.6, epsilon = 1e-12);
        assert_relative_eq!(v.roa_leverage, leverage);
        assert_relative_eq!(v.eps, 0.7, epsilon = 1e-12);
        assert_relative_eq!(v.roa, 0.07);
        let opvalue = 0.7 * 0.07 * 150.0 * leverage;
        assert_relative_eq!(v.opvalue, opvalue, epsilon = 1e-9);
        assert_relative_eq!(v.fair_value, 2.6 + opvalue, epsilon = 1e-9);
        assert_eq!(v.timestamp, stamp());
    }

    #[test]
    fn test_profit_basis_when_ordinary_profit_zero() {
        let engine = ValuationEngine::default();
        let mut record = filing(Quarter::FullYear, (2024, 3, 31), 100.0);
        record.disclosure.ordinary_profit = Some(0.0);

        let v = engine.derive_row(&record, 100.0, stamp()).unwrap();
        assert_relative_eq!(v.eps, 0.6);
        assert_relative_eq!(v.roa, 0.06);
    }

    #[test]
    fn test_roa_capped_and_rounded() {
        let engine = ValuationEngine::default();
        let mut record = filing(Quarter::FullYear, (2024, 3, 31), 100.0);
        record.disclosure.ordinary_profit = Some(-900.0);
        let v = engine.derive_row(&record, 100.0, stamp()).unwrap();
        assert_relative_eq!(v.roa, 0.30);
        // Negative earnings never reduce fair value below the adjusted book value.
        assert!(v.opvalue < 0.0);
        assert_relative_eq!(v.fair_value, v.bps_eval);

        record.disclosure.ordinary_profit = Some(123.4);
        let v = engine.derive_row(&record, 100.0, stamp()).unwrap();
        assert_relative_eq!(v.roa, 0.09);
    }

    #[test]
    fn test_full_year_uses_next_year_forecast() {
        let engine = ValuationEngine::default();
        let mut record = filing(Quarter::FullYear, (2024, 3, 31), 100.0);
        record.disclosure.next_year_forecast_ordinary_profit = Some(200.0);
        record.disclosure.forecast_ordinary_profit = Some(999.0);

        let v = engine.derive_row(&record, 100.0, stamp()).unwrap();

        assert_relative_eq!(v.next_year_forecast_eps, 1.4, epsilon = 1e-12);
        assert_relative_eq!(v.next_year_forecast_roa, 0.14, epsilon = 1e-12);
        assert_relative_eq!(v.forecast_opvalue, 0.0);
        assert_relative_eq!(v.forecast_fair_value, 0.0);
        assert!(v.next_year_forecast_opvalue > v.opvalue);
    }

    #[test]
    fn test_quarter_mirrors_current_forecast_into_next_year() {
        let engine = ValuationEngine::default();
        let mut record = filing(Quarter::Second, (2023, 9, 30), 100.0);
        record.disclosure.forecast_ordinary_profit = None;
        record.disclosure.forecast_profit = Some(80.0);

        let v = engine.derive_row(&record, 100.0, stamp()).unwrap();

        assert_relative_eq!(v.forecast_eps, 0.8);
        assert_relative_eq!(v.forecast_opvalue, v.next_year_forecast_opvalue);
        assert_relative_eq!(v.forecast_fair_value, v.next_year_forecast_fair_value);
    }

    #[test]
    fn test_missing_forecast_leaves_block_at_book_value() {
        let engine = ValuationEngine::default();
        let record = filing(Quarter::First, (2023, 6, 30), 100.0);

        let v = engine.derive_row(&record, 100.0, stamp()).unwrap();

        assert_relative_eq!(v.forecast_opvalue, 0.0);
        assert_relative_eq!(v.forecast_fair_value, v.bps_eval);
    }

    #[test]
    fn test_missing_equity_is_an_error() {
        let engine = ValuationEngine::default();
        let mut record = filing(Quarter::FullYear, (2024, 3, 31), 100.0);
        record.disclosure.equity = None;

        let err = engine.derive_row(&record, 100.0, stamp()).unwrap_err();
        assert_eq!(err.to_string(), "missing required field `equity`");
    }

    #[test]
    fn test_latest_share_count_uses_latest_period() {
        let records = vec![
            filing(Quarter::FullYear, (2024, 3, 31), 200.0),
            filing(Quarter::FullYear, (2022, 3, 31), 100.0),
            filing(Quarter::FullYear, (2025, 3, 31), 0.0),
        ];
        assert_eq!(latest_share_count(&records), Some(200.0));
        assert_eq!(latest_share_count(&records[2..]), None);
    }

    #[test]
    fn test_dividend_scaling_to_latest_shares() {
        let engine = ValuationEngine::default();
        let mut records = vec![
            filing(Quarter::FullYear, (2022, 3, 31), 100.0),
            filing(Quarter::FullYear, (2023, 3, 31), 100.0),
            filing(Quarter::FullYear, (2024, 3, 31), 200.0),
        ];
        for r in &mut records {
            r.disclosure.dividend_annual = Some(40.0);
            r.disclosure.next_year_forecast_dividend_annual = Some(44.0);
        }
        let group = CompanyGroup {
            seccode: "1301".to_string(),
            records,
        };

        let out = engine.value_company(group, stamp());

        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|v| v.latest_shares == 200.0));
        assert_relative_eq!(out[0].adjusted_dividend_for_chart.unwrap(), 20.0);
        assert_relative_eq!(out[1].adjusted_forecast_dividend_for_chart.unwrap(), 22.0);
        assert_relative_eq!(out[2].adjusted_dividend_for_chart.unwrap(), 40.0);
        assert_eq!(out[0].original_dividend_for_chart, Some(40.0));
        assert_eq!(out[0].original_forecast_dividend_for_chart, Some(44.0));
    }

    #[test]
    fn test_dividend_falls_back_to_forecast() {
        let engine = ValuationEngine::default();
        let mut record = filing(Quarter::Second, (2023, 9, 30), 100.0);
        record.disclosure.dividend_annual = Some(0.0);
        record.disclosure.forecast_dividend_annual = Some(12.0);

        let v = engine.derive_row(&record, 100.0, stamp()).unwrap();
        assert_eq!(v.adjusted_dividend_for_chart, Some(12.0));
        assert_eq!(v.adjusted_forecast_dividend_for_chart, Some(12.0));
        assert_eq!(v.original_forecast_dividend_for_chart, None);
    }

    #[test]
    fn test_value_company_skips_ineligible_and_failing_rows() {
        let engine = ValuationEngine::default();
        let mut no_assets = filing(Quarter::First, (2023, 6, 30), 100.0);
        no_assets.disclosure.total_assets = Some(0.0);
        let no_shares = filing(Quarter::Second, (2023, 9, 30), 0.0);
        let mut no_equity = filing(Quarter::Third, (2023, 12, 31), 100.0);
        no_equity.disclosure.equity = None;
        let good = filing(Quarter::FullYear, (2024, 3, 31), 100.0);

        let group = CompanyGroup {
            seccode: "1301".to_string(),
            records: vec![good, no_equity, no_shares, no_assets],
        };
        let out = engine.value_company(group, stamp());

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].quarter, Quarter::FullYear);
    }

    #[test]
    fn test_derive_excludes_revisions_and_orders_by_period_end() {
        let engine = ValuationEngine::default();
        let mut revision = filing(Quarter::FullYear, (2024, 3, 31), 100.0);
        revision.disclosure.docname = "EarnForecastRevision".to_string();
        let records = vec![
            filing(Quarter::FullYear, (2024, 3, 31), 100.0),
            revision,
            filing(Quarter::Third, (2023, 12, 31), 100.0),
        ];

        let out = engine.derive(records, stamp(), false);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].quarter, Quarter::Third);
        assert_eq!(out[1].quarter, Quarter::FullYear);
        assert!(out.iter().all(|v| v.docname != "EarnForecastRevision"));
    }
}
