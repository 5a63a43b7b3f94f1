//! J-Quants response payloads.
//!
//! The statements endpoint reports figures as strings and uses an empty
//! string for a missing figure. Figures and dates are therefore coerced
//! leniently: anything that does not parse becomes `None`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One financial statement as published by J-Quants (`fins/statements`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawStatement {
    /// Disclosure date
    #[serde(deserialize_with = "lenient_date")]
    pub disclosed_date: Option<NaiveDate>,
    /// Document type, e.g. `FYFinancialStatements_Consolidated_JP`
    pub type_of_document: String,
    /// Five-character issue code
    pub local_code: String,
    /// Period type: `1Q`, `2Q`, `3Q`, `FY`
    pub type_of_current_period: String,
    /// Current fiscal-year-end date
    #[serde(deserialize_with = "lenient_date")]
    pub current_fiscal_year_end_date: Option<NaiveDate>,
    /// Current period-end date
    #[serde(deserialize_with = "lenient_date")]
    pub current_period_end_date: Option<NaiveDate>,

    /// Total assets
    #[serde(deserialize_with = "lenient_number")]
    pub total_assets: Option<f64>,
    /// Equity
    #[serde(deserialize_with = "lenient_number")]
    pub equity: Option<f64>,
    /// Net sales
    #[serde(deserialize_with = "lenient_number")]
    pub net_sales: Option<f64>,
    /// Operating profit
    #[serde(deserialize_with = "lenient_number")]
    pub operating_profit: Option<f64>,
    /// Ordinary profit
    #[serde(deserialize_with = "lenient_number")]
    pub ordinary_profit: Option<f64>,
    /// Profit
    #[serde(deserialize_with = "lenient_number")]
    pub profit: Option<f64>,
    /// Earnings per share
    #[serde(deserialize_with = "lenient_number")]
    pub earnings_per_share: Option<f64>,
    /// Annual dividend per share (result)
    #[serde(deserialize_with = "lenient_number")]
    pub result_dividend_per_share_annual: Option<f64>,

    /// Forecast net sales
    #[serde(deserialize_with = "lenient_number")]
    pub forecast_net_sales: Option<f64>,
    /// Forecast operating profit
    #[serde(deserialize_with = "lenient_number")]
    pub forecast_operating_profit: Option<f64>,
    /// Forecast ordinary profit
    #[serde(deserialize_with = "lenient_number")]
    pub forecast_ordinary_profit: Option<f64>,
    /// Forecast profit
    #[serde(deserialize_with = "lenient_number")]
    pub forecast_profit: Option<f64>,
    /// Forecast annual dividend per share
    #[serde(deserialize_with = "lenient_number")]
    pub forecast_dividend_per_share_annual: Option<f64>,

    /// Next-year forecast net sales
    #[serde(deserialize_with = "lenient_number")]
    pub next_year_forecast_net_sales: Option<f64>,
    /// Next-year forecast operating profit
    #[serde(deserialize_with = "lenient_number")]
    pub next_year_forecast_operating_profit: Option<f64>,
    /// Next-year forecast ordinary profit
    #[serde(deserialize_with = "lenient_number")]
    pub next_year_forecast_ordinary_profit: Option<f64>,
    /// Next-year forecast profit
    #[serde(deserialize_with = "lenient_number")]
    pub next_year_forecast_profit: Option<f64>,
    /// Next-year forecast annual dividend per share
    #[serde(deserialize_with = "lenient_number")]
    pub next_year_forecast_dividend_per_share_annual: Option<f64>,

    /// Issued shares at fiscal-year end, treasury stock included
    #[serde(
        rename = "NumberOfIssuedAndOutstandingSharesAtTheEndOfFiscalYearIncludingTreasuryStock",
        deserialize_with = "lenient_number"
    )]
    pub issued_shares_including_treasury: Option<f64>,
    /// Treasury shares at fiscal-year end
    #[serde(
        rename = "NumberOfTreasuryStockAtTheEndOfFiscalYear",
        deserialize_with = "lenient_number"
    )]
    pub treasury_shares: Option<f64>,
}

/// A page of `fins/statements`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementsPage {
    /// Statements on this page
    #[serde(default)]
    pub statements: Vec<RawStatement>,
    /// Key of the next page, absent on the last page
    pub pagination_key: Option<String>,
}

/// One listed issue (`listed/info`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListedInfo {
    /// Five-character issue code
    pub code: String,
    /// Company name
    pub company_name: String,
}

/// The `listed/info` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListedInfoResponse {
    /// Listed issues
    #[serde(default)]
    pub info: Vec<ListedInfo>,
}

/// Parse a number or a numeric string; anything else is `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| coerce_number(&v)))
}

/// Parse a `YYYY-MM-DD` string; anything else is `None`.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    }))
}

/// Numeric content of a JSON value, if finite.
pub fn coerce_number(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}
