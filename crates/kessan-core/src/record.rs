//! Disclosure records and the reconciled records produced from them.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Period label of a filing.
///
/// Quarterly statements are labelled `1`, `2`, `3`; the fiscal-year-end
/// statement is labelled `FY`. Any other label is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Quarter {
    /// First quarter (`1`)
    First,
    /// Second quarter (`2`)
    Second,
    /// Third quarter (`3`)
    Third,
    /// Fiscal-year-end statement (`FY`)
    FullYear,
    /// Any other period label
    Other(String),
}

impl Quarter {
    /// Parse a period label such as `1`, `2`, `3` or `FY`.
    pub fn parse(label: &str) -> Self {
        match label {
            "1" => Self::First,
            "2" => Self::Second,
            "3" => Self::Third,
            "FY" => Self::FullYear,
            other => Self::Other(other.to_string()),
        }
    }

    /// Parse a provider period type such as `1Q` or `FY`, dropping a trailing `Q`.
    pub fn from_period_type(period_type: &str) -> Self {
        Self::parse(period_type.strip_suffix('Q').unwrap_or(period_type))
    }

    /// The label as stored in the datasets.
    pub fn as_str(&self) -> &str {
        match self {
            Self::First => "1",
            Self::Second => "2",
            Self::Third => "3",
            Self::FullYear => "FY",
            Self::Other(label) => label,
        }
    }

    /// Whether this is the fiscal-year-end statement.
    pub const fn is_full_year(&self) -> bool {
        matches!(self, Self::FullYear)
    }
}

impl From<String> for Quarter {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<Quarter> for String {
    fn from(quarter: Quarter) -> Self {
        quarter.as_str().to_string()
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forecast-revision document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Revision {
    /// Revision of the earnings forecast
    #[serde(rename = "EarnForecastRevision")]
    EarnForecast,
    /// Revision of the dividend forecast
    #[serde(rename = "DividendForecastRevision")]
    DividendForecast,
}

impl Revision {
    /// Document type name of the revision.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EarnForecast => "EarnForecastRevision",
            Self::DividendForecast => "DividendForecastRevision",
        }
    }

    /// Revision kind of a document whose type is exactly a revision type name.
    pub fn from_docname(docname: &str) -> Option<Self> {
        match docname {
            "EarnForecastRevision" => Some(Self::EarnForecast),
            "DividendForecastRevision" => Some(Self::DividendForecast),
            _ => None,
        }
    }

    /// Revision kind of a provider document type that mentions a revision type.
    pub fn detect(type_of_document: &str) -> Option<Self> {
        if type_of_document.contains(Self::EarnForecast.as_str()) {
            Some(Self::EarnForecast)
        } else if type_of_document.contains(Self::DividendForecast.as_str()) {
            Some(Self::DividendForecast)
        } else {
            None
        }
    }

    /// Current-year forecast fields a revision of this kind may overwrite.
    pub const fn revised_fields(&self) -> &'static [ForecastField] {
        match self {
            Self::EarnForecast => &[
                ForecastField::NetSales,
                ForecastField::OperatingProfit,
                ForecastField::OrdinaryProfit,
                ForecastField::Profit,
                ForecastField::DividendAnnual,
            ],
            Self::DividendForecast => &[ForecastField::DividendAnnual],
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current-fiscal-year forecast fields of a disclosure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForecastField {
    /// Forecast net sales
    NetSales,
    /// Forecast operating profit
    OperatingProfit,
    /// Forecast ordinary profit
    OrdinaryProfit,
    /// Forecast profit
    Profit,
    /// Forecast annual dividend per share
    DividendAnnual,
}

impl ForecastField {
    /// Column name of the field.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::NetSales => "fcastnetsales",
            Self::OperatingProfit => "fcastopprofit",
            Self::OrdinaryProfit => "fcastordprofit",
            Self::Profit => "fcastprofit",
            Self::DividendAnnual => "fcastdivannual",
        }
    }
}

/// One filed statement for one company at one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisclosureRecord {
    /// When the record was produced
    pub timestamp: DateTime<Utc>,
    /// Filing (disclosure) date
    #[serde(rename = "filingdate")]
    pub filing_date: Option<NaiveDate>,
    /// Document type
    pub docname: String,
    /// Company identifier
    pub seccode: String,
    /// Company name
    #[serde(rename = "companyname")]
    pub company_name: String,
    /// Current fiscal-year-end date
    #[serde(rename = "fiscalyearend")]
    pub fiscal_year_end: Option<NaiveDate>,
    /// Period label
    pub quarter: Quarter,
    /// Current period-end date
    #[serde(rename = "quarterenddate")]
    pub period_end: Option<NaiveDate>,

    /// Total assets
    #[serde(rename = "totassets")]
    pub total_assets: Option<f64>,
    /// Equity
    pub equity: Option<f64>,
    /// Net sales
    #[serde(rename = "netsales")]
    pub net_sales: Option<f64>,
    /// Operating profit
    #[serde(rename = "opprofit")]
    pub operating_profit: Option<f64>,
    /// Ordinary profit
    #[serde(rename = "ordprofit")]
    pub ordinary_profit: Option<f64>,
    /// Profit
    pub profit: Option<f64>,
    /// Earnings per share
    #[serde(rename = "earningspershare")]
    pub earnings_per_share: Option<f64>,
    /// Annual dividend per share (result)
    #[serde(rename = "divannual")]
    pub dividend_annual: Option<f64>,

    /// Current-year forecast net sales
    #[serde(rename = "fcastnetsales")]
    pub forecast_net_sales: Option<f64>,
    /// Current-year forecast operating profit
    #[serde(rename = "fcastopprofit")]
    pub forecast_operating_profit: Option<f64>,
    /// Current-year forecast ordinary profit
    #[serde(rename = "fcastordprofit")]
    pub forecast_ordinary_profit: Option<f64>,
    /// Current-year forecast profit
    #[serde(rename = "fcastprofit")]
    pub forecast_profit: Option<f64>,
    /// Current-year forecast annual dividend per share
    #[serde(rename = "fcastdivannual")]
    pub forecast_dividend_annual: Option<f64>,

    /// Next-year forecast net sales
    #[serde(rename = "nextyrfcastnetsales")]
    pub next_year_forecast_net_sales: Option<f64>,
    /// Next-year forecast operating profit
    #[serde(rename = "nextyrfcastopprofit")]
    pub next_year_forecast_operating_profit: Option<f64>,
    /// Next-year forecast ordinary profit
    #[serde(rename = "nextyrfcastordprofit")]
    pub next_year_forecast_ordinary_profit: Option<f64>,
    /// Next-year forecast profit
    #[serde(rename = "nextyrfcastprofit")]
    pub next_year_forecast_profit: Option<f64>,
    /// Next-year forecast annual dividend per share
    #[serde(rename = "nextyrfcastdivannual")]
    pub next_year_forecast_dividend_annual: Option<f64>,

    /// Issued shares at fiscal-year end, including treasury stock
    #[serde(rename = "issuedsharesincltreasury")]
    pub issued_shares: Option<f64>,
    /// Treasury shares at fiscal-year end
    #[serde(rename = "treasuryshares")]
    pub treasury_shares: Option<f64>,
    /// Revision tag derived from the provider document type
    #[serde(rename = "revisions")]
    pub revision: Option<Revision>,
}

impl DisclosureRecord {
    /// Create a record with identity fields set and every figure null.
    pub fn new(
        seccode: impl Into<String>,
        docname: impl Into<String>,
        quarter: Quarter,
    ) -> Self {
        Self {
            timestamp: DateTime::<Utc>::default(),
            filing_date: None,
            docname: docname.into(),
            seccode: seccode.into(),
            company_name: String::new(),
            fiscal_year_end: None,
            quarter,
            period_end: None,
            total_assets: None,
            equity: None,
            net_sales: None,
            operating_profit: None,
            ordinary_profit: None,
            profit: None,
            earnings_per_share: None,
            dividend_annual: None,
            forecast_net_sales: None,
            forecast_operating_profit: None,
            forecast_ordinary_profit: None,
            forecast_profit: None,
            forecast_dividend_annual: None,
            next_year_forecast_net_sales: None,
            next_year_forecast_operating_profit: None,
            next_year_forecast_ordinary_profit: None,
            next_year_forecast_profit: None,
            next_year_forecast_dividend_annual: None,
            issued_shares: None,
            treasury_shares: None,
            revision: None,
        }
    }

    /// Revision kind when the document type is exactly a revision type.
    pub fn revision_kind(&self) -> Option<Revision> {
        Revision::from_docname(&self.docname)
    }

    /// Whether the document is a forecast revision rather than a substantive statement.
    pub fn is_revision(&self) -> bool {
        self.revision_kind().is_some()
    }

    /// Calendar year of the fiscal-year-end date.
    pub fn fiscal_year(&self) -> Option<i32> {
        self.fiscal_year_end.map(|d| d.year())
    }

    /// Value of a current-year forecast field.
    pub const fn forecast(&self, field: ForecastField) -> Option<f64> {
        match field {
            ForecastField::NetSales => self.forecast_net_sales,
            ForecastField::OperatingProfit => self.forecast_operating_profit,
            ForecastField::OrdinaryProfit => self.forecast_ordinary_profit,
            ForecastField::Profit => self.forecast_profit,
            ForecastField::DividendAnnual => self.forecast_dividend_annual,
        }
    }

    /// Overwrite a current-year forecast field.
    pub const fn set_forecast(&mut self, field: ForecastField, value: Option<f64>) {
        match field {
            ForecastField::NetSales => self.forecast_net_sales = value,
            ForecastField::OperatingProfit => self.forecast_operating_profit = value,
            ForecastField::OrdinaryProfit => self.forecast_ordinary_profit = value,
            ForecastField::Profit => self.forecast_profit = value,
            ForecastField::DividendAnnual => self.forecast_dividend_annual = value,
        }
    }
}

/// Marker set on a record whose forecast was overwritten by a later revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevisionMark {
    /// The forecast fields were updated
    Updated,
}

impl RevisionMark {
    /// Marker text as stored in the datasets.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Updated => "Updated",
        }
    }
}

/// A disclosure after revision reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRecord {
    /// The disclosure, possibly with forecast fields and filing date rewritten
    #[serde(flatten)]
    pub disclosure: DisclosureRecord,
    /// Set when an earnings forecast revision overwrote this record
    pub earn_flag: Option<RevisionMark>,
    /// Set when a dividend forecast revision overwrote this record
    pub div_flag: Option<RevisionMark>,
}

impl ReconciledRecord {
    /// Wrap a disclosure with no flags set.
    pub const fn unflagged(disclosure: DisclosureRecord) -> Self {
        Self {
            disclosure,
            earn_flag: None,
            div_flag: None,
        }
    }
}
