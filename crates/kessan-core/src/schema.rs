//! Column layout of the derived datasets.
//!
//! Downstream consumers read the persisted tables positionally, so every
//! record type declares its columns in a fixed order. Storage, export and
//! DataFrame conversion all go through [`TabularRecord`].

use crate::growth::{NetSalesGrowthRecord, OpValueGrowthRecord};
use crate::record::{DisclosureRecord, ReconciledRecord};
use crate::valuation::ValuationRecord;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// Storage kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// UTC timestamp
    Timestamp,
    /// Calendar date
    Date,
    /// UTF-8 text
    Text,
    /// 64-bit float
    Real,
}

/// A named, typed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    /// Column name
    pub name: &'static str,
    /// Storage kind
    pub kind: ColumnKind,
}

const fn ts(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Timestamp,
    }
}

const fn date(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Date,
    }
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Text,
    }
}

const fn real(name: &'static str) -> Column {
    Column {
        name,
        kind: ColumnKind::Real,
    }
}

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value
    Null,
    /// Text cell
    Text(String),
    /// Float cell
    Real(f64),
    /// Date cell
    Date(NaiveDate),
    /// Timestamp cell
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Whether the cell is missing.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The float content, if any.
    pub const fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Renders the cell the way it is written to text outputs; null is empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Text(s) => f.write_str(s),
            Self::Real(v) => write!(f, "{v}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S%.6f")),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Null, Self::Real)
    }
}

impl From<Option<NaiveDate>> for Value {
    fn from(v: Option<NaiveDate>) -> Self {
        v.map_or(Self::Null, Self::Date)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<Option<&str>> for Value {
    fn from(v: Option<&str>) -> Self {
        v.map_or(Self::Null, Self::from)
    }
}

/// A record that can be laid out as a row of a fixed column set.
pub trait TabularRecord {
    /// Columns in persisted order.
    const COLUMNS: &'static [Column];

    /// Value of the named column, or [`Value::Null`] for an unknown name.
    fn value(&self, column: &str) -> Value;

    /// Values in [`Self::COLUMNS`] order.
    fn values(&self) -> Vec<Value> {
        Self::COLUMNS.iter().map(|c| self.value(c.name)).collect()
    }
}

/// Raw disclosures as ingested.
pub const DISCLOSURE_COLUMNS: &[Column] = &[
    ts("timestamp"),
    date("filingdate"),
    text("docname"),
    text("seccode"),
    text("companyname"),
    date("fiscalyearend"),
    text("quarter"),
    date("quarterenddate"),
    real("totassets"),
    real("equity"),
    real("netsales"),
    real("opprofit"),
    real("ordprofit"),
    real("profit"),
    real("earningspershare"),
    real("divannual"),
    real("fcastnetsales"),
    real("fcastopprofit"),
    real("fcastordprofit"),
    real("fcastprofit"),
    real("fcastdivannual"),
    real("nextyrfcastnetsales"),
    real("nextyrfcastopprofit"),
    real("nextyrfcastordprofit"),
    real("nextyrfcastprofit"),
    real("nextyrfcastdivannual"),
    real("issuedsharesincltreasury"),
    real("treasuryshares"),
    text("revisions"),
];

/// Reconciled disclosures.
pub const RECONCILED_COLUMNS: &[Column] = &[
    ts("timestamp"),
    date("filingdate"),
    text("earn_flag"),
    text("div_flag"),
    text("revisions"),
    text("docname"),
    text("seccode"),
    text("companyname"),
    date("fiscalyearend"),
    text("quarter"),
    date("quarterenddate"),
    real("totassets"),
    real("equity"),
    real("netsales"),
    real("opprofit"),
    real("ordprofit"),
    real("profit"),
    real("divannual"),
    real("fcastnetsales"),
    real("fcastopprofit"),
    real("fcastordprofit"),
    real("fcastprofit"),
    real("fcastdivannual"),
    real("nextyrfcastnetsales"),
    real("nextyrfcastopprofit"),
    real("nextyrfcastordprofit"),
    real("nextyrfcastprofit"),
    real("nextyrfcastdivannual"),
    real("issuedsharesincltreasury"),
    real("treasuryshares"),
];

/// Valuations without growth figures.
pub const VALUATION_COLUMNS: &[Column] = &[
    ts("timestamp"),
    date("filingdate"),
    text("seccode"),
    text("companyname"),
    text("quarter"),
    date("quarterenddate"),
    real("bps"),
    real("bps_eval"),
    real("opvalue"),
    real("fcastopvalue"),
    real("nextyrfcastopvalue"),
    real("original_divannual_for_chart"),
    real("adjusted_divannual_for_chart"),
    real("original_fcastdivannual_for_chart"),
    real("adjusted_fcastdivannual_for_chart"),
    real("divannual"),
    real("fcastdivannual"),
    real("nextyrfcastdivannual"),
    date("fiscalyearend"),
    real("issuedsharesincltreasury"),
    real("latest_shares"),
    real("totassets"),
    real("equity"),
    real("equityratio"),
    real("assetevalrate"),
    real("roaleverage"),
    real("eps"),
    real("fcasteps"),
    real("nextyrfcasteps"),
    real("roa"),
    real("fcastroa"),
    real("nextyrfcastroa"),
    real("fairvalue"),
    real("fcastfairvalue"),
    real("nextyrfcastfairvalue"),
    text("docname"),
];

/// Valuations with operation-value growth, the persisted valuation table.
pub const OPVALUE_GROWTH_COLUMNS: &[Column] = &[
    ts("timestamp"),
    date("filingdate"),
    text("seccode"),
    text("companyname"),
    text("quarter"),
    date("quarterenddate"),
    real("bps"),
    real("bps_eval"),
    real("opvalue"),
    real("growth_amount_opvalue"),
    real("growth_percentage_opvalue"),
    real("fcastopvalue"),
    real("projected_growth_rate_opvalue"),
    real("nextyrfcastopvalue"),
    real("original_divannual_for_chart"),
    real("adjusted_divannual_for_chart"),
    real("original_fcastdivannual_for_chart"),
    real("adjusted_fcastdivannual_for_chart"),
    real("divannual"),
    real("fcastdivannual"),
    real("nextyrfcastdivannual"),
    date("fiscalyearend"),
    real("issuedsharesincltreasury"),
    real("latest_shares"),
    real("totassets"),
    real("equity"),
    real("equityratio"),
    real("assetevalrate"),
    real("roaleverage"),
    real("eps"),
    real("fcasteps"),
    real("nextyrfcasteps"),
    real("roa"),
    real("fcastroa"),
    real("nextyrfcastroa"),
    real("fairvalue"),
    real("fcastfairvalue"),
    real("nextyrfcastfairvalue"),
    text("docname"),
];

/// Net-sales growth.
pub const NETSALES_GROWTH_COLUMNS: &[Column] = &[
    ts("timestamp"),
    date("filingdate"),
    text("earn_flag"),
    text("div_flag"),
    text("docname"),
    text("seccode"),
    text("companyname"),
    date("fiscalyearend"),
    text("quarter"),
    date("quarterenddate"),
    real("netsales"),
    real("growth_amount"),
    real("growth_percentage"),
    real("projected_growth_rate"),
    real("fcastnetsales"),
    real("nextyrfcastnetsales"),
];

impl TabularRecord for DisclosureRecord {
    const COLUMNS: &'static [Column] = DISCLOSURE_COLUMNS;

    fn value(&self, column: &str) -> Value {
        match column {
            "timestamp" => self.timestamp.into(),
            "filingdate" => self.filing_date.into(),
            "docname" => self.docname.as_str().into(),
            "seccode" => self.seccode.as_str().into(),
            "companyname" => self.company_name.as_str().into(),
            "fiscalyearend" => self.fiscal_year_end.into(),
            "quarter" => self.quarter.as_str().into(),
            "quarterenddate" => self.period_end.into(),
            "totassets" => self.total_assets.into(),
            "equity" => self.equity.into(),
            "netsales" => self.net_sales.into(),
            "opprofit" => self.operating_profit.into(),
            "ordprofit" => self.ordinary_profit.into(),
            "profit" => self.profit.into(),
            "earningspershare" => self.earnings_per_share.into(),
            "divannual" => self.dividend_annual.into(),
            "fcastnetsales" => self.forecast_net_sales.into(),
            "fcastopprofit" => self.forecast_operating_profit.into(),
            "fcastordprofit" => self.forecast_ordinary_profit.into(),
            "fcastprofit" => self.forecast_profit.into(),
            "fcastdivannual" => self.forecast_dividend_annual.into(),
            "nextyrfcastnetsales" => self.next_year_forecast_net_sales.into(),
            "nextyrfcastopprofit" => self.next_year_forecast_operating_profit.into(),
            "nextyrfcastordprofit" => self.next_year_forecast_ordinary_profit.into(),
            "nextyrfcastprofit" => self.next_year_forecast_profit.into(),
            "nextyrfcastdivannual" => self.next_year_forecast_dividend_annual.into(),
            "issuedsharesincltreasury" => self.issued_shares.into(),
            "treasuryshares" => self.treasury_shares.into(),
            "revisions" => self.revision.map(|r| r.as_str()).into(),
            _ => Value::Null,
        }
    }
}

impl TabularRecord for ReconciledRecord {
    const COLUMNS: &'static [Column] = RECONCILED_COLUMNS;

    fn value(&self, column: &str) -> Value {
        match column {
            "earn_flag" => self.earn_flag.map(|m| m.as_str()).into(),
            "div_flag" => self.div_flag.map(|m| m.as_str()).into(),
            other => self.disclosure.value(other),
        }
    }
}

impl TabularRecord for ValuationRecord {
    const COLUMNS: &'static [Column] = VALUATION_COLUMNS;

    fn value(&self, column: &str) -> Value {
        match column {
            "timestamp" => self.timestamp.into(),
            "filingdate" => self.filing_date.into(),
            "seccode" => self.seccode.as_str().into(),
            "companyname" => self.company_name.as_str().into(),
            "quarter" => self.quarter.as_str().into(),
            "quarterenddate" => self.period_end.into(),
            "bps" => self.bps.into(),
            "bps_eval" => self.bps_eval.into(),
            "opvalue" => self.opvalue.into(),
            "fcastopvalue" => self.forecast_opvalue.into(),
            "nextyrfcastopvalue" => self.next_year_forecast_opvalue.into(),
            "original_divannual_for_chart" => self.original_dividend_for_chart.into(),
            "adjusted_divannual_for_chart" => self.adjusted_dividend_for_chart.into(),
            "original_fcastdivannual_for_chart" => self.original_forecast_dividend_for_chart.into(),
            "adjusted_fcastdivannual_for_chart" => self.adjusted_forecast_dividend_for_chart.into(),
            "divannual" => self.dividend_annual.into(),
            "fcastdivannual" => self.forecast_dividend_annual.into(),
            "nextyrfcastdivannual" => self.next_year_forecast_dividend_annual.into(),
            "fiscalyearend" => self.fiscal_year_end.into(),
            "issuedsharesincltreasury" => self.issued_shares.into(),
            "latest_shares" => self.latest_shares.into(),
            "totassets" => self.total_assets.into(),
            "equity" => self.equity.into(),
            "equityratio" => self.equity_ratio.into(),
            "assetevalrate" => self.asset_eval_rate.into(),
            "roaleverage" => self.roa_leverage.into(),
            "eps" => self.eps.into(),
            "fcasteps" => self.forecast_eps.into(),
            "nextyrfcasteps" => self.next_year_forecast_eps.into(),
            "roa" => self.roa.into(),
            "fcastroa" => self.forecast_roa.into(),
            "nextyrfcastroa" => self.next_year_forecast_roa.into(),
            "fairvalue" => self.fair_value.into(),
            "fcastfairvalue" => self.forecast_fair_value.into(),
            "nextyrfcastfairvalue" => self.next_year_forecast_fair_value.into(),
            "docname" => self.docname.as_str().into(),
            _ => Value::Null,
        }
    }
}

impl TabularRecord for OpValueGrowthRecord {
    const COLUMNS: &'static [Column] = OPVALUE_GROWTH_COLUMNS;

    fn value(&self, column: &str) -> Value {
        match column {
            "growth_amount_opvalue" => self.growth.growth_amount_opvalue.into(),
            "growth_percentage_opvalue" => self.growth.growth_percentage_opvalue.into(),
            "projected_growth_rate_opvalue" => self.growth.projected_growth_rate_opvalue.into(),
            other => self.valuation.value(other),
        }
    }
}

impl TabularRecord for NetSalesGrowthRecord {
    const COLUMNS: &'static [Column] = NETSALES_GROWTH_COLUMNS;

    fn value(&self, column: &str) -> Value {
        match column {
            "growth_amount" => self.growth.growth_amount.into(),
            "growth_percentage" => self.growth.growth_percentage.into(),
            "projected_growth_rate" => self.growth.projected_growth_rate.into(),
            other => self.record.value(other),
        }
    }
}
