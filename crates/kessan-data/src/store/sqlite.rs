//! SQLite result store.
//!
//! Each dataset lives in its own table and is replaced wholesale on every
//! write. Columns follow [`TabularRecord::COLUMNS`]; dates are stored as
//! `YYYY-MM-DD` text and timestamps as RFC 3339 text.

use crate::error::{DataError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use kessan_core::{
    Column, ColumnKind, DisclosureRecord, PipelineOutput, Quarter, Revision, TabularRecord, Value,
};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Row, Transaction, params, params_from_iter};
use std::path::Path;
use tracing::{debug, info};

/// Prefix of the table names when none is configured.
pub const DEFAULT_TABLE_PREFIX: &str = "fins_all";

/// Names of the four dataset tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Raw disclosures
    pub raw: String,
    /// Reconciled disclosures
    pub reconciled: String,
    /// Valuations with operation-value growth
    pub valuation: String,
    /// Net-sales growth
    pub sales_growth: String,
}

impl TableNames {
    /// Derive the table names from a prefix of ASCII letters, digits and `_`.
    pub fn from_prefix(prefix: &str) -> Result<Self> {
        let valid = !prefix.is_empty()
            && !prefix.starts_with(|c: char| c.is_ascii_digit())
            && prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(DataError::InvalidTablePrefix(prefix.to_string()));
        }

        Ok(Self {
            raw: prefix.to_string(),
            reconciled: format!("{prefix}_adjusted"),
            valuation: format!("{prefix}_bps_opvalues"),
            sales_growth: format!("{prefix}_netsales"),
        })
    }

    /// All table names, raw table first.
    pub fn all(&self) -> [&str; 4] {
        [
            &self.raw,
            &self.reconciled,
            &self.valuation,
            &self.sales_growth,
        ]
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            raw: DEFAULT_TABLE_PREFIX.to_string(),
            reconciled: format!("{DEFAULT_TABLE_PREFIX}_adjusted"),
            valuation: format!("{DEFAULT_TABLE_PREFIX}_bps_opvalues"),
            sales_growth: format!("{DEFAULT_TABLE_PREFIX}_netsales"),
        }
    }
}

/// Row counts of the dataset tables; a missing table counts as empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Raw disclosures
    pub raw: usize,
    /// Reconciled disclosures
    pub reconciled: usize,
    /// Valuations
    pub valuation: usize,
    /// Net-sales growth rows
    pub sales_growth: usize,
}

/// SQLite store for the raw and derived datasets.
#[derive(Debug)]
pub struct ResultStore {
    conn: Connection,
    tables: TableNames,
}

impl ResultStore {
    /// Open (or create) a store.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    /// * `prefix` - Table name prefix, see [`TableNames::from_prefix`]
    pub fn new<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self> {
        let tables = TableNames::from_prefix(prefix)?;
        let conn = Connection::open(path)?;
        Ok(Self { conn, tables })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory(prefix: &str) -> Result<Self> {
        let tables = TableNames::from_prefix(prefix)?;
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, tables })
    }

    /// Table names in use.
    pub const fn tables(&self) -> &TableNames {
        &self.tables
    }

    /// Whether a table exists.
    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Replace `table` with `rows` in one transaction.
    pub fn replace_table<T: TabularRecord>(&self, table: &str, rows: &[T]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let written = write_table(&tx, table, rows)?;
        tx.commit()?;
        Ok(written)
    }

    /// Replace the raw disclosures table.
    pub fn replace_raw(&self, records: &[DisclosureRecord]) -> Result<usize> {
        let written = self.replace_table(&self.tables.raw, records)?;
        info!(table = %self.tables.raw, rows = written, "stored raw disclosures");
        Ok(written)
    }

    /// Replace the three derived tables together; on failure none of them changes.
    pub fn replace_derived(&self, output: &PipelineOutput) -> Result<StoreStats> {
        let tx = self.conn.unchecked_transaction()?;
        let stats = StoreStats {
            raw: 0,
            reconciled: write_table(&tx, &self.tables.reconciled, &output.reconciled)?,
            valuation: write_table(&tx, &self.tables.valuation, &output.opvalue_growth)?,
            sales_growth: write_table(&tx, &self.tables.sales_growth, &output.sales_growth)?,
        };
        tx.commit()?;

        info!(
            reconciled = stats.reconciled,
            valuation = stats.valuation,
            sales_growth = stats.sales_growth,
            "stored derived datasets"
        );
        Ok(stats)
    }

    /// Load the raw disclosures table.
    pub fn load_disclosures(&self) -> Result<Vec<DisclosureRecord>> {
        let table = &self.tables.raw;
        if !self.table_exists(table)? {
            return Err(DataError::MissingTable(table.clone()));
        }

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM \"{table}\"",
            quoted_names(DisclosureRecord::COLUMNS)
        ))?;
        let records = stmt
            .query_map([], disclosure_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        info!(table = %table, rows = records.len(), "loaded raw disclosures");
        Ok(records)
    }

    /// Row counts of the four tables.
    pub fn table_counts(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            raw: self.count_rows(&self.tables.raw)?,
            reconciled: self.count_rows(&self.tables.reconciled)?,
            valuation: self.count_rows(&self.tables.valuation)?,
            sales_growth: self.count_rows(&self.tables.sales_growth)?,
        })
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        if !self.table_exists(table)? {
            return Ok(0);
        }
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }
}

/// Drop and recreate `table` inside `tx`, then insert `rows`.
fn write_table<T: TabularRecord>(
    tx: &Transaction<'_>,
    table: &str,
    rows: &[T],
) -> Result<usize> {
    let columns = T::COLUMNS;
    tx.execute(&format!("DROP TABLE IF EXISTS \"{table}\""), [])?;
    tx.execute(&create_table_sql(table, columns), [])?;

    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut stmt = tx.prepare(&format!(
        "INSERT INTO \"{table}\" ({}) VALUES ({placeholders})",
        quoted_names(columns)
    ))?;
    for row in rows {
        stmt.execute(params_from_iter(row.values().iter().map(to_sql)))?;
    }

    debug!(table, rows = rows.len(), "replaced table");
    Ok(rows.len())
}

const fn sql_type(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Real => "REAL",
        ColumnKind::Timestamp | ColumnKind::Date | ColumnKind::Text => "TEXT",
    }
}

fn quoted_names(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| format!("\"{}\"", c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn create_table_sql(table: &str, columns: &[Column]) -> String {
    let definitions = columns
        .iter()
        .map(|c| format!("\"{}\" {}", c.name, sql_type(c.kind)))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE \"{table}\" ({definitions})")
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Real(v) => SqlValue::Real(*v),
        Value::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
        Value::Timestamp(t) => SqlValue::Text(t.to_rfc3339()),
    }
}

fn conversion_error<E>(err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::ToSqlConversionFailure(Box::new(err))
}

fn date_column(row: &Row<'_>, name: &str) -> rusqlite::Result<Option<NaiveDate>> {
    row.get::<_, Option<String>>(name)?
        .filter(|s| !s.is_empty())
        .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(conversion_error))
        .transpose()
}

fn text_column(row: &Row<'_>, name: &str) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(name)?.unwrap_or_default())
}

fn real_column(row: &Row<'_>, name: &str) -> rusqlite::Result<Option<f64>> {
    row.get(name)
}

fn disclosure_from_row(row: &Row<'_>) -> rusqlite::Result<DisclosureRecord> {
    let timestamp = DateTime::parse_from_rfc3339(&row.get::<_, String>("timestamp")?)
        .map_err(conversion_error)?
        .with_timezone(&Utc);

    let mut record = DisclosureRecord::new(
        text_column(row, "seccode")?,
        text_column(row, "docname")?,
        Quarter::parse(&text_column(row, "quarter")?),
    );
    record.timestamp = timestamp;
    record.filing_date = date_column(row, "filingdate")?;
    record.company_name = text_column(row, "companyname")?;
    record.fiscal_year_end = date_column(row, "fiscalyearend")?;
    record.period_end = date_column(row, "quarterenddate")?;

    record.total_assets = real_column(row, "totassets")?;
    record.equity = real_column(row, "equity")?;
    record.net_sales = real_column(row, "netsales")?;
    record.operating_profit = real_column(row, "opprofit")?;
    record.ordinary_profit = real_column(row, "ordprofit")?;
    record.profit = real_column(row, "profit")?;
    record.earnings_per_share = real_column(row, "earningspershare")?;
    record.dividend_annual = real_column(row, "divannual")?;

    record.forecast_net_sales = real_column(row, "fcastnetsales")?;
    record.forecast_operating_profit = real_column(row, "fcastopprofit")?;
    record.forecast_ordinary_profit = real_column(row, "fcastordprofit")?;
    record.forecast_profit = real_column(row, "fcastprofit")?;
    record.forecast_dividend_annual = real_column(row, "fcastdivannual")?;

    record.next_year_forecast_net_sales = real_column(row, "nextyrfcastnetsales")?;
    record.next_year_forecast_operating_profit = real_column(row, "nextyrfcastopprofit")?;
    record.next_year_forecast_ordinary_profit = real_column(row, "nextyrfcastordprofit")?;
    record.next_year_forecast_profit = real_column(row, "nextyrfcastprofit")?;
    record.next_year_forecast_dividend_annual = real_column(row, "nextyrfcastdivannual")?;

    record.issued_shares = real_column(row, "issuedsharesincltreasury")?;
    record.treasury_shares = real_column(row, "treasuryshares")?;
    record.revision = row
        .get::<_, Option<String>>("revisions")?
        .as_deref()
        .and_then(Revision::detect);
    Ok(record)
}
