//! Conversion of dataset records into polars DataFrames.

use crate::export::ExportError;
use chrono::{NaiveDate, TimeDelta};
use kessan_core::{ColumnKind, TabularRecord, Value};
use polars::prelude::*;

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    let days = (date - epoch()).num_days();
    i32::try_from(days).unwrap_or(if days < 0 { i32::MIN } else { i32::MAX })
}

fn build_series<T: TabularRecord>(rows: &[T], name: &str, kind: ColumnKind) -> Series {
    let cells = rows.iter().map(|r| r.value(name));
    match kind {
        ColumnKind::Real => {
            let values: Vec<Option<f64>> = cells.map(|v| v.as_real()).collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Text => {
            let values: Vec<Option<String>> = cells
                .map(|v| match v {
                    Value::Text(s) => Some(s),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Date => {
            let values: Vec<Option<i32>> = cells
                .map(|v| match v {
                    Value::Date(d) => Some(days_since_epoch(d)),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Timestamp => {
            let values: Vec<Option<i64>> = cells
                .map(|v| match v {
                    Value::Timestamp(t) => Some(t.timestamp_micros()),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
    }
}

/// Build a DataFrame whose columns follow `T::COLUMNS` in name, order and type.
///
/// Dates become `Date` columns and timestamps `Datetime[μs]` columns.
pub fn to_dataframe<T: TabularRecord>(rows: &[T]) -> Result<DataFrame, ExportError> {
    let columns: Vec<Column> = T::COLUMNS
        .iter()
        .map(|c| build_series(rows, c.name, c.kind).into())
        .collect();
    let df = DataFrame::new(columns)?;

    let casts: Vec<Expr> = T::COLUMNS
        .iter()
        .filter_map(|c| match c.kind {
            ColumnKind::Date => Some(col(c.name).cast(DataType::Date)),
            ColumnKind::Timestamp => Some(
                col(c.name).cast(DataType::Datetime(TimeUnit::Microseconds, None)),
            ),
            ColumnKind::Real | ColumnKind::Text => None,
        })
        .collect();

    if casts.is_empty() {
        return Ok(df);
    }
    Ok(df.lazy().with_columns(casts).collect()?)
}

/// Date of a `Date` column cell, for reading frames back.
pub fn date_from_days(days: i32) -> NaiveDate {
    epoch() + TimeDelta::days(i64::from(days))
}
