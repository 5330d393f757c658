//! Price frames: polars layout for fetched records and header normalization.
//!
//! A freshly fetched frame carries a two-level header on its value columns,
//! `<Price>|<Ticker>` (e.g. `Close|AAPL`), the way multi-ticker downloads are
//! laid out. Normalization flattens that header to its first level, sorts rows
//! by date and drops duplicate dates, leaving one row per trading day.

use super::provider::{DataError, FetchResult, PriceRecord};
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use std::collections::HashSet;

/// Separator between header levels in a multi-level column name.
pub const LEVEL_SEPARATOR: char = '|';

pub const DATE: &str = "Date";
pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const VOLUME: &str = "Volume";

/// Join header levels into a single column name.
pub fn multi_level_name(levels: &[&str]) -> String {
    let mut sep = [0u8; 4];
    levels.join(LEVEL_SEPARATOR.encode_utf8(&mut sep))
}

/// First header level of a column name. Single-level names are returned whole.
pub fn first_level(name: &str) -> &str {
    name.split(LEVEL_SEPARATOR).next().unwrap_or(name)
}

/// Days since 1970-01-01, the physical representation of polars `Date`.
fn epoch_days(date: NaiveDate) -> i32 {
    date.signed_duration_since(NaiveDate::default()).num_days() as i32
}

fn from_epoch_days(days: i32) -> NaiveDate {
    NaiveDate::default() + Duration::days(days as i64)
}

/// Build the raw frame for a fetch: `Date` plus one `<Price>|<Ticker>` column per field.
pub fn raw_frame(fetch: &FetchResult) -> Result<DataFrame, DataError> {
    let records = &fetch.records;
    let sym = fetch.symbol.as_str();

    let dates: Vec<i32> = records.iter().map(|r| epoch_days(r.date)).collect();
    let opens: Vec<Option<f64>> = records.iter().map(|r| r.open).collect();
    let highs: Vec<Option<f64>> = records.iter().map(|r| r.high).collect();
    let lows: Vec<Option<f64>> = records.iter().map(|r| r.low).collect();
    let closes: Vec<Option<f64>> = records.iter().map(|r| r.close).collect();
    let volumes: Vec<u64> = records.iter().map(|r| r.volume).collect();

    let df = DataFrame::new(vec![
        Column::new(DATE.into(), dates).cast(&DataType::Date)?,
        Column::new(multi_level_name(&[OPEN, sym]).into(), opens),
        Column::new(multi_level_name(&[HIGH, sym]).into(), highs),
        Column::new(multi_level_name(&[LOW, sym]).into(), lows),
        Column::new(multi_level_name(&[CLOSE, sym]).into(), closes),
        Column::new(multi_level_name(&[VOLUME, sym]).into(), volumes),
    ])?;
    Ok(df)
}

/// Replace every column name by its first header level.
///
/// Fails if two columns collapse onto the same name.
pub fn flatten_columns(df: DataFrame) -> Result<DataFrame, DataError> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();

    if !names.iter().any(|n| n.contains(LEVEL_SEPARATOR)) {
        return Ok(df);
    }

    let mut seen = HashSet::new();
    for name in &names {
        let flat = first_level(name);
        if !seen.insert(flat) {
            return Err(DataError::DuplicateColumn {
                name: flat.to_string(),
            });
        }
    }

    let exprs: Vec<Expr> = names
        .iter()
        .map(|n| col(n.as_str()).alias(first_level(n)))
        .collect();

    Ok(df.lazy().select(exprs).collect()?)
}

/// Flatten the header, sort by date and keep the first row per date.
pub fn normalize(df: DataFrame) -> Result<DataFrame, DataError> {
    let df = flatten_columns(df)?;
    if df.column(DATE).is_err() {
        return Err(DataError::MissingColumn(DATE.to_string()));
    }

    let df = df
        .lazy()
        .sort([DATE], SortMultipleOptions::default().with_maintain_order(true))
        .unique_stable(Some(vec![DATE.into()]), UniqueKeepStrategy::First)
        .collect()?;
    Ok(df)
}

/// Last `n` rows.
pub fn tail(df: &DataFrame, n: usize) -> DataFrame {
    df.tail(Some(n))
}

/// Read a `Date` column as calendar dates.
pub fn date_values(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>, DataError> {
    let column = df
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;
    let days = column.cast(&DataType::Int32)?;
    Ok(days.i32()?.into_iter().map(|d| d.map(from_epoch_days)).collect())
}

/// Read an integer column as `u64`.
pub fn u64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<u64>>, DataError> {
    let column = df
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;
    let values = column.cast(&DataType::UInt64)?;
    Ok(values.u64()?.into_iter().collect())
}

/// Read a numeric column as `f64`.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, DataError> {
    let column = df
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;
    let values = column.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

/// `(date, close)` pairs for charting, skipping rows without a close.
pub fn close_series(df: &DataFrame) -> Result<Vec<(NaiveDate, f64)>, DataError> {
    let dates = date_values(df, DATE)?;
    let closes = f64_values(df, CLOSE)?;
    Ok(dates
        .into_iter()
        .zip(closes)
        .filter_map(|(d, c)| Some((d?, c?)))
        .collect())
}

/// Convert a normalized frame back into records (used for table rendering).
pub fn records(df: &DataFrame) -> Result<Vec<PriceRecord>, DataError> {
    let dates = date_values(df, DATE)?;
    let opens = f64_values(df, OPEN)?;
    let highs = f64_values(df, HIGH)?;
    let lows = f64_values(df, LOW)?;
    let closes = f64_values(df, CLOSE)?;
    let volumes = u64_values(df, VOLUME)?;

    let mut out = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let Some(date) = dates[i] else { continue };
        out.push(PriceRecord {
            date,
            open: opens[i],
            high: highs[i],
            low: lows[i],
            close: closes[i],
            volume: volumes[i].unwrap_or(0),
        });
    }
    Ok(out)
}
