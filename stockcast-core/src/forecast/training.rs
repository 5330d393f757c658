//! Training frame: `Date`/`Close` renamed to the model's `ds`/`y` schema.

use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;
use tracing::warn;

use super::ForecastError;
use crate::data::frame::{self, CLOSE, DATE};

pub const DS: &str = "ds";
pub const Y: &str = "y";

/// Select `Date` and `Close` from a price frame and rename them to `ds` and `y`.
///
/// The result has exactly the columns `["ds", "y"]`, whatever the column order
/// of the input.
pub fn training_frame(prices: &DataFrame) -> Result<DataFrame, ForecastError> {
    for name in [DATE, CLOSE] {
        if prices.column(name).is_err() {
            return Err(ForecastError::MissingColumn(name.to_string()));
        }
    }

    let df = prices
        .clone()
        .lazy()
        .select([col(DATE).alias(DS), col(CLOSE).alias(Y)])
        .collect()?;
    Ok(df)
}

/// Dates and values ready for fitting, sorted by date.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSeries {
    pub ds: Vec<NaiveDate>,
    pub y: Vec<f64>,
}

impl TrainingSeries {
    /// Extract from a `ds`/`y` frame.
    ///
    /// Rows with a null `y` are dropped. Null or duplicate dates are errors.
    pub fn from_frame(df: &DataFrame) -> Result<Self, ForecastError> {
        let dates = frame::date_values(df, DS)?;
        let values = frame::f64_values(df, Y)?;

        let mut seen = HashSet::with_capacity(dates.len());
        let mut rows = Vec::with_capacity(dates.len());
        let mut dropped = 0usize;

        for (row, (date, value)) in dates.into_iter().zip(values).enumerate() {
            let date = date.ok_or(ForecastError::NullDate { row })?;
            if !seen.insert(date) {
                return Err(ForecastError::DuplicateDate(date));
            }
            match value {
                Some(v) if v.is_finite() => rows.push((date, v)),
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(dropped, "dropped training rows without a value");
        }

        Self::from_pairs(rows)
    }

    /// Build from `(date, value)` pairs; duplicates are rejected.
    pub fn from_pairs(mut rows: Vec<(NaiveDate, f64)>) -> Result<Self, ForecastError> {
        rows.sort_by_key(|(d, _)| *d);
        if let Some(w) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ForecastError::DuplicateDate(w[0].0));
        }
        if rows.len() < 2 {
            return Err(ForecastError::TooFewRows { rows: rows.len() });
        }
        let (ds, y) = rows.into_iter().unzip();
        Ok(Self { ds, y })
    }

    pub fn len(&self) -> usize {
        self.ds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ds.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.ds.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.ds.last().copied()
    }
}
