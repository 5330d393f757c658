//! Forecast output: per-date predictions plus seasonal profiles.

use chrono::{NaiveDate, Weekday};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::training::DS;
use super::ForecastError;

/// One predicted date. Column names follow the model's output schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    pub weekly: f64,
    pub yearly: f64,
}

/// Seasonal effects for the components view. `None` when the term was not fitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Effect per weekday, Monday first.
    pub weekly: Option<Vec<(Weekday, f64)>>,
    /// Effect per day over one reference year.
    pub yearly: Option<Vec<(NaiveDate, f64)>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub rows: Vec<ForecastRow>,
    /// Last date present in the training data.
    pub last_observed: NaiveDate,
    pub interval_width: f64,
    pub components: Components,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows on or before the last observation.
    pub fn history_rows(&self) -> impl Iterator<Item = &ForecastRow> {
        self.rows.iter().filter(move |r| r.ds <= self.last_observed)
    }

    /// Rows strictly after the last observation.
    pub fn future_rows(&self) -> impl Iterator<Item = &ForecastRow> {
        self.rows.iter().filter(move |r| r.ds > self.last_observed)
    }

    pub fn last_row(&self) -> Option<&ForecastRow> {
        self.rows.last()
    }

    /// Monday..Sunday weekly effect, if the weekly term was fitted.
    pub fn weekly_profile(&self) -> Option<&[(Weekday, f64)]> {
        self.components.weekly.as_deref()
    }

    /// Yearly effect over one reference year, if the yearly term was fitted.
    pub fn yearly_profile(&self) -> Option<&[(NaiveDate, f64)]> {
        self.components.yearly.as_deref()
    }

    /// Polars view with columns `ds, yhat, yhat_lower, yhat_upper, trend, weekly, yearly`.
    pub fn to_frame(&self) -> Result<DataFrame, ForecastError> {
        let epoch = NaiveDate::default();
        let days: Vec<i32> = self
            .rows
            .iter()
            .map(|r| r.ds.signed_duration_since(epoch).num_days() as i32)
            .collect();
        let pick = |f: fn(&ForecastRow) -> f64| -> Vec<f64> { self.rows.iter().map(f).collect() };

        let df = DataFrame::new(vec![
            Column::new(DS.into(), days).cast(&DataType::Date)?,
            Column::new("yhat".into(), pick(|r| r.yhat)),
            Column::new("yhat_lower".into(), pick(|r| r.yhat_lower)),
            Column::new("yhat_upper".into(), pick(|r| r.yhat_upper)),
            Column::new("trend".into(), pick(|r| r.trend)),
            Column::new("weekly".into(), pick(|r| r.weekly)),
            Column::new("yearly".into(), pick(|r| r.yearly)),
        ])?;
        Ok(df)
    }
}
