//! Forecast adapter: training frame, future scaffold, model seam and results.
//!
//! The model consumes a strict two-column table (`ds`, `y`). Anything that
//! cannot be shaped into that table is reported as a [`ForecastError`].

pub mod linalg;
pub mod model;
pub mod result;
pub mod scaffold;
pub mod training;

pub use model::{AdditiveModel, Forecaster, ModelSettings};
pub use result::{Components, Forecast, ForecastRow};
pub use scaffold::FutureScaffold;
pub use training::{training_frame, TrainingSeries, DS, Y};

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::DataError;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("training frame is missing column '{0}'")]
    MissingColumn(String),

    #[error("training frame has a null date at row {row}")]
    NullDate { row: usize },

    #[error("training frame contains duplicate date {0}")]
    DuplicateDate(NaiveDate),

    #[error("need at least 2 non-null rows to fit, got {rows}")]
    TooFewRows { rows: usize },

    #[error("training dates span a single day")]
    DegenerateSpan,

    #[error("model fit failed: normal equations are singular")]
    Singular,

    #[error("interval_width must be between 0 and 1 (exclusive), got {0}")]
    IntervalWidth(f64),

    #[error("model must be fitted before predicting")]
    NotFitted,

    #[error("frame error: {0}")]
    Frame(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Data(DataError),
}

impl From<DataError> for ForecastError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::MissingColumn(name) => ForecastError::MissingColumn(name),
            DataError::Frame(e) => ForecastError::Frame(e),
            other => ForecastError::Data(other),
        }
    }
}
