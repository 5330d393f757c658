//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over the market-data source so the loader
//! can be driven by Yahoo Finance in production and by a scripted mock in tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One trading day of prices for a single ticker, as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: u64,
}

/// Structured error types for data operations.
///
/// Displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {symbol}")]
    HttpStatus { symbol: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no trading days for {symbol} between {start} and {end}")]
    NoTradingDays {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("'{symbol}' is not one of the selectable tickers")]
    UnknownTicker { symbol: String },

    #[error("column '{name}' appears more than once after flattening the header")]
    DuplicateColumn { name: String },

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("frame error: {0}")]
    Frame(#[from] polars::error::PolarsError),
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub records: Vec<PriceRecord>,
}

/// Trait for market-data providers.
///
/// The memo cache sits above this trait; providers don't know about it.
pub trait DataProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily price records for a symbol over `[start, end)`.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;
}

impl<T: DataProvider + ?Sized> DataProvider for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        (**self).fetch(symbol, start, end)
    }
}
