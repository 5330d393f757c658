//! Memoized price loading.
//!
//! The loader asks its provider for `[history_start, today)` and keeps the
//! normalized frame per ticker for the lifetime of the loader. The fetched
//! range never depends on the lookback input: the start date is fixed.

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use std::collections::HashMap;
use tracing::{debug, info};

use super::frame;
use super::provider::{DataError, DataProvider};
use crate::inputs::TickerSet;

/// Fixed default start of the history window.
pub fn default_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

/// Loads price frames through a provider and memoizes them by ticker.
pub struct DataLoader<P> {
    provider: P,
    tickers: TickerSet,
    history_start: NaiveDate,
    cache: HashMap<String, DataFrame>,
}

impl<P: DataProvider> DataLoader<P> {
    pub fn new(provider: P, tickers: TickerSet, history_start: NaiveDate) -> Self {
        Self {
            provider,
            tickers,
            history_start,
            cache: HashMap::new(),
        }
    }

    pub fn tickers(&self) -> &TickerSet {
        &self.tickers
    }

    pub fn history_start(&self) -> NaiveDate {
        self.history_start
    }

    /// Load the normalized frame for `ticker`, fetching through today's date.
    pub fn load(&mut self, ticker: &str) -> Result<DataFrame, DataError> {
        self.load_until(ticker, chrono::Local::now().date_naive())
    }

    /// Load with an explicit end date.
    ///
    /// The cache is keyed by ticker alone, so a later call with a different
    /// `today` still returns the frame fetched first.
    pub fn load_until(&mut self, ticker: &str, today: NaiveDate) -> Result<DataFrame, DataError> {
        let symbol = self
            .tickers
            .find(ticker)
            .ok_or_else(|| DataError::UnknownTicker {
                symbol: ticker.to_string(),
            })?
            .to_string();

        if let Some(df) = self.cache.get(&symbol) {
            debug!(symbol = %symbol, "price cache hit");
            return Ok(df.clone());
        }

        info!(
            symbol = %symbol,
            provider = self.provider.name(),
            start = %self.history_start,
            end = %today,
            "loading price history"
        );
        let fetched = self.provider.fetch(&symbol, self.history_start, today)?;
        let df = frame::normalize(frame::raw_frame(&fetched)?)?;

        self.cache.insert(symbol, df.clone());
        Ok(df)
    }

    /// Whether a frame for `ticker` is already memoized.
    pub fn is_cached(&self, ticker: &str) -> bool {
        self.tickers
            .find(ticker)
            .is_some_and(|s| self.cache.contains_key(s))
    }

    /// Drop every memoized frame; the next load refetches.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
