//! Shared fixtures: a deterministic provider serving weekday prices.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::cell::RefCell;
use stockcast_core::data::{DataError, DataProvider, FetchResult, PriceRecord};

/// Serves one record per weekday in `[start, end)` with a gently rising close.
#[derive(Default)]
pub struct SyntheticProvider {
    pub requests: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl DataProvider for &SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        self.requests
            .borrow_mut()
            .push((symbol.to_string(), start, end));

        let mut records = Vec::new();
        let mut date = start;
        let mut i: f64 = 0.0;
        while date < end {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let close = 100.0 + 0.05 * i + (i / 9.0).sin();
                records.push(PriceRecord {
                    date,
                    open: Some(close - 0.5),
                    high: Some(close + 1.0),
                    low: Some(close - 1.0),
                    close: Some(close),
                    volume: 1_000_000,
                });
                i += 1.0;
            }
            date += Duration::days(1);
        }

        if records.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            records,
        })
    }
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
