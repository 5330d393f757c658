//! Test helpers: an offline provider and ready-made app states.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{Datelike, NaiveDate, Weekday};

use stockcast_core::data::{DataError, DataLoader, DataProvider, FetchResult, PriceRecord};
use stockcast_core::DashboardConfig;

use crate::app::AppState;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

/// Weekday closes on a gentle upward drift; counts fetches.
pub struct OfflineProvider {
    pub calls: Rc<Cell<usize>>,
    pub fail: bool,
}

impl DataProvider for OfflineProvider {
    fn name(&self) -> &str {
        "offline"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(DataError::NetworkUnreachable("offline".into()));
        }
        let records = start
            .iter_days()
            .take_while(|d| *d < end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .enumerate()
            .map(|(i, date)| {
                let close = 100.0 + 0.05 * i as f64 + (i % 5) as f64 * 0.3;
                PriceRecord {
                    date,
                    open: Some(close - 0.5),
                    high: Some(close + 1.0),
                    low: Some(close - 1.0),
                    close: Some(close),
                    volume: 1_000 + i as u64,
                }
            })
            .collect();
        Ok(FetchResult {
            symbol: symbol.to_string(),
            records,
        })
    }
}

/// App over the offline provider, plus its fetch counter.
pub fn app_with(config: DashboardConfig) -> (AppState, Rc<Cell<usize>>) {
    let calls = Rc::new(Cell::new(0));
    let provider: Box<dyn DataProvider> = Box::new(OfflineProvider {
        calls: calls.clone(),
        fail: false,
    });
    let loader = DataLoader::new(provider, config.tickers.clone(), config.history_start);
    (AppState::new(config, loader), calls)
}

/// App whose every fetch fails.
pub fn failing_app() -> AppState {
    let config = DashboardConfig::default();
    let provider: Box<dyn DataProvider> = Box::new(OfflineProvider {
        calls: Rc::new(Cell::new(0)),
        fail: true,
    });
    let loader = DataLoader::new(provider, config.tickers.clone(), config.history_start);
    AppState::new(config, loader)
}

/// Flatten a rendered buffer into one string for `contains` checks.
pub fn buffer_text(buf: &ratatui::buffer::Buffer) -> String {
    buf.content().iter().map(|c| c.symbol()).collect()
}
