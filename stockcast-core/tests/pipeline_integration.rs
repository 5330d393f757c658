//! End-to-end: provider -> memoized loader -> training frame -> forecast.

mod common;

use chrono::Duration;
use common::{day, SyntheticProvider};
use stockcast_core::data::{default_history_start, frame, DataLoader};
use stockcast_core::forecast::{training_frame, ModelSettings};
use stockcast_core::inputs::{HorizonMonths, LookbackYears, Selection, TickerSet};
use stockcast_core::run_forecast;

#[test]
fn aapl_with_two_year_lookback_requests_fixed_start() {
    let provider = SyntheticProvider::default();
    let tickers = TickerSet::default();
    let mut loader = DataLoader::new(&provider, tickers.clone(), default_history_start());

    let selection = Selection::new(
        &tickers,
        "AAPL",
        LookbackYears::new(2).unwrap(),
        HorizonMonths::default(),
    )
    .unwrap();
    let today = day(2024, 6, 3);
    loader.load_until(&selection.ticker, today).unwrap();

    let requests = provider.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "AAPL");
    assert_eq!(requests[0].1, day(2020, 1, 1));
    assert_eq!(requests[0].2, today);
}

#[test]
fn six_month_forecast_extends_180_days_past_last_trading_day() {
    let provider = SyntheticProvider::default();
    let mut loader = DataLoader::new(&provider, TickerSet::default(), default_history_start());

    // 2024-06-03 is a Monday, so the last trading day served is Friday 2024-05-31
    let prices = loader.load_until("MSFT", day(2024, 6, 3)).unwrap();
    let run = run_forecast(&prices, HorizonMonths::new(6).unwrap(), &ModelSettings::default())
        .unwrap();

    let last_observed = day(2024, 5, 31);
    assert_eq!(run.forecast.last_observed, last_observed);
    assert_eq!(run.scaffold.future().len(), 180);
    assert_eq!(run.forecast.future_rows().count(), 180);
    assert_eq!(
        run.forecast.last_row().unwrap().ds,
        last_observed + Duration::days(180)
    );
    assert_eq!(run.forecast.len(), run.training.len() + 180);

    for row in &run.forecast.rows {
        assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
    }
    assert!(run.forecast.components.yearly.is_some());
    assert!(run.forecast.components.weekly.is_some());
}

#[test]
fn forecast_tracks_the_observed_level() {
    let provider = SyntheticProvider::default();
    let mut loader = DataLoader::new(&provider, TickerSet::default(), default_history_start());
    let prices = loader.load_until("NVDA", day(2024, 6, 3)).unwrap();
    let run = run_forecast(&prices, HorizonMonths::new(1).unwrap(), &ModelSettings::default())
        .unwrap();

    let observed = frame::close_series(&prices).unwrap();
    let (_, last_close) = *observed.last().unwrap();
    let fitted_last = run
        .forecast
        .history_rows()
        .last()
        .map(|r| r.yhat)
        .unwrap();
    assert!(
        (fitted_last - last_close).abs() / last_close < 0.05,
        "fitted {fitted_last} vs observed {last_close}"
    );
}

#[test]
fn reruns_reuse_the_memoized_frame() {
    let provider = SyntheticProvider::default();
    let mut loader = DataLoader::new(&provider, TickerSet::default(), default_history_start());

    for months in [1, 6, 12] {
        let prices = loader.load_until("TSLA", day(2022, 3, 1)).unwrap();
        run_forecast(&prices, HorizonMonths::new(months).unwrap(), &ModelSettings::default())
            .unwrap();
    }
    assert_eq!(provider.requests.borrow().len(), 1);
}

#[test]
fn loaded_frame_is_flat_and_tail_ends_at_last_day() {
    let provider = SyntheticProvider::default();
    let mut loader = DataLoader::new(&provider, TickerSet::default(), default_history_start());
    let prices = loader.load_until("AMZN", day(2024, 6, 3)).unwrap();

    let names: Vec<String> = prices
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["Date", "Open", "High", "Low", "Close", "Volume"]);

    let tail = frame::records(&frame::tail(&prices, 5)).unwrap();
    assert_eq!(tail.len(), 5);
    assert_eq!(tail.last().unwrap().date, day(2024, 5, 31));

    let train = training_frame(&prices).unwrap();
    assert_eq!(train.height(), prices.height());
}
