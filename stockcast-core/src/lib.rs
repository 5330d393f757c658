//! Stockcast Core: price loading, frame normalization and the forecast adapter.
//!
//! This crate contains everything the dashboard and CLI share:
//! - Selectable inputs (ticker set, lookback and horizon sliders)
//! - Yahoo Finance provider behind the `DataProvider` trait
//! - Two-level header flattening and the memoized, per-ticker loader
//! - `ds`/`y` training frame, future date scaffold, additive model
//! - TOML configuration

pub mod config;
pub mod data;
pub mod forecast;
pub mod inputs;
pub mod pipeline;

pub use config::{ConfigError, DashboardConfig};
pub use pipeline::{run_forecast, run_forecast_with, ForecastRun};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: values handed from the loader to the views can cross threads.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<data::PriceRecord>();
        require_sync::<data::PriceRecord>();
        require_send::<forecast::Forecast>();
        require_sync::<forecast::Forecast>();
        require_send::<forecast::AdditiveModel>();
        require_sync::<forecast::AdditiveModel>();
        require_send::<ForecastRun>();
        require_sync::<ForecastRun>();
        require_send::<DashboardConfig>();
        require_sync::<DashboardConfig>();
    }

    /// Architecture contract: the adapter only talks to models through `Forecaster`.
    #[test]
    fn forecaster_trait_is_object_safe() {
        fn _check(
            model: &mut dyn forecast::Forecaster,
            series: &forecast::TrainingSeries,
        ) -> Result<(), forecast::ForecastError> {
            model.fit(series)
        }
    }
}
