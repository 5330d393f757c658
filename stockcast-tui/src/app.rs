//! Application state: single-owner, main-thread only.
//!
//! Every input change marks a rerun; the event loop executes it synchronously
//! before the next key is read. Only the price fetch is memoized (in the loader).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use stockcast_core::data::{frame, DataLoader, DataProvider, PriceRecord};
use stockcast_core::inputs::{HorizonMonths, LookbackYears, Selection, TickerSet};
use stockcast_core::{run_forecast, DashboardConfig, ForecastRun};

pub type Loader = DataLoader<Box<dyn DataProvider>>;

/// Which result view fills the main area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum View {
    Prices,
    Forecast,
    Components,
}

impl View {
    pub fn index(self) -> usize {
        match self {
            View::Prices => 0,
            View::Forecast => 1,
            View::Components => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(View::Prices),
            1 => Some(View::Forecast),
            2 => Some(View::Components),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            View::Prices => "Prices",
            View::Forecast => "Forecast",
            View::Components => "Components",
        }
    }

    pub fn next(self) -> View {
        match self {
            View::Prices => View::Forecast,
            View::Forecast => View::Components,
            View::Components => View::Prices,
        }
    }

    pub fn prev(self) -> View {
        match self {
            View::Prices => View::Components,
            View::Forecast => View::Prices,
            View::Components => View::Forecast,
        }
    }
}

/// Focused control in the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Ticker,
    Lookback,
    Horizon,
}

impl Control {
    pub fn next(self) -> Control {
        match self {
            Control::Ticker => Control::Lookback,
            Control::Lookback => Control::Horizon,
            Control::Horizon => Control::Ticker,
        }
    }

    pub fn prev(self) -> Control {
        match self {
            Control::Ticker => Control::Horizon,
            Control::Lookback => Control::Ticker,
            Control::Horizon => Control::Lookback,
        }
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
}

/// Loading indicator for the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Fetching,
    Fetched,
}

/// What the last pass produced for the views.
#[derive(Debug, Clone)]
pub struct PassOutput {
    pub selection: Selection,
    pub tail: Vec<PriceRecord>,
    pub closes: Vec<(NaiveDate, f64)>,
    /// `None` when the prices loaded but the forecast failed.
    pub run: Option<ForecastRun>,
}

pub struct AppState {
    pub running: bool,
    pub view: View,
    pub focus: Control,
    pub overlay: Overlay,
    pub selection: Selection,
    pub config: DashboardConfig,
    pub loader: Loader,
    pub load_state: LoadState,
    pub status_message: Option<(String, StatusLevel)>,
    pub output: Option<PassOutput>,
    /// Error of the last pass; replaces the forecast views (and the prices
    /// view when nothing loaded) until a pass succeeds.
    pub fault: Option<String>,
    rerun_pending: bool,
}

impl AppState {
    /// Fresh state with the first ticker and the configured slider defaults.
    /// A first rerun is already pending.
    pub fn new(config: DashboardConfig, loader: Loader) -> Self {
        let selection = Selection {
            ticker: config.tickers.first().to_string(),
            lookback: config.defaults.lookback_years,
            horizon: config.defaults.horizon_months,
        };
        let mut app = Self {
            running: true,
            view: View::Prices,
            focus: Control::Ticker,
            overlay: Overlay::None,
            selection,
            config,
            loader,
            load_state: LoadState::Idle,
            status_message: None,
            output: None,
            fault: None,
            rerun_pending: false,
        };
        app.request_rerun();
        app
    }

    pub fn tickers(&self) -> &TickerSet {
        self.loader.tickers()
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }

    /// Mark the pipeline for re-execution before the next input is read.
    pub fn request_rerun(&mut self) {
        self.rerun_pending = true;
        if self.loader.is_cached(&self.selection.ticker) {
            self.set_status(format!("Forecasting {}…", self.selection.ticker));
        } else {
            self.load_state = LoadState::Fetching;
            self.set_status(format!("Fetching {}…", self.selection.ticker));
        }
    }

    pub fn needs_rerun(&self) -> bool {
        self.rerun_pending
    }

    /// Run the whole pipeline for the current selection, through today.
    pub fn rerun(&mut self) {
        self.rerun_until(chrono::Local::now().date_naive());
    }

    /// Run the whole pipeline with an explicit end date.
    ///
    /// A forecast failure keeps the loaded prices; only a fetch failure clears them.
    pub fn rerun_until(&mut self, today: NaiveDate) {
        self.rerun_pending = false;
        let prices = match self.loader.load_until(&self.selection.ticker, today) {
            Ok(prices) => prices,
            Err(e) => {
                self.fail(e.into(), true);
                return;
            }
        };
        let tables = frame::records(&frame::tail(&prices, self.config.tail_rows))
            .and_then(|tail| Ok((tail, frame::close_series(&prices)?)));
        let (tail, closes) = match tables {
            Ok(tables) => tables,
            Err(e) => {
                self.fail(e.into(), true);
                return;
            }
        };

        let mut output = PassOutput {
            selection: self.selection.clone(),
            tail,
            closes,
            run: None,
        };
        match run_forecast(&prices, self.selection.horizon, &self.config.model) {
            Ok(run) => {
                self.set_status(format!(
                    "{}: {} trading days, {} days forecast",
                    output.selection.ticker,
                    output.closes.len(),
                    run.scaffold.future().len()
                ));
                output.run = Some(run);
                self.fault = None;
            }
            Err(e) => self.fail(e.into(), false),
        }
        self.output = Some(output);
        self.load_state = LoadState::Fetched;
    }

    fn fail(&mut self, err: anyhow::Error, clear_output: bool) {
        tracing::error!(ticker = %self.selection.ticker, error = %err, "rerun failed");
        self.set_error(format!("Rerun failed for {}", self.selection.ticker));
        self.fault = Some(format!("{err:#}"));
        self.load_state = LoadState::Idle;
        if clear_output {
            self.output = None;
        }
    }

    /// Step the focused control forward or back; reruns when the value moved.
    pub fn step_control(&mut self, forward: bool) {
        let before = self.selection.clone();
        match self.focus {
            Control::Ticker => {
                let tickers = self.loader.tickers();
                let next = if forward {
                    tickers.next_after(&self.selection.ticker)
                } else {
                    tickers.prev_before(&self.selection.ticker)
                };
                self.selection.ticker = next.to_string();
            }
            Control::Lookback => {
                self.selection.lookback = if forward {
                    self.selection.lookback.increment()
                } else {
                    self.selection.lookback.decrement()
                };
            }
            Control::Horizon => {
                self.selection.horizon = if forward {
                    self.selection.horizon.increment()
                } else {
                    self.selection.horizon.decrement()
                };
            }
        }
        if self.selection != before {
            self.request_rerun();
        }
    }

    pub fn select_ticker(&mut self, ticker: &str) -> bool {
        match self.loader.tickers().find(ticker) {
            Some(symbol) => {
                self.selection.ticker = symbol.to_string();
                true
            }
            None => false,
        }
    }

    pub fn set_lookback(&mut self, lookback: LookbackYears) {
        self.selection.lookback = lookback;
    }

    pub fn set_horizon(&mut self, horizon: HorizonMonths) {
        self.selection.horizon = horizon;
    }

    /// Drop all memoized prices and run again.
    pub fn refresh(&mut self) {
        self.loader.clear_cache();
        self.request_rerun();
    }
}
