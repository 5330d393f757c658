//! Stockcast CLI: the dashboard pipeline without the terminal UI.
//!
//! Commands:
//! - `forecast`: fetch a ticker, fit the additive model, print the horizon
//! - `history`: print the most recent price rows
//! - `tickers`: list the selectable tickers

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockcast_core::data::{frame, DataLoader, PriceRecord, YahooProvider};
use stockcast_core::forecast::{Forecast, ForecastRow};
use stockcast_core::inputs::{HorizonMonths, LookbackYears, Selection};
use stockcast_core::{run_forecast, DashboardConfig};

#[derive(Parser)]
#[command(name = "stockcast", about = "Stockcast: daily closes and additive-model forecasts")]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of tables.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a ticker, fit the model and print the forecast horizon.
    Forecast {
        /// Ticker symbol (must be in the configured set).
        #[arg(long)]
        ticker: String,

        /// Lookback in years (1-5). Defaults to the configured value.
        #[arg(long)]
        years: Option<u32>,

        /// Horizon in months (1-12). Defaults to the configured value.
        #[arg(long)]
        months: Option<u32>,

        /// Print every history and forecast row as a table.
        #[arg(long, default_value_t = false)]
        all_rows: bool,
    },
    /// Print the most recent price rows for a ticker.
    History {
        #[arg(long)]
        ticker: String,

        /// Number of rows. Defaults to the configured tail size.
        #[arg(long)]
        rows: Option<usize>,
    },
    /// List the selectable tickers.
    Tickers,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::load_or_default(cli.config.as_deref())
        .context("loading configuration")?;

    match cli.command {
        Commands::Forecast {
            ticker,
            years,
            months,
            all_rows,
        } => run_forecast_cmd(&config, &ticker, years, months, all_rows, cli.json),
        Commands::History { ticker, rows } => run_history(&config, &ticker, rows, cli.json),
        Commands::Tickers => run_tickers(&config, cli.json),
    }
}

fn loader(config: &DashboardConfig) -> Result<DataLoader<YahooProvider>> {
    let provider = YahooProvider::new(config.auto_adjust)?;
    Ok(DataLoader::new(
        provider,
        config.tickers.clone(),
        config.history_start,
    ))
}

fn run_forecast_cmd(
    config: &DashboardConfig,
    ticker: &str,
    years: Option<u32>,
    months: Option<u32>,
    all_rows: bool,
    json: bool,
) -> Result<()> {
    let lookback = match years {
        Some(y) => LookbackYears::new(y)?,
        None => config.defaults.lookback_years,
    };
    let horizon = match months {
        Some(m) => HorizonMonths::new(m)?,
        None => config.defaults.horizon_months,
    };
    let selection = Selection::new(&config.tickers, ticker, lookback, horizon)?;

    let mut loader = loader(config)?;
    let prices = loader.load(&selection.ticker)?;
    info!(ticker = %selection.ticker, rows = prices.height(), "loaded prices");
    let run = run_forecast(&prices, selection.horizon, &config.model)?;
    info!(
        ticker = %selection.ticker,
        training_rows = run.training.len(),
        future_rows = run.forecast.future_rows().count(),
        "forecast ready"
    );

    if json {
        let report = json!({
            "ticker": selection.ticker,
            "lookback_years": selection.lookback.get(),
            "horizon_months": selection.horizon.get(),
            "history_start": loader.history_start(),
            "training_rows": run.training.len(),
            "forecast": run.forecast,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_forecast(&selection, run.training.len(), &run.forecast);
    if all_rows {
        println!("{}", run.forecast.to_frame()?);
    }
    Ok(())
}

fn run_history(
    config: &DashboardConfig,
    ticker: &str,
    rows: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut loader = loader(config)?;
    let prices = loader.load(ticker)?;
    info!(ticker, rows = prices.height(), "loaded prices");
    let tail = frame::records(&frame::tail(&prices, rows.unwrap_or(config.tail_rows)))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tail)?);
    } else {
        print_records(&tail);
    }
    Ok(())
}

fn run_tickers(config: &DashboardConfig, json: bool) -> Result<()> {
    let symbols = config.tickers.symbols();
    if json {
        println!("{}", serde_json::to_string_pretty(symbols)?);
    } else {
        for sym in symbols {
            println!("{sym}");
        }
    }
    Ok(())
}

fn print_records(records: &[PriceRecord]) {
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>14}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    println!("{}", "-".repeat(71));
    for r in records {
        println!(
            "{:<12} {:>10} {:>10} {:>10} {:>10} {:>14}",
            r.date.to_string(),
            fmt_price(r.open),
            fmt_price(r.high),
            fmt_price(r.low),
            fmt_price(r.close),
            r.volume
        );
    }
}

fn fmt_price(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
}

fn print_forecast(selection: &Selection, training_rows: usize, forecast: &Forecast) {
    println!();
    println!("=== Forecast: {} ===", selection.ticker);
    println!(
        "Lookback:       {} years (~{} days)",
        selection.lookback.get(),
        selection.lookback.days()
    );
    println!(
        "Horizon:        {} months ({} days)",
        selection.horizon.get(),
        selection.horizon.days()
    );
    println!("Training rows:  {training_rows}");
    println!("Last observed:  {}", forecast.last_observed);
    println!(
        "Interval:       {:.0}%",
        forecast.interval_width * 100.0
    );
    println!();
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>10}",
        "ds", "yhat", "lower", "upper", "trend"
    );
    println!("{}", "-".repeat(56));
    for row in monthly(forecast) {
        println!(
            "{:<12} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            row.ds.to_string(),
            row.yhat,
            row.yhat_lower,
            row.yhat_upper,
            row.trend
        );
    }
    if forecast.weekly_profile().is_none() || forecast.yearly_profile().is_none() {
        println!();
        println!("NOTE: some seasonal terms were not fitted (history too short)");
    }
    println!();
}

/// Every 30th future row plus the last one.
fn monthly(forecast: &Forecast) -> Vec<&ForecastRow> {
    let future: Vec<&ForecastRow> = forecast.future_rows().collect();
    let mut picked: Vec<&ForecastRow> = future
        .iter()
        .copied()
        .skip(HorizonMonths::DAYS_PER_MONTH as usize - 1)
        .step_by(HorizonMonths::DAYS_PER_MONTH as usize)
        .collect();
    if let Some(last) = future.last() {
        if picked.last().map(|r| r.ds) != Some(last.ds) {
            picked.push(*last);
        }
    }
    picked
}
