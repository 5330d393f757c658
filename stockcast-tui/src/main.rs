//! Stockcast TUI: ticker picker, sliders and three result views.
//!
//! Views:
//! 1. Prices: recent rows and close history
//! 2. Forecast: observed closes, prediction and uncertainty band
//! 3. Components: trend, weekly and yearly effects

mod app;
mod input;
mod persistence;
mod theme;
mod ui;

#[cfg(test)]
mod test_helpers;

use std::fs::File;
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use stockcast_core::data::{DataLoader, DataProvider, YahooProvider};
use stockcast_core::DashboardConfig;

use crate::app::AppState;

#[derive(Parser)]
#[command(name = "stockcast-tui", about = "Interactive stock forecast dashboard")]
struct Args {
    /// TOML config file (default: <config dir>/stockcast/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let app_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stockcast");

    init_logging(&app_dir)?;

    let config_path = args.config.unwrap_or_else(|| app_dir.join("config.toml"));
    let config = DashboardConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let state_path = app_dir.join("state.json");

    let provider: Box<dyn DataProvider> = Box::new(YahooProvider::new(config.auto_adjust)?);
    let loader = DataLoader::new(provider, config.tickers.clone(), config.history_start);

    let mut app = AppState::new(config, loader);
    persistence::apply(&mut app, persistence::load(&state_path));
    app.request_rerun();

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Save state before exit
    if let Err(e) = persistence::save(&state_path, &persistence::extract(&app)) {
        tracing::warn!(error = %e, "failed to save UI state");
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Log to `<app_dir>/stockcast-tui.log`; the alternate screen owns stdout/stderr.
fn init_logging(app_dir: &std::path::Path) -> Result<()> {
    std::fs::create_dir_all(app_dir)?;
    let file = File::create(app_dir.join("stockcast-tui.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render (shows "fetching…" before a pending rerun blocks).
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Execute a pending rerun, then draw its result.
        if app.needs_rerun() {
            app.rerun();
            continue;
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
