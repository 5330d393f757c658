//! App state persistence: JSON save/load across restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use stockcast_core::inputs::{HorizonMonths, LookbackYears};

use crate::app::{AppState, View};

/// Serializable subset of app state that persists across restarts.
/// Absent fields fall back to the configured defaults.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub ticker: Option<String>,
    pub lookback_years: Option<LookbackYears>,
    pub horizon_months: Option<HorizonMonths>,
    pub active_view: View,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            ticker: None,
            lookback_years: None,
            horizon_months: None,
            active_view: View::Prices,
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        ticker: Some(app.selection.ticker.clone()),
        lookback_years: Some(app.selection.lookback),
        horizon_months: Some(app.selection.horizon),
        active_view: app.view,
    }
}

/// Apply persisted state. Call `request_rerun` afterwards so the status
/// line names the restored ticker.
pub fn apply(app: &mut AppState, state: PersistedState) {
    if let Some(ticker) = &state.ticker {
        if !app.select_ticker(ticker) {
            tracing::warn!(ticker = %ticker, "saved ticker is no longer selectable");
        }
    }
    if let Some(years) = state.lookback_years {
        app.set_lookback(years);
    }
    if let Some(months) = state.horizon_months {
        app.set_horizon(months);
    }
    app.view = state.active_view;
}
