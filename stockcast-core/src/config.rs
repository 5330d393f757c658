//! Dashboard configuration loaded from TOML.
//!
//! Every field has a default, so a missing file or a partial file is valid.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::data::default_history_start;
use crate::forecast::{ForecastError, ModelSettings};
use crate::inputs::{HorizonMonths, LookbackYears, TickerSet};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid [model] settings: {0}")]
    Model(#[from] ForecastError),
}

/// Initial slider positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputDefaults {
    pub lookback_years: LookbackYears,
    pub horizon_months: HorizonMonths,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Selectable tickers, in display order.
    pub tickers: TickerSet,
    /// Fixed first day of every history request.
    pub history_start: NaiveDate,
    /// Rows shown in the recent-prices table.
    pub tail_rows: usize,
    /// Use dividend/split adjusted prices.
    pub auto_adjust: bool,
    pub defaults: InputDefaults,
    pub model: ModelSettings,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tickers: TickerSet::default(),
            history_start: default_history_start(),
            tail_rows: 5,
            auto_adjust: true,
            defaults: InputDefaults::default(),
            model: ModelSettings::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.model.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Load from an optional path; `None` yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
