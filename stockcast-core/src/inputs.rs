//! User inputs: the selectable ticker set and the two bounded sliders.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tickers offered when no configuration overrides them.
pub const DEFAULT_TICKERS: [&str; 6] = ["NVDA", "GOOGL", "MSFT", "AMZN", "AAPL", "TSLA"];

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("lookback must be between {min} and {max} years, got {value}")]
    LookbackOutOfRange { value: u32, min: u32, max: u32 },

    #[error("horizon must be between {min} and {max} months, got {value}")]
    HorizonOutOfRange { value: u32, min: u32, max: u32 },

    #[error("ticker set must not be empty")]
    EmptyTickerSet,

    #[error("'{0}' is not one of the selectable tickers")]
    UnknownTicker(String),
}

/// Ordered, fixed set of selectable ticker symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TickerSet {
    symbols: Vec<String>,
}

impl TickerSet {
    /// Build a set from symbols; they are upper-cased and de-duplicated in order.
    pub fn new<I, S>(symbols: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<String> = Vec::new();
        for s in symbols {
            let sym = s.as_ref().trim().to_uppercase();
            if !sym.is_empty() && !out.contains(&sym) {
                out.push(sym);
            }
        }
        if out.is_empty() {
            return Err(InputError::EmptyTickerSet);
        }
        Ok(Self { symbols: out })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Canonical symbol for `ticker` (case-insensitive), if selectable.
    pub fn find(&self, ticker: &str) -> Option<&str> {
        self.symbols
            .iter()
            .find(|s| s.eq_ignore_ascii_case(ticker.trim()))
            .map(String::as_str)
    }

    pub fn index_of(&self, ticker: &str) -> Option<usize> {
        self.symbols
            .iter()
            .position(|s| s.eq_ignore_ascii_case(ticker.trim()))
    }

    /// First symbol; shown selected before the user picks anything.
    pub fn first(&self) -> &str {
        self.symbols.first().map(String::as_str).unwrap_or_default()
    }

    /// Symbol after `ticker`, wrapping around.
    pub fn next_after(&self, ticker: &str) -> &str {
        let i = self.index_of(ticker).map_or(0, |i| (i + 1) % self.len());
        &self.symbols[i]
    }

    /// Symbol before `ticker`, wrapping around.
    pub fn prev_before(&self, ticker: &str) -> &str {
        let n = self.len();
        let i = self.index_of(ticker).map_or(0, |i| (i + n - 1) % n);
        &self.symbols[i]
    }
}

impl Default for TickerSet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for TickerSet {
    type Error = InputError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TickerSet> for Vec<String> {
    fn from(value: TickerSet) -> Self {
        value.symbols
    }
}

/// Years of history nominally used for training (slider 1..=5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct LookbackYears(u32);

impl LookbackYears {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 5;

    pub fn new(years: u32) -> Result<Self, InputError> {
        if !(Self::MIN..=Self::MAX).contains(&years) {
            return Err(InputError::LookbackOutOfRange {
                value: years,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(years))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Nominal training window in days.
    pub fn days(self) -> u32 {
        self.0 * 365
    }

    pub fn increment(self) -> Self {
        Self((self.0 + 1).min(Self::MAX))
    }

    pub fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN))
    }
}

impl Default for LookbackYears {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u32> for LookbackYears {
    type Error = InputError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LookbackYears> for u32 {
    fn from(value: LookbackYears) -> Self {
        value.0
    }
}

/// Months to forecast past the last observation (slider 1..=12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct HorizonMonths(u32);

impl HorizonMonths {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 12;
    /// Calendar days counted per month when sizing the future scaffold.
    pub const DAYS_PER_MONTH: u32 = 30;

    pub fn new(months: u32) -> Result<Self, InputError> {
        if !(Self::MIN..=Self::MAX).contains(&months) {
            return Err(InputError::HorizonOutOfRange {
                value: months,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(months))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Future scaffold length in days.
    pub fn days(self) -> usize {
        (self.0 * Self::DAYS_PER_MONTH) as usize
    }

    pub fn increment(self) -> Self {
        Self((self.0 + 1).min(Self::MAX))
    }

    pub fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN))
    }
}

impl Default for HorizonMonths {
    fn default() -> Self {
        Self(6)
    }
}

impl TryFrom<u32> for HorizonMonths {
    type Error = InputError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HorizonMonths> for u32 {
    fn from(value: HorizonMonths) -> Self {
        value.0
    }
}

/// Everything the user picked for one rerun.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub ticker: String,
    pub lookback: LookbackYears,
    pub horizon: HorizonMonths,
}

impl Selection {
    /// Validate `ticker` against `tickers`, canonicalizing its case.
    pub fn new(
        tickers: &TickerSet,
        ticker: &str,
        lookback: LookbackYears,
        horizon: HorizonMonths,
    ) -> Result<Self, InputError> {
        let ticker = tickers
            .find(ticker)
            .ok_or_else(|| InputError::UnknownTicker(ticker.to_string()))?
            .to_string();
        Ok(Self {
            ticker,
            lookback,
            horizon,
        })
    }
}
