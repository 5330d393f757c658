//! Price data: provider seam, Yahoo Finance client, frame normalization, memoized loading

pub mod frame;
pub mod loader;
pub mod provider;
pub mod yahoo;

pub use loader::{default_history_start, DataLoader};
pub use provider::{DataError, DataProvider, FetchResult, PriceRecord};
pub use yahoo::YahooProvider;
