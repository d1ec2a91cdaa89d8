pub mod config;
pub mod error;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use error::{Error, Result};
pub use types::{Interval, MarketCapScale};

/// Base URL for the Twelve Data REST API
pub const TWELVE_DATA_BASE_URL: &str = "https://api.twelvedata.com";

/// Base URL for the Nasdaq Data Link v3 API
pub const NASDAQ_DATA_LINK_BASE_URL: &str = "https://data.nasdaq.com/api/v3";

/// Nasdaq Data Link datatable holding the Sharadar ticker metadata
pub const SHARADAR_TICKERS_TABLE: &str = "SHARADAR/TICKERS";

/// Default SQLite database file
pub const DEFAULT_DATABASE_PATH: &str = "stock_data.db";

/// Scan defaults
pub const DEFAULT_BATCH_SIZE: usize = 50;
pub const DEFAULT_QUOTA_THRESHOLD: u32 = 360; // requests before a cooldown
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;
pub const DEFAULT_ERROR_BACKOFF_SECS: u64 = 60;
pub const DEFAULT_IDLE_SECS: u64 = 1;

/// Bars in one regular session at 5min (6.5h * 12)
pub const SESSION_BAR_COUNT: u32 = 78;

/// Bars in the trailing five-session look-back window at 5min
pub const LOOKBACK_BAR_COUNT: u32 = 390;
