//! # scan-client
//!
//! HTTP client for the two upstream APIs the scanner depends on:
//!
//! - **Twelve Data** `time_series` for intraday bars
//! - **Nasdaq Data Link** `SHARADAR/TICKERS` for the reference ticker list
//!
//! No database dependencies. All methods return `scan_core::Result`.

pub mod client;
pub mod endpoints;
pub mod transport;

pub use client::MarketDataClient;
pub use endpoints::{reference::ReferenceEndpoints, time_series::TimeSeriesEndpoints};
pub use scan_core::{Config, Error, Result};
pub use scan_models::*;
