//! # scan-models
//!
//! Data models for the upstream APIs the scanner talks to.
//!
//! - [`time_series`]: the Twelve Data `time_series` body (a list of OHLCV bars)
//! - [`reference`]: the Nasdaq Data Link datatable body used for the
//!   Sharadar ticker universe
//!
//! ## Usage
//!
//! ```ignore
//! use scan_models::time_series::TimeSeriesResponse;
//!
//! let series: TimeSeriesResponse = serde_json::from_str(&response_json)?;
//! if let Some(bars) = series.bars() {
//!     println!("latest close {}", bars[0].close);
//! }
//! ```

#![warn(clippy::all)]

pub mod common;
pub mod reference;
pub mod time_series;

pub use reference::{Datatable, DatatableColumn, DatatableMeta, DatatableResponse, TickerRecord};
pub use time_series::{Bar, TimeSeriesMeta, TimeSeriesResponse};
