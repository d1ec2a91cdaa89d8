//! Endpoint groups exposed by [`crate::MarketDataClient`]

pub mod reference;
pub mod time_series;
