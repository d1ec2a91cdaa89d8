//! Time series models for the Twelve Data `time_series` endpoint

use crate::common::{de_f64, de_opt_f64};
use serde::{Deserialize, Serialize};

/// Time series response.
///
/// A successful body carries `meta` and `values`; an error body carries
/// `code`, `message` and `status: "error"` and no `values`. Both shapes
/// deserialize into this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TimeSeriesResponse {
  /// Metadata about the series
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub meta: Option<TimeSeriesMeta>,

  /// Bars, newest first
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub values: Option<Vec<Bar>>,

  /// "ok" or "error"
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<String>,

  /// Error code on failure bodies
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub code: Option<i64>,

  /// Error message on failure bodies
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl TimeSeriesResponse {
  /// Bars if the body holds at least one, `None` for a "no data" body
  pub fn bars(&self) -> Option<&[Bar]> {
    match self.values.as_deref() {
      Some(bars) if !bars.is_empty() => Some(bars),
      _ => None,
    }
  }

  /// Human readable reason for a body without bars
  pub fn describe_empty(&self) -> String {
    match (&self.code, &self.message) {
      (Some(code), Some(msg)) => format!("{}: {}", code, msg),
      (None, Some(msg)) => msg.clone(),
      _ if self.values.is_some() => "empty values list".to_string(),
      _ => "missing values field".to_string(),
    }
  }
}

/// Metadata block of a time series response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TimeSeriesMeta {
  /// Symbol
  pub symbol: String,

  /// Interval (e.g., "5min")
  #[serde(default)]
  pub interval: String,

  /// Quote currency
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub currency: Option<String>,

  /// Exchange time zone (e.g., "America/New_York")
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exchange_timezone: Option<String>,

  /// Listing exchange
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub exchange: Option<String>,

  /// Instrument type (e.g., "Common Stock")
  #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
  pub instrument_type: Option<String>,
}

/// One interval's OHLCV observation. Only `high`, `low`, `close` and
/// `volume` are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
  /// Bar open time in the exchange time zone
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub datetime: Option<String>,

  /// Opening price
  #[serde(default, deserialize_with = "de_opt_f64", skip_serializing_if = "Option::is_none")]
  pub open: Option<f64>,

  /// Highest price
  #[serde(deserialize_with = "de_f64")]
  pub high: f64,

  /// Lowest price
  #[serde(deserialize_with = "de_f64")]
  pub low: f64,

  /// Closing price
  #[serde(deserialize_with = "de_f64")]
  pub close: f64,

  /// Trading volume
  #[serde(deserialize_with = "de_f64")]
  pub volume: f64,
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  const OK_BODY: &str = r#"{
    "meta": {
      "symbol": "AAPL",
      "interval": "5min",
      "currency": "USD",
      "exchange_timezone": "America/New_York",
      "exchange": "NASDAQ",
      "mic_code": "XNGS",
      "type": "Common Stock"
    },
    "values": [
      {"datetime": "2024-01-05 15:55:00", "open": "181.39000", "high": "181.50000",
       "low": "181.20000", "close": "181.25000", "volume": "1208000"},
      {"datetime": "2024-01-05 15:50:00", "open": "181.10000", "high": "181.45000",
       "low": "181.05000", "close": "181.39000", "volume": "650000"}
    ],
    "status": "ok"
  }"#;

  #[test]
  fn test_parse_ok_body() {
    let series: TimeSeriesResponse = serde_json::from_str(OK_BODY).unwrap();
    let meta = series.meta.as_ref().unwrap();
    assert_eq!(meta.symbol, "AAPL");
    assert_eq!(meta.instrument_type.as_deref(), Some("Common Stock"));

    let bars = series.bars().unwrap();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0].close, 181.25);
    assert_eq!(bars[0].volume, 1_208_000.0);
    assert_eq!(bars[0].open, Some(181.39));
    assert_eq!(bars[0].datetime.as_deref(), Some("2024-01-05 15:55:00"));
  }

  #[test]
  fn test_error_body_has_no_bars() {
    let body = r#"{"code": 400, "message": "**symbol** not found: ZZZZ", "status": "error"}"#;
    let series: TimeSeriesResponse = serde_json::from_str(body).unwrap();
    assert!(series.bars().is_none());
    assert_eq!(series.status.as_deref(), Some("error"));
    assert_eq!(series.describe_empty(), "400: **symbol** not found: ZZZZ");
  }

  #[test]
  fn test_empty_values_is_no_data() {
    let series: TimeSeriesResponse =
      serde_json::from_str(r#"{"values": [], "status": "ok"}"#).unwrap();
    assert!(series.bars().is_none());
    assert_eq!(series.describe_empty(), "empty values list");
  }

  #[test]
  fn test_malformed_bar_fails_body() {
    let body = r#"{"values": [{"datetime": "2024-01-05 15:55:00", "open": "1",
      "high": "x", "low": "1", "close": "1", "volume": "1"}]}"#;
    assert!(serde_json::from_str::<TimeSeriesResponse>(body).is_err());
  }

  #[test]
  fn test_numeric_bars_accepted() {
    let body = r#"{"values": [{"datetime": "2024-01-05", "open": 10, "high": 11.5,
      "low": 9.5, "close": 11, "volume": 1000}]}"#;
    let series: TimeSeriesResponse = serde_json::from_str(body).unwrap();
    let bar = &series.bars().unwrap()[0];
    assert_eq!(bar.high, 11.5);
    assert_eq!(bar.open, Some(10.0));
  }

  #[test]
  fn test_bar_with_only_required_fields() {
    let body = r#"{"values": [{"high": "6", "low": "5", "close": "5", "volume": "1000"}], "status": "ok"}"#;
    let series: TimeSeriesResponse = serde_json::from_str(body).unwrap();
    let bar = &series.bars().unwrap()[0];
    assert_eq!(bar.high, 6.0);
    assert_eq!(bar.low, 5.0);
    assert_eq!(bar.close, 5.0);
    assert_eq!(bar.volume, 1000.0);
    assert_eq!(bar.datetime, None);
    assert_eq!(bar.open, None);
  }

  #[test]
  fn test_bar_missing_required_field_fails_body() {
    let body = r#"{"values": [{"high": "6", "low": "5", "close": "5"}]}"#;
    assert!(serde_json::from_str::<TimeSeriesResponse>(body).is_err());
  }
}
