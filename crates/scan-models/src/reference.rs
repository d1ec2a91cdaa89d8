//! Nasdaq Data Link datatable models (SHARADAR/TICKERS)
//!
//! Datatable responses are column-oriented: `columns` names each position of
//! every row in `data`. Rows are mapped to typed records by column name so
//! column order changes upstream do not break parsing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level datatable response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatatableResponse {
  pub datatable: Datatable,

  #[serde(default)]
  pub meta: DatatableMeta,
}

impl DatatableResponse {
  /// Cursor for the next page, if any
  pub fn next_cursor(&self) -> Option<&str> {
    self.meta.next_cursor_id.as_deref().filter(|c| !c.is_empty())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Datatable {
  #[serde(default)]
  pub data: Vec<Vec<Value>>,

  #[serde(default)]
  pub columns: Vec<DatatableColumn>,
}

impl Datatable {
  /// Decode every row into `T` by column name
  pub fn records<T: DeserializeOwned>(&self) -> Result<Vec<T>, serde_json::Error> {
    self
      .data
      .iter()
      .map(|row| {
        let object: Map<String, Value> =
          self.columns.iter().map(|c| c.name.clone()).zip(row.iter().cloned()).collect();
        serde_json::from_value(Value::Object(object))
      })
      .collect()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatatableColumn {
  pub name: String,

  #[serde(rename = "type", default)]
  pub column_type: String,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DatatableMeta {
  #[serde(default)]
  pub next_cursor_id: Option<String>,
}

/// One row of SHARADAR/TICKERS, restricted to the fields the scanner reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TickerRecord {
  pub ticker: String,

  /// "Y" or "N"
  #[serde(default)]
  pub isdelisted: Option<String>,

  #[serde(default)]
  pub exchange: Option<String>,

  /// e.g. "Domestic Common Stock"
  #[serde(default)]
  pub category: Option<String>,

  /// e.g. "5 - Large"
  #[serde(default)]
  pub scalemarketcap: Option<String>,

  #[serde(default)]
  pub name: Option<String>,
}

impl TickerRecord {
  pub fn is_delisted(&self) -> bool {
    self.isdelisted.as_deref() != Some("N")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  const PAGE: &str = r#"{
    "datatable": {
      "data": [
        ["SF1", "AAPL", "Apple Inc", "NASDAQ", "N", "Domestic Common Stock", "6 - Mega"],
        ["SF1", "OLD", "Old Corp", "NASDAQ", "Y", "Domestic Common Stock", null]
      ],
      "columns": [
        {"name": "table", "type": "String"},
        {"name": "ticker", "type": "String"},
        {"name": "name", "type": "String"},
        {"name": "exchange", "type": "String"},
        {"name": "isdelisted", "type": "String"},
        {"name": "category", "type": "String"},
        {"name": "scalemarketcap", "type": "String"}
      ]
    },
    "meta": {"next_cursor_id": "abc123"}
  }"#;

  #[test]
  fn test_records_map_by_column_name() {
    let response: DatatableResponse = serde_json::from_str(PAGE).unwrap();
    let records: Vec<TickerRecord> = response.datatable.records().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].ticker, "AAPL");
    assert_eq!(records[0].scalemarketcap.as_deref(), Some("6 - Mega"));
    assert!(!records[0].is_delisted());
    assert!(records[1].is_delisted());
    assert_eq!(records[1].scalemarketcap, None);
    assert_eq!(response.next_cursor(), Some("abc123"));
  }

  #[test]
  fn test_last_page_has_no_cursor() {
    let body = r#"{"datatable": {"data": [], "columns": []}, "meta": {"next_cursor_id": null}}"#;
    let response: DatatableResponse = serde_json::from_str(body).unwrap();
    assert_eq!(response.next_cursor(), None);
    assert!(response.datatable.records::<TickerRecord>().unwrap().is_empty());
  }

  #[test]
  fn test_missing_ticker_column_is_error() {
    let body = r#"{"datatable": {"data": [["NASDAQ"]], "columns": [{"name": "exchange"}]}}"#;
    let response: DatatableResponse = serde_json::from_str(body).unwrap();
    assert!(response.datatable.records::<TickerRecord>().is_err());
  }
}
