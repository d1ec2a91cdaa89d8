#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use scan_database_sqlite::{
  NewSignal, NewTicker, RepositoryError, RepositoryResult, Signal, SignalFilter, SignalRepository,
  UniverseRepository,
};
use scan_loaders::{ReferenceSource, TimeSeriesSource};
use scan_models::{Bar, TickerRecord, TimeSeriesResponse};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

pub fn bar(high: f64, low: f64, close: f64, volume: f64) -> Bar {
  Bar { datetime: Some("2024-01-05 15:55:00".to_string()), open: Some(close), high, low, close, volume }
}

pub fn series(bars: Vec<Bar>) -> TimeSeriesResponse {
  TimeSeriesResponse { values: Some(bars), status: Some("ok".to_string()), ..Default::default() }
}

pub fn record(ticker: &str) -> TickerRecord {
  TickerRecord {
    ticker: ticker.to_string(),
    isdelisted: Some("N".to_string()),
    exchange: Some("NASDAQ".to_string()),
    category: Some("Domestic Common Stock".to_string()),
    scalemarketcap: Some("4 - Mid".to_string()),
    name: None,
  }
}

pub fn tickers(n: usize) -> Vec<String> {
  (0..n).map(|i| format!("T{:04}", i)).collect()
}

/// Answers every ticker with valid bars and remembers when each session
/// request arrived
#[derive(Default)]
pub struct RecordingSource {
  pub calls: Mutex<Vec<(String, Instant)>>,
}

impl RecordingSource {
  pub fn started_at(&self, ticker: &str) -> Option<Instant> {
    self.calls.lock().unwrap().iter().find(|(t, _)| t == ticker).map(|(_, at)| *at)
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().unwrap().len()
  }
}

#[async_trait]
impl TimeSeriesSource for RecordingSource {
  async fn session(&self, ticker: &str) -> scan_core::Result<TimeSeriesResponse> {
    self.calls.lock().unwrap().push((ticker.to_string(), Instant::now()));
    Ok(series(vec![bar(6.0, 5.0, 5.0, 600.0), bar(5.5, 5.1, 5.2, 400.0)]))
  }

  async fn lookback(&self, _ticker: &str) -> scan_core::Result<TimeSeriesResponse> {
    Ok(series(vec![bar(1.0, 1.0, 1.0, 400.0), bar(1.0, 1.0, 1.0, 440.0), bar(1.0, 1.0, 1.0, 410.0)]))
  }
}

/// Valid bars for most tickers. `SLOW` answers its session request after
/// 30 seconds, `FAIL` returns an HTTP error and `BOOM` panics.
#[derive(Default)]
pub struct UnevenSource {
  pub inner: RecordingSource,
}

pub const SLOW_SESSION: std::time::Duration = std::time::Duration::from_secs(30);

#[async_trait]
impl TimeSeriesSource for UnevenSource {
  async fn session(&self, ticker: &str) -> scan_core::Result<TimeSeriesResponse> {
    let response = self.inner.session(ticker).await;
    match ticker {
      "SLOW" => {
        tokio::time::sleep(SLOW_SESSION).await;
        response
      }
      "FAIL" => Err(scan_core::Error::Http("HTTP error: 502 Bad Gateway".to_string())),
      "BOOM" => panic!("malformed payload for BOOM"),
      _ => response,
    }
  }

  async fn lookback(&self, ticker: &str) -> scan_core::Result<TimeSeriesResponse> {
    self.inner.lookback(ticker).await
  }
}

/// Reference list that can be told to fail its first `fail_first` calls
pub struct FakeReference {
  pub records: Vec<TickerRecord>,
  pub fail_first: usize,
  pub calls: AtomicUsize,
}

impl FakeReference {
  pub fn new(records: Vec<TickerRecord>) -> Self {
    Self { records, fail_first: 0, calls: AtomicUsize::new(0) }
  }

  pub fn failing(records: Vec<TickerRecord>, fail_first: usize) -> Self {
    Self { records, fail_first, calls: AtomicUsize::new(0) }
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl ReferenceSource for FakeReference {
  async fn all_tickers(&self) -> scan_core::Result<Vec<TickerRecord>> {
    let call = self.calls.fetch_add(1, Ordering::SeqCst);
    if call < self.fail_first {
      return Err(scan_core::Error::Http("HTTP error: 503 Service Unavailable".to_string()));
    }
    Ok(self.records.clone())
  }
}

#[derive(Default)]
pub struct MemoryUniverse {
  rows: Mutex<Vec<NewTicker>>,
  refreshed_on: Mutex<Option<NaiveDate>>,
}

#[async_trait]
impl UniverseRepository for MemoryUniverse {
  async fn replace_universe(
    &self,
    tickers: Vec<NewTicker>,
    refreshed_on: NaiveDate,
  ) -> RepositoryResult<usize> {
    let n = tickers.len();
    *self.rows.lock().unwrap() = tickers;
    *self.refreshed_on.lock().unwrap() = Some(refreshed_on);
    Ok(n)
  }

  async fn tickers(&self) -> RepositoryResult<Vec<String>> {
    let mut names: Vec<String> = self.rows.lock().unwrap().iter().map(|r| r.ticker.clone()).collect();
    names.sort();
    Ok(names)
  }

  async fn last_refresh_date(&self) -> RepositoryResult<Option<NaiveDate>> {
    Ok(*self.refreshed_on.lock().unwrap())
  }

  async fn count(&self) -> RepositoryResult<i64> {
    Ok(self.rows.lock().unwrap().len() as i64)
  }
}

/// In-memory signal table; records the size of every upsert batch
#[derive(Default)]
pub struct MemorySignals {
  rows: Mutex<BTreeMap<String, NewSignal>>,
  pub upserts: Mutex<Vec<usize>>,
  pub upserted_at: Mutex<Vec<Instant>>,
}

impl MemorySignals {
  fn to_signal(row: &NewSignal) -> Signal {
    Signal {
      ticker: row.ticker.clone(),
      latest_price: row.latest_price,
      percent_change: row.percent_change,
      volume_ratio: row.volume_ratio,
      daily_volume: row.daily_volume,
      last_updated: row.last_updated,
    }
  }

  fn top(&self, filter: &SignalFilter, n: i64, key: fn(&Signal) -> f64) -> Vec<Signal> {
    let mut rows: Vec<Signal> = self
      .rows
      .lock()
      .unwrap()
      .values()
      .map(Self::to_signal)
      .filter(|s| {
        s.latest_price > filter.min_price
          && s.latest_price < filter.max_price
          && s.daily_volume > filter.min_volume
      })
      .collect();
    rows.sort_by(|a, b| key(b).total_cmp(&key(a)));
    rows.truncate(n.max(0) as usize);
    rows
  }
}

#[async_trait]
impl SignalRepository for MemorySignals {
  async fn upsert_signals(&self, rows: Vec<NewSignal>) -> RepositoryResult<usize> {
    let n = rows.len();
    self.upserts.lock().unwrap().push(n);
    self.upserted_at.lock().unwrap().push(Instant::now());
    let mut table = self.rows.lock().unwrap();
    for row in rows {
      table.insert(row.ticker.clone(), row);
    }
    Ok(n)
  }

  async fn get_signal(&self, ticker: &str) -> RepositoryResult<Option<Signal>> {
    Ok(self.rows.lock().unwrap().get(ticker).map(Self::to_signal))
  }

  async fn count(&self) -> RepositoryResult<i64> {
    Ok(self.rows.lock().unwrap().len() as i64)
  }

  async fn top_by_percent_change(&self, filter: &SignalFilter, n: i64) -> RepositoryResult<Vec<Signal>> {
    Ok(self.top(filter, n, |s| s.percent_change))
  }

  async fn top_by_volume_ratio(&self, filter: &SignalFilter, n: i64) -> RepositoryResult<Vec<Signal>> {
    Ok(self.top(filter, n, |s| s.volume_ratio))
  }
}

/// Signal table whose writes always fail
#[derive(Default)]
pub struct BrokenSignals;

#[async_trait]
impl SignalRepository for BrokenSignals {
  async fn upsert_signals(&self, _rows: Vec<NewSignal>) -> RepositoryResult<usize> {
    Err(RepositoryError::TransactionError("database is locked".to_string()))
  }

  async fn get_signal(&self, _ticker: &str) -> RepositoryResult<Option<Signal>> {
    Ok(None)
  }

  async fn count(&self) -> RepositoryResult<i64> {
    Ok(0)
  }

  async fn top_by_percent_change(&self, _filter: &SignalFilter, _n: i64) -> RepositoryResult<Vec<Signal>> {
    Ok(Vec::new())
  }

  async fn top_by_volume_ratio(&self, _filter: &SignalFilter, _n: i64) -> RepositoryResult<Vec<Signal>> {
    Ok(Vec::new())
  }
}
