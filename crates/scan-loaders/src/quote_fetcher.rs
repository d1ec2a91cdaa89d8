//! Two-request quote fetch that turns raw bars into one signal row

use crate::error::{EmptyReason, FetchError};
use crate::signal::{average_volume, compute_signal, SessionStats, SignalData};
use async_trait::async_trait;
use futures::FutureExt;
use scan_client::MarketDataClient;
use scan_models::TimeSeriesResponse;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of intraday bars. Implemented by [`MarketDataClient`]; tests
/// substitute their own.
#[async_trait]
pub trait TimeSeriesSource: Send + Sync {
  /// One regular session of bars, newest first
  async fn session(&self, ticker: &str) -> scan_core::Result<TimeSeriesResponse>;

  /// Five regular sessions of bars at the same interval
  async fn lookback(&self, ticker: &str) -> scan_core::Result<TimeSeriesResponse>;
}

#[async_trait]
impl TimeSeriesSource for MarketDataClient {
  async fn session(&self, ticker: &str) -> scan_core::Result<TimeSeriesResponse> {
    self.time_series().session(ticker).await
  }

  async fn lookback(&self, ticker: &str) -> scan_core::Result<TimeSeriesResponse> {
    self.time_series().lookback(ticker).await
  }
}

pub type FetchOutcome = Result<SignalData, FetchError>;

/// Issues at most two requests per ticker and never propagates a failure
/// beyond the ticker it belongs to
#[derive(Clone)]
pub struct QuoteFetcher {
  source: Arc<dyn TimeSeriesSource>,
}

impl QuoteFetcher {
  pub fn new(source: Arc<dyn TimeSeriesSource>) -> Self {
    Self { source }
  }

  /// Fetch both series for `ticker` and compute its signal.
  ///
  /// Transport failures and panics are logged and reported as
  /// `TransportError` with no quota charged.
  pub async fn fetch(&self, ticker: &str) -> FetchOutcome {
    match AssertUnwindSafe(self.fetch_inner(ticker)).catch_unwind().await {
      Ok(Ok(signal)) => Ok(signal),
      Ok(Err(FetchError::TransportError(msg))) => {
        warn!("Error processing {}: {}", ticker, msg);
        Err(FetchError::TransportError(msg))
      }
      Ok(Err(empty)) => {
        debug!("{}: {}", ticker, empty);
        Err(empty)
      }
      Err(panic) => {
        let msg = panic_message(panic.as_ref());
        warn!("Error processing {}: fetch panicked: {}", ticker, msg);
        Err(FetchError::TransportError(format!("fetch panicked: {}", msg)))
      }
    }
  }

  async fn fetch_inner(&self, ticker: &str) -> FetchOutcome {
    let session = self.source.session(ticker).await.map_err(transport)?;
    let stats = session.bars().and_then(SessionStats::from_bars).ok_or_else(|| {
      debug!("{}: {}", ticker, session.describe_empty());
      FetchError::EmptyData { requests_consumed: 1, reason: EmptyReason::NoIntradayBars }
    })?;

    let lookback = self.source.lookback(ticker).await.map_err(transport)?;
    let window_average = lookback.bars().and_then(average_volume).ok_or_else(|| {
      debug!("{}: {}", ticker, lookback.describe_empty());
      FetchError::EmptyData { requests_consumed: 2, reason: EmptyReason::NoLookbackBars }
    })?;

    compute_signal(ticker, &stats, window_average)
      .map_err(|reason| FetchError::EmptyData { requests_consumed: 2, reason })
  }
}

fn transport(err: scan_core::Error) -> FetchError {
  FetchError::TransportError(err.to_string())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    (*s).to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic".to_string()
  }
}
