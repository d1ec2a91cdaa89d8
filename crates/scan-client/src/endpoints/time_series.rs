//! Intraday time series endpoint (Twelve Data `time_series`)

use crate::transport::Transport;
use scan_core::{Interval, Result, LOOKBACK_BAR_COUNT, SESSION_BAR_COUNT};
use scan_models::time_series::TimeSeriesResponse;
use std::sync::Arc;
use tracing::instrument;

/// Time series endpoints for intraday bars
pub struct TimeSeriesEndpoints {
  transport: Arc<Transport>,
}

impl TimeSeriesEndpoints {
  pub fn new(transport: Arc<Transport>) -> Self {
    Self { transport }
  }

  /// Fetch the newest `output_size` bars at `interval`.
  ///
  /// A provider error body decodes successfully and yields a response
  /// without bars; only transport, status and decode failures are `Err`.
  #[instrument(skip(self), fields(symbol = %symbol, interval = %interval))]
  pub async fn intraday(
    &self,
    symbol: &str,
    interval: Interval,
    output_size: u32,
  ) -> Result<TimeSeriesResponse> {
    let params = [
      ("symbol", symbol.to_string()),
      ("interval", interval.to_string()),
      ("outputsize", output_size.to_string()),
    ];
    self.transport.get("time_series", &params).await
  }

  /// One regular session of 5min bars
  pub async fn session(&self, symbol: &str) -> Result<TimeSeriesResponse> {
    self.intraday(symbol, Interval::Min5, SESSION_BAR_COUNT).await
  }

  /// Five regular sessions of 5min bars
  pub async fn lookback(&self, symbol: &str) -> Result<TimeSeriesResponse> {
    self.intraday(symbol, Interval::Min5, LOOKBACK_BAR_COUNT).await
  }
}
