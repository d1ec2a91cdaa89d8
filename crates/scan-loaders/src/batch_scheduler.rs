/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Batched, quota-aware fan-out over the ticker universe

use chrono::Utc;
use futures::future::join_all;
use scan_core::{DEFAULT_BATCH_SIZE, DEFAULT_COOLDOWN_SECS, DEFAULT_QUOTA_THRESHOLD};
use scan_database_sqlite::SignalRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{FetchError, LoaderError, LoaderResult};
use crate::progress::ProgressReporter;
use crate::quote_fetcher::QuoteFetcher;
use crate::shutdown::{sleep_or_shutdown, Shutdown};

/// Configuration for batch processing
#[derive(Debug, Clone)]
pub struct BatchConfig {
  /// Tickers fetched concurrently before each persistence checkpoint
  pub batch_size: usize,

  /// Requests allowed before a cooldown
  pub quota_threshold: u32,

  /// Pause once the threshold is reached
  pub cooldown: Duration,
}

impl Default for BatchConfig {
  fn default() -> Self {
    Self {
      batch_size: DEFAULT_BATCH_SIZE,
      quota_threshold: DEFAULT_QUOTA_THRESHOLD,
      cooldown: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
    }
  }
}

impl BatchConfig {
  pub fn validate(&self) -> LoaderResult<()> {
    if self.batch_size == 0 {
      return Err(LoaderError::ConfigurationError("batch size must be at least 1".to_string()));
    }
    if self.quota_threshold == 0 {
      return Err(LoaderError::ConfigurationError(
        "quota threshold must be at least 1".to_string(),
      ));
    }
    Ok(())
  }
}

/// Rolling request counter. Trips at or above the threshold; the caller
/// cools down and then calls [`QuotaGuard::reset`]. Not a sliding window.
#[derive(Debug, Clone)]
pub struct QuotaGuard {
  used: u32,
  threshold: u32,
}

impl QuotaGuard {
  pub fn new(threshold: u32) -> Self {
    Self { used: 0, threshold }
  }

  /// Add `requests` and report whether the threshold has been reached
  pub fn record(&mut self, requests: u32) -> bool {
    self.used = self.used.saturating_add(requests);
    self.used >= self.threshold
  }

  pub fn reset(&mut self) {
    self.used = 0;
  }

  pub fn used(&self) -> u32 {
    self.used
  }

  pub fn threshold(&self) -> u32 {
    self.threshold
  }
}

/// Outcome of one pass over the universe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassSummary {
  pub tickers_total: usize,
  /// Tickers that produced a stored signal
  pub signals_stored: usize,
  pub requests_consumed: u64,
  pub empty_data: usize,
  pub transport_errors: usize,
  pub batches: usize,
  pub cooldowns: usize,
  /// Stopped early on a shutdown request
  pub interrupted: bool,
  pub elapsed: Duration,
}

/// Drives the quote fetcher over fixed-size batches and persists each
/// batch's successes as one upsert
pub struct BatchScheduler {
  fetcher: QuoteFetcher,
  signals: Arc<dyn SignalRepository>,
  config: BatchConfig,
  shutdown: Shutdown,
}

impl BatchScheduler {
  pub fn new(
    fetcher: QuoteFetcher,
    signals: Arc<dyn SignalRepository>,
    config: BatchConfig,
    shutdown: Shutdown,
  ) -> Self {
    Self { fetcher, signals, config, shutdown }
  }

  pub fn config(&self) -> &BatchConfig {
    &self.config
  }

  /// Process every ticker once.
  ///
  /// Per-ticker failures are counted, never raised. A failed upsert is a pass-level error,
  /// but the batch's requests are charged to `quota` first. Shutdown is honored between batches and during the
  /// cooldown.
  pub async fn run_pass(
    &self,
    tickers: &[String],
    quota: &mut QuotaGuard,
    progress: &mut ProgressReporter,
  ) -> LoaderResult<PassSummary> {
    self.config.validate()?;

    let started = Instant::now();
    let mut summary = PassSummary { tickers_total: tickers.len(), ..Default::default() };
    let total_batches = tickers.len().div_ceil(self.config.batch_size);

    for (batch_idx, batch) in tickers.chunks(self.config.batch_size).enumerate() {
      if self.shutdown.is_requested() {
        info!("Shutdown requested; stopping before batch {}", batch_idx + 1);
        summary.interrupted = true;
        break;
      }

      debug!("Processing batch {} of {} ({} tickers)", batch_idx + 1, total_batches, batch.len());

      let outcomes = join_all(batch.iter().map(|ticker| self.fetcher.fetch(ticker))).await;

      let mut requests = 0u32;
      let mut rows = Vec::with_capacity(batch.len());
      let written_at = Utc::now().naive_utc();

      for outcome in outcomes {
        match outcome {
          Ok(signal) => {
            requests += 2;
            rows.push(signal.to_new_signal(written_at));
          }
          Err(err) => {
            requests += err.requests_consumed();
            match err {
              FetchError::EmptyData { .. } => summary.empty_data += 1,
              FetchError::TransportError(_) => summary.transport_errors += 1,
            }
          }
        }
      }

      // spent requests count against the quota whether or not the upsert succeeds
      summary.requests_consumed += u64::from(requests);
      progress.update(batch.len(), requests);
      let tripped = quota.record(requests);

      let stored = rows.len();
      self.signals.upsert_signals(rows).await?;
      summary.signals_stored += stored;
      summary.batches += 1;

      if tripped {
        warn!(
          "Request quota reached ({} >= {}); cooling down for {}s",
          quota.used(),
          quota.threshold(),
          self.config.cooldown.as_secs()
        );
        summary.cooldowns += 1;
        let interrupted = sleep_or_shutdown(self.config.cooldown, &self.shutdown).await;
        quota.reset();
        if interrupted {
          summary.interrupted = true;
          break;
        }
      }
    }

    summary.elapsed = started.elapsed();
    progress.finish();
    Ok(summary)
  }
}
