//! Top-level scan state machine
//!
//! ```text
//! Initializing -> RefreshingUniverse -> Scanning -> Idle -> Scanning ...
//!                         any state  -> RecoveringFromError -> Scanning
//!                         interrupt  -> Stopped
//! ```

use chrono::{NaiveDate, Utc};
use scan_client::MarketDataClient;
use scan_core::{Config, DEFAULT_ERROR_BACKOFF_SECS, DEFAULT_IDLE_SECS};
use scan_database_sqlite::DatabaseContext;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::batch_scheduler::{BatchConfig, BatchScheduler, PassSummary, QuotaGuard};
use crate::error::LoaderResult;
use crate::progress::ProgressReporter;
use crate::quote_fetcher::QuoteFetcher;
use crate::shutdown::{sleep_or_shutdown, Shutdown};
use crate::universe_loader::{UniverseFilter, UniverseLoader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
  Initializing,
  RefreshingUniverse,
  Scanning,
  Idle,
  RecoveringFromError,
  Stopped,
}

impl std::fmt::Display for ScanState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      ScanState::Initializing => "initializing",
      ScanState::RefreshingUniverse => "refreshing universe",
      ScanState::Scanning => "scanning",
      ScanState::Idle => "idle",
      ScanState::RecoveringFromError => "recovering from error",
      ScanState::Stopped => "stopped",
    };
    f.write_str(name)
  }
}

/// Scan tuning
#[derive(Debug, Clone)]
pub struct ScanConfig {
  pub batch: BatchConfig,
  pub universe_filter: UniverseFilter,
  /// Pause after a failed pass
  pub error_backoff: Duration,
  /// Pause between passes
  pub idle: Duration,
  /// Stop after this many passes (successful or not); `None` runs until
  /// interrupted
  pub max_passes: Option<u32>,
  pub show_progress: bool,
}

impl Default for ScanConfig {
  fn default() -> Self {
    Self {
      batch: BatchConfig::default(),
      universe_filter: UniverseFilter::default(),
      error_backoff: Duration::from_secs(DEFAULT_ERROR_BACKOFF_SECS),
      idle: Duration::from_secs(DEFAULT_IDLE_SECS),
      max_passes: None,
      show_progress: false,
    }
  }
}

/// Totals across the whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
  pub passes: u32,
  pub failed_passes: u32,
  pub signals_stored: u64,
  pub requests_consumed: u64,
  pub last_pass: Option<PassSummary>,
}

type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

pub struct ScanLoop {
  universe: UniverseLoader,
  scheduler: BatchScheduler,
  config: ScanConfig,
  shutdown: Shutdown,
  quota: QuotaGuard,
  state: ScanState,
  today: Clock,
}

impl ScanLoop {
  pub fn new(
    universe: UniverseLoader,
    scheduler: BatchScheduler,
    config: ScanConfig,
    shutdown: Shutdown,
  ) -> Self {
    let quota = QuotaGuard::new(config.batch.quota_threshold);
    Self {
      universe,
      scheduler,
      config,
      shutdown,
      quota,
      state: ScanState::Initializing,
      today: Box::new(|| Utc::now().date_naive()),
    }
  }

  /// Open (and migrate) the store, build the API client and wire the
  /// components together
  pub fn from_config(core: &Config, config: ScanConfig, shutdown: Shutdown) -> LoaderResult<Self> {
    info!("Initializing: opening {}", core.database_path);
    let db = DatabaseContext::new(&core.database_path)?;
    let client = Arc::new(MarketDataClient::new(core)?);

    let universe = UniverseLoader::new(
      client.clone(),
      Arc::new(db.universe_repository()),
      config.universe_filter.clone(),
    );
    let scheduler = BatchScheduler::new(
      QuoteFetcher::new(client),
      Arc::new(db.signal_repository()),
      config.batch.clone(),
      shutdown.clone(),
    );

    Ok(Self::new(universe, scheduler, config, shutdown))
  }

  /// Replace the UTC calendar used for the daily refresh check
  pub fn with_clock(mut self, today: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
    self.today = Box::new(today);
    self
  }

  pub fn state(&self) -> ScanState {
    self.state
  }

  fn transition(&mut self, next: ScanState) {
    if self.state != next {
      debug!("Scan state: {} -> {}", self.state, next);
      self.state = next;
    }
  }

  /// Run until interrupted or `max_passes` is reached. Pass-level errors
  /// are logged and retried after the back-off; they never end the loop.
  pub async fn run(&mut self) -> ScanReport {
    let mut report = ScanReport::default();

    loop {
      if self.shutdown.is_requested() {
        break;
      }

      let outcome = self.run_cycle().await;
      report.passes += 1;
      let done = self.config.max_passes.is_some_and(|max| report.passes >= max);

      let pause = match outcome {
        Ok(summary) => {
          report.signals_stored += summary.signals_stored as u64;
          report.requests_consumed += summary.requests_consumed;
          let interrupted = summary.interrupted;
          report.last_pass = Some(summary);
          if interrupted {
            break;
          }
          self.transition(ScanState::Idle);
          self.config.idle
        }
        Err(e) => {
          report.failed_passes += 1;
          self.transition(ScanState::RecoveringFromError);
          error!("Error in main loop: {}", e);
          self.config.error_backoff
        }
      };

      if done || sleep_or_shutdown(pause, &self.shutdown).await {
        break;
      }
    }

    self.transition(ScanState::Stopped);
    info!(
      "Scanner stopped after {} pass(es), {} failed; {} signals stored",
      report.passes, report.failed_passes, report.signals_stored
    );
    report
  }

  async fn run_cycle(&mut self) -> LoaderResult<PassSummary> {
    let today = (self.today)();

    let tickers = if self.universe.needs_refresh(today).await? {
      self.transition(ScanState::RefreshingUniverse);
      self.universe.refresh(today).await?
    } else {
      self.universe.current().await?
    };

    self.transition(ScanState::Scanning);
    let mut progress = ProgressReporter::new(tickers.len());
    if self.config.show_progress {
      progress = progress.with_progress_bar();
    }

    let summary = self.scheduler.run_pass(&tickers, &mut self.quota, &mut progress).await?;
    info!(
      "Scan pass complete. Total processed: {} of {} ({} empty, {} errors, {} requests)",
      summary.signals_stored,
      summary.tickers_total,
      summary.empty_data,
      summary.transport_errors,
      summary.requests_consumed
    );
    Ok(summary)
  }
}
