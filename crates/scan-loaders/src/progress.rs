//! Throughput accounting for one scan pass

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// Session-scoped accumulator passed into each batch.
///
/// Uses tokio's clock so paused-time tests see the same elapsed time as
/// the scheduler.
pub struct ProgressReporter {
  total: usize,
  processed: usize,
  request_count: u64,
  started: Instant,
  bar: Option<ProgressBar>,
}

impl ProgressReporter {
  pub fn new(total: usize) -> Self {
    Self { total, processed: 0, request_count: 0, started: Instant::now(), bar: None }
  }

  /// Also drive a terminal progress bar
  pub fn with_progress_bar(mut self) -> Self {
    let bar = ProgressBar::new(self.total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
      .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
      bar.set_style(style.progress_chars("#>-"));
    }
    self.bar = Some(bar);
    self
  }

  /// Record a finished batch and emit the status line
  pub fn update(&mut self, batch_len: usize, requests: u32) {
    self.processed += batch_len;
    self.request_count += u64::from(requests);

    let rate = self.rate_per_minute();
    info!(
      "Processed {}/{} stocks. Rate: {:.2} stocks/minute. Requests: {}",
      self.processed, self.total, rate, self.request_count
    );

    if let Some(bar) = &self.bar {
      bar.inc(batch_len as u64);
      bar.set_message(format!("{:.0}/min, {} requests", rate, self.request_count));
    }
  }

  /// Tickers processed per minute since the pass began; 0 before any time
  /// has elapsed
  pub fn rate_per_minute(&self) -> f64 {
    rate_per_minute(self.processed, self.started.elapsed())
  }

  pub fn finish(&self) {
    if let Some(bar) = &self.bar {
      bar.finish_with_message(format!(
        "Completed: {} stocks, {} requests",
        self.processed, self.request_count
      ));
    }
  }

  pub fn processed(&self) -> usize {
    self.processed
  }

  pub fn request_count(&self) -> u64 {
    self.request_count
  }

  pub fn total(&self) -> usize {
    self.total
  }

  pub fn elapsed(&self) -> Duration {
    self.started.elapsed()
  }
}

fn rate_per_minute(processed: usize, elapsed: Duration) -> f64 {
  let secs = elapsed.as_secs_f64();
  if secs <= 0.0 {
    0.0
  } else {
    processed as f64 / secs * 60.0
  }
}
