use anyhow::Result;
use clap::Args;
use std::time::Duration;
use tracing::{info, warn};

use scan_core::{
  DEFAULT_BATCH_SIZE, DEFAULT_COOLDOWN_SECS, DEFAULT_ERROR_BACKOFF_SECS, DEFAULT_IDLE_SECS,
  DEFAULT_QUOTA_THRESHOLD,
};
use scan_loaders::{shutdown_channel, BatchConfig, ScanConfig, ScanLoop, ScanReport};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ScanArgs {
  /// Stop after this many passes; runs until interrupted when omitted
  #[arg(long)]
  passes: Option<u32>,

  /// Tickers fetched concurrently per batch
  #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
  batch_size: usize,

  /// Requests allowed before a cooldown
  #[arg(long, default_value_t = DEFAULT_QUOTA_THRESHOLD)]
  quota_threshold: u32,

  #[arg(long, default_value_t = DEFAULT_COOLDOWN_SECS)]
  cooldown_secs: u64,

  /// Pause after a failed pass
  #[arg(long, default_value_t = DEFAULT_ERROR_BACKOFF_SECS)]
  error_backoff_secs: u64,

  /// Pause between passes
  #[arg(long, default_value_t = DEFAULT_IDLE_SECS)]
  idle_secs: u64,

  /// Show a progress bar for each pass
  #[arg(long)]
  progress: bool,
}

impl ScanArgs {
  fn scan_config(&self) -> ScanConfig {
    ScanConfig {
      batch: BatchConfig {
        batch_size: self.batch_size,
        quota_threshold: self.quota_threshold,
        cooldown: Duration::from_secs(self.cooldown_secs),
      },
      error_backoff: Duration::from_secs(self.error_backoff_secs),
      idle: Duration::from_secs(self.idle_secs),
      max_passes: self.passes,
      show_progress: self.progress,
      ..Default::default()
    }
  }
}

pub async fn execute(args: ScanArgs, config: Config) -> Result<()> {
  let core = config.core_config()?;
  let scan_config = args.scan_config();
  scan_config.batch.validate()?;

  let (trigger, shutdown) = shutdown_channel();
  tokio::spawn(async move {
    match wait_for_signal().await {
      Ok(name) => {
        info!("Received {}, stopping at the next batch boundary", name);
        trigger.trigger();
      }
      Err(e) => warn!("Could not install signal handlers: {}", e),
    }
  });

  let mut scan = ScanLoop::from_config(&core, scan_config, shutdown)?;
  let report = scan.run().await;
  print_report(&report);

  Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<&'static str> {
  use tokio::signal::unix::{signal, SignalKind};
  let mut sigterm = signal(SignalKind::terminate())?;
  let mut sigint = signal(SignalKind::interrupt())?;
  tokio::select! {
    _ = sigterm.recv() => Ok("SIGTERM"),
    _ = sigint.recv() => Ok("SIGINT"),
  }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<&'static str> {
  tokio::signal::ctrl_c().await?;
  Ok("Ctrl+C")
}

fn print_report(report: &ScanReport) {
  println!("\nScanner stopped");
  println!("  Passes:          {} ({} failed)", report.passes, report.failed_passes);
  println!("  Signals stored:  {}", report.signals_stored);
  println!("  Requests used:   {}", report.requests_consumed);
  if let Some(last) = &report.last_pass {
    println!(
      "  Last pass:       {}/{} stored, {} empty, {} errors in {:.1}s",
      last.signals_stored,
      last.tickers_total,
      last.empty_data,
      last.transport_errors,
      last.elapsed.as_secs_f64()
    );
  }
}
