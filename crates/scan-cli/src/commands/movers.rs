//! Terminal rendering of the movers dashboard

use anyhow::Result;
use chrono::Local;
use clap::Args;
use colored::Colorize;
use std::time::Duration;

use scan_database_sqlite::{DatabaseContext, Signal, SignalFilter, SignalRepository, DEFAULT_TOP_N};

use crate::config::Config;

const SUPER_MOVER_PERCENT: f64 = 20.0;
const SUPER_MOVER_RATIO: f64 = 10.0;

#[derive(Args, Debug)]
pub struct MoversArgs {
  /// Rows per table
  #[arg(short = 'n', long, default_value_t = DEFAULT_TOP_N)]
  top: i64,

  /// Exclusive lower price bound
  #[arg(long, default_value_t = 1.0)]
  min_price: f64,

  /// Exclusive upper price bound
  #[arg(long, default_value_t = 20.0)]
  max_price: f64,

  /// Exclusive daily volume floor
  #[arg(long, default_value_t = 100_000)]
  min_volume: i64,

  /// Redraw until interrupted
  #[arg(short, long)]
  watch: bool,

  /// Seconds between redraws with --watch
  #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
  interval: u64,
}

impl MoversArgs {
  fn filter(&self) -> SignalFilter {
    SignalFilter { min_price: self.min_price, max_price: self.max_price, min_volume: self.min_volume }
  }
}

pub async fn execute(args: MoversArgs, config: Config) -> Result<()> {
  let db = DatabaseContext::new(&config.database_path)?;
  let repo = db.signal_repository();
  let filter = args.filter();

  loop {
    let by_percent = repo.top_by_percent_change(&filter, args.top).await?;
    let by_volume = repo.top_by_volume_ratio(&filter, args.top).await?;

    if args.watch {
      // clear screen and home the cursor
      print!("\x1B[2J\x1B[H");
    }
    print!("{}", render_table(&format!("Top {} Percent Movers", args.top), &by_percent, Highlight::Percent));
    print!("{}", render_table(&format!("Top {} Volume Movers", args.top), &by_volume, Highlight::Volume));
    println!("Last updated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    if !args.watch {
      return Ok(());
    }

    tokio::select! {
      _ = tokio::time::sleep(Duration::from_secs(args.interval)) => {}
      _ = tokio::signal::ctrl_c() => return Ok(()),
    }
  }
}

#[derive(Debug, Clone, Copy)]
enum Highlight {
  Percent,
  Volume,
}

fn is_super_mover(signal: &Signal) -> bool {
  signal.percent_change > SUPER_MOVER_PERCENT && signal.volume_ratio > SUPER_MOVER_RATIO
}

fn render_table(title: &str, rows: &[Signal], highlight: Highlight) -> String {
  let mut out = format!("\n{}\n", title.bold());
  out.push_str(&format!(
    "{:<8} {:>10} {:>10} {:>10} {:>14}\n",
    "Ticker", "Price", "% Change", "Vol Ratio", "Volume"
  ));

  if rows.is_empty() {
    out.push_str("  (no matching signals)\n");
    return out;
  }

  for row in rows {
    let change = format!("{:>10.2}", row.percent_change);
    let change = if row.percent_change > 0.0 { change.green() } else { change.red() };
    let ticker = format!("{:<8}", row.ticker);
    let ticker = match (is_super_mover(row), highlight) {
      (true, Highlight::Percent) => ticker.black().on_yellow(),
      (true, Highlight::Volume) => ticker.black().on_cyan(),
      (false, _) => ticker.normal(),
    };
    out.push_str(&format!(
      "{} {:>10} {} {:>10.2} {:>14}\n",
      ticker,
      format!("${:.2}", row.latest_price),
      change,
      row.volume_ratio,
      row.daily_volume
    ));
  }
  out
}
