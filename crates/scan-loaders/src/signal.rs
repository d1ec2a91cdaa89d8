//! Derived per-ticker metrics

use crate::error::EmptyReason;
use chrono::NaiveDateTime;
use scan_database_sqlite::NewSignal;
use scan_models::Bar;

/// Signal computed for one ticker in one pass
#[derive(Debug, Clone, PartialEq)]
pub struct SignalData {
  pub ticker: String,
  /// Close of the newest session bar
  pub latest_price: f64,
  /// (high - low) / low * 100, two decimals
  pub percent_change: f64,
  /// Average bar volume today over the look-back average, two decimals
  pub volume_ratio: f64,
  /// Cumulative session volume, truncated
  pub daily_volume: i64,
}

impl SignalData {
  pub fn to_new_signal(&self, written_at: NaiveDateTime) -> NewSignal {
    NewSignal {
      ticker: self.ticker.clone(),
      latest_price: self.latest_price,
      percent_change: self.percent_change,
      volume_ratio: self.volume_ratio,
      daily_volume: self.daily_volume,
      last_updated: written_at,
    }
  }
}

/// Aggregates over one regular session (bars newest first)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionStats {
  pub high: f64,
  pub low: f64,
  pub close: f64,
  pub total_volume: f64,
  pub average_volume: f64,
}

impl SessionStats {
  /// `None` for an empty slice
  pub fn from_bars(bars: &[Bar]) -> Option<Self> {
    let first = bars.first()?;
    let mut high = f64::MIN;
    let mut low = f64::MAX;
    let mut total_volume = 0.0;

    for bar in bars {
      high = high.max(bar.high);
      low = low.min(bar.low);
      total_volume += bar.volume;
    }

    Some(Self {
      high,
      low,
      close: first.close,
      total_volume,
      average_volume: total_volume / bars.len() as f64,
    })
  }
}

/// Average per-bar volume, `None` for an empty slice
pub fn average_volume(bars: &[Bar]) -> Option<f64> {
  if bars.is_empty() {
    return None;
  }
  Some(bars.iter().map(|b| b.volume).sum::<f64>() / bars.len() as f64)
}

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
  (value * 100.0).round() / 100.0
}

/// Combine the session and look-back aggregates into a signal.
///
/// Returns the reason instead of a row when the math would be degenerate.
pub fn compute_signal(
  ticker: &str,
  session: &SessionStats,
  lookback_average: f64,
) -> Result<SignalData, EmptyReason> {
  if session.low <= 0.0 {
    return Err(EmptyReason::NonPositiveLow);
  }
  if lookback_average <= 0.0 {
    return Err(EmptyReason::ZeroLookbackVolume);
  }

  Ok(SignalData {
    ticker: ticker.to_string(),
    latest_price: session.close,
    percent_change: round2((session.high - session.low) / session.low * 100.0),
    volume_ratio: round2(session.average_volume / lookback_average),
    daily_volume: session.total_volume as i64,
  })
}
