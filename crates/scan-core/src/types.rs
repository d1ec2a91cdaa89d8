//! Common types used across scan-* crates

use serde::{Deserialize, Serialize};

/// Bar interval requested from the Twelve Data `time_series` endpoint.
/// The scanner's session and look-back bar counts assume 5min bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Interval {
  #[default]
  Min5,
}

impl std::fmt::Display for Interval {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Interval::Min5 => write!(f, "5min"),
    }
  }
}

/// Sharadar `scalemarketcap` bucket.
///
/// The upstream labels carry a rank prefix ("5 - Large"); anything the
/// scanner does not recognise is kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketCapScale {
  Nano,
  Micro,
  Small,
  Mid,
  Large,
  Mega,
  Other(String),
}

impl MarketCapScale {
  /// Upstream label for this bucket
  pub fn label(&self) -> &str {
    match self {
      MarketCapScale::Nano => "1 - Nano",
      MarketCapScale::Micro => "2 - Micro",
      MarketCapScale::Small => "3 - Small",
      MarketCapScale::Mid => "4 - Mid",
      MarketCapScale::Large => "5 - Large",
      MarketCapScale::Mega => "6 - Mega",
      MarketCapScale::Other(label) => label,
    }
  }

  /// Parse an upstream label; never fails
  pub fn from_label(label: &str) -> Self {
    match label.trim() {
      "1 - Nano" => MarketCapScale::Nano,
      "2 - Micro" => MarketCapScale::Micro,
      "3 - Small" => MarketCapScale::Small,
      "4 - Mid" => MarketCapScale::Mid,
      "5 - Large" => MarketCapScale::Large,
      "6 - Mega" => MarketCapScale::Mega,
      other => MarketCapScale::Other(other.to_string()),
    }
  }
}

impl std::fmt::Display for MarketCapScale {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.label())
  }
}
