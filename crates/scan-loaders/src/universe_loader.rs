//! Daily refresh of the eligible ticker universe

use async_trait::async_trait;
use chrono::NaiveDate;
use scan_client::MarketDataClient;
use scan_core::MarketCapScale;
use scan_database_sqlite::{NewTicker, UniverseRepository};
use scan_models::TickerRecord;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::{LoaderError, LoaderResult};

/// Source of the full reference ticker list
#[async_trait]
pub trait ReferenceSource: Send + Sync {
  async fn all_tickers(&self) -> scan_core::Result<Vec<TickerRecord>>;
}

#[async_trait]
impl ReferenceSource for MarketDataClient {
  async fn all_tickers(&self) -> scan_core::Result<Vec<TickerRecord>> {
    self.reference().all_tickers().await
  }
}

/// Eligibility rules. A record must pass every one.
#[derive(Debug, Clone, PartialEq)]
pub struct UniverseFilter {
  pub exchange: String,
  pub categories: Vec<String>,
  pub market_caps: Vec<MarketCapScale>,
}

impl Default for UniverseFilter {
  fn default() -> Self {
    Self {
      exchange: "NASDAQ".to_string(),
      categories: vec![
        "Domestic Common Stock".to_string(),
        "ADR Common Stock".to_string(),
        "Canadian Common Stock".to_string(),
        "Domestic Common Stock Primary Class".to_string(),
      ],
      market_caps: vec![MarketCapScale::Large, MarketCapScale::Mid, MarketCapScale::Small],
    }
  }
}

impl UniverseFilter {
  pub fn accepts(&self, record: &TickerRecord) -> bool {
    if record.ticker.trim().is_empty() || record.is_delisted() {
      return false;
    }
    if record.exchange.as_deref() != Some(self.exchange.as_str()) {
      return false;
    }
    let category_ok = record
      .category
      .as_deref()
      .is_some_and(|c| self.categories.iter().any(|allowed| allowed == c));
    let cap_ok = record
      .scalemarketcap
      .as_deref()
      .map(MarketCapScale::from_label)
      .is_some_and(|cap| self.market_caps.contains(&cap));
    category_ok && cap_ok
  }

  /// Eligible records, deduplicated by ticker with the first occurrence kept
  pub fn apply(&self, records: Vec<TickerRecord>) -> Vec<TickerRecord> {
    let mut seen = HashSet::new();
    records
      .into_iter()
      .filter(|r| self.accepts(r))
      .filter(|r| seen.insert(r.ticker.clone()))
      .collect()
  }
}

/// Maintains the universe table
pub struct UniverseLoader {
  source: Arc<dyn ReferenceSource>,
  repository: Arc<dyn UniverseRepository>,
  filter: UniverseFilter,
}

impl UniverseLoader {
  pub fn new(
    source: Arc<dyn ReferenceSource>,
    repository: Arc<dyn UniverseRepository>,
    filter: UniverseFilter,
  ) -> Self {
    Self { source, repository, filter }
  }

  /// True before the first refresh or when the last one was on another day
  pub async fn needs_refresh(&self, today: NaiveDate) -> LoaderResult<bool> {
    let last = self.repository.last_refresh_date().await?;
    Ok(last != Some(today))
  }

  /// Fetch, filter and replace the universe. Any failure leaves the stored
  /// universe untouched and surfaces as `UniverseRefreshError`.
  #[instrument(skip(self))]
  pub async fn refresh(&self, today: NaiveDate) -> LoaderResult<Vec<String>> {
    let records = self
      .source
      .all_tickers()
      .await
      .map_err(|e| LoaderError::UniverseRefreshError(e.to_string()))?;
    let fetched = records.len();

    let eligible = self.filter.apply(records);
    let rows: Vec<NewTicker> = eligible
      .iter()
      .map(|r| {
        NewTicker::new(
          &r.ticker,
          r.category.as_deref().unwrap_or_default(),
          r.scalemarketcap.as_deref().unwrap_or_default(),
          today,
        )
      })
      .collect();

    self
      .repository
      .replace_universe(rows, today)
      .await
      .map_err(|e| LoaderError::UniverseRefreshError(e.to_string()))?;

    info!("Universe refreshed: {} eligible of {} reference rows", eligible.len(), fetched);
    Ok(eligible.into_iter().map(|r| r.ticker).collect())
  }

  /// Stored tickers
  pub async fn current(&self) -> LoaderResult<Vec<String>> {
    Ok(self.repository.tickers().await?)
  }
}
