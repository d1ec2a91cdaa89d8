use crate::endpoints::{reference::ReferenceEndpoints, time_series::TimeSeriesEndpoints};
use crate::transport::{KeyParam, Transport};
use scan_core::{Config, Result};
use std::sync::Arc;
use tracing::debug;

/// Client for both upstream APIs used by the scanner.
///
/// The quote transport never retries so one ticker never costs more than
/// two quota units. The reference transport retries `config.max_retries`
/// times.
///
/// # Examples
///
/// ```rust,no_run
/// use scan_client::MarketDataClient;
/// use scan_core::Config;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MarketDataClient::new(&Config::from_env()?)?;
/// let series = client.time_series().session("AAPL").await?;
/// println!("{} bars", series.bars().map(|b| b.len()).unwrap_or(0));
/// # Ok(())
/// # }
/// ```
pub struct MarketDataClient {
  quote: Arc<Transport>,
  reference: Arc<Transport>,
}

impl MarketDataClient {
  pub fn new(config: &Config) -> Result<Self> {
    let quote = Transport::new(
      &config.quote_base_url,
      &config.quote_api_key,
      KeyParam::ApiKey,
      config.timeout_secs,
      0,
    )?;
    let reference = Transport::new(
      &config.reference_base_url,
      &config.reference_api_key,
      KeyParam::ApiUnderscoreKey,
      config.timeout_secs,
      config.max_retries,
    )?;
    debug!(
      "Quote API at {} (no retries), reference API at {} ({} retries)",
      quote.base_url(),
      reference.base_url(),
      reference.max_retries()
    );

    Ok(Self { quote: Arc::new(quote), reference: Arc::new(reference) })
  }

  /// Get access to the intraday time series endpoint
  pub fn time_series(&self) -> TimeSeriesEndpoints {
    TimeSeriesEndpoints::new(self.quote.clone())
  }

  /// Get access to the reference ticker metadata endpoint
  pub fn reference(&self) -> ReferenceEndpoints {
    ReferenceEndpoints::new(self.reference.clone())
  }
}
