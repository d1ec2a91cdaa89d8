//! Configuration management for the scanner's upstream APIs and store

use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use url::Url;

/// Upper bound accepted for `max_retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Main configuration struct shared by the client, the store and the CLI
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// Twelve Data API key (quote requests)
  pub quote_api_key: String,

  /// Nasdaq Data Link API key (reference ticker metadata)
  pub reference_api_key: String,

  /// Base URL for the Twelve Data API
  pub quote_base_url: String,

  /// Base URL for the Nasdaq Data Link API
  pub reference_base_url: String,

  /// Request timeout in seconds
  pub timeout_secs: u64,

  /// Maximum retries for reference-data requests. Quote requests never retry.
  pub max_retries: u32,

  /// Path of the SQLite database file
  pub database_path: String,
}

impl Config {
  /// Load configuration from environment variables (and `.env` if present)
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let quote_api_key = env::var("TWELVE_DATA_API_KEY")
      .map_err(|_| Error::ApiKey("TWELVE_DATA_API_KEY not set".to_string()))?;

    let reference_api_key = env::var("NASDAQ_DATA_LINK_API_KEY")
      .map_err(|_| Error::ApiKey("NASDAQ_DATA_LINK_API_KEY not set".to_string()))?;

    let timeout_secs = env::var("SCANNER_TIMEOUT_SECS")
      .unwrap_or_else(|_| "30".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid SCANNER_TIMEOUT_SECS".to_string()))?;

    let max_retries = env::var("SCANNER_MAX_RETRIES")
      .unwrap_or_else(|_| "3".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid SCANNER_MAX_RETRIES".to_string()))?;

    let quote_base_url =
      env::var("TWELVE_DATA_BASE_URL").unwrap_or_else(|_| crate::TWELVE_DATA_BASE_URL.to_string());
    let reference_base_url = env::var("NASDAQ_DATA_LINK_BASE_URL")
      .unwrap_or_else(|_| crate::NASDAQ_DATA_LINK_BASE_URL.to_string());

    let database_path =
      env::var("SCANNER_DATABASE").unwrap_or_else(|_| crate::DEFAULT_DATABASE_PATH.to_string());

    let config = Config {
      quote_api_key,
      reference_api_key,
      quote_base_url,
      reference_base_url,
      timeout_secs,
      max_retries,
      database_path,
    };
    config.validate()?;
    Ok(config)
  }

  /// Create a config with default values (for testing)
  pub fn default_with_keys(quote_api_key: String, reference_api_key: String) -> Self {
    Config {
      quote_api_key,
      reference_api_key,
      quote_base_url: crate::TWELVE_DATA_BASE_URL.to_string(),
      reference_base_url: crate::NASDAQ_DATA_LINK_BASE_URL.to_string(),
      timeout_secs: 30,
      max_retries: 3,
      database_path: crate::DEFAULT_DATABASE_PATH.to_string(),
    }
  }

  /// Point both upstream APIs at the same base URL (mock servers in tests)
  pub fn with_base_url(mut self, base_url: &str) -> Self {
    self.quote_base_url = base_url.to_string();
    self.reference_base_url = base_url.to_string();
    self
  }

  /// Check that keys are non-empty and base URLs parse
  pub fn validate(&self) -> Result<()> {
    if self.quote_api_key.trim().is_empty() {
      return Err(Error::ApiKey("TWELVE_DATA_API_KEY is empty".to_string()));
    }
    if self.reference_api_key.trim().is_empty() {
      return Err(Error::ApiKey("NASDAQ_DATA_LINK_API_KEY is empty".to_string()));
    }
    for base in [&self.quote_base_url, &self.reference_base_url] {
      Url::parse(base).map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base, e)))?;
    }
    if self.timeout_secs == 0 {
      return Err(Error::Config("timeout must be at least one second".to_string()));
    }
    if self.max_retries > MAX_RETRIES_LIMIT {
      return Err(Error::Config(format!(
        "SCANNER_MAX_RETRIES must be at most {}, got {}",
        MAX_RETRIES_LIMIT, self.max_retries
      )));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn test_config_from_env() {
    env::set_var("TWELVE_DATA_API_KEY", "td_key");
    env::set_var("NASDAQ_DATA_LINK_API_KEY", "ndl_key");
    env::remove_var("SCANNER_TIMEOUT_SECS");
    env::remove_var("SCANNER_DATABASE");

    let config = Config::from_env().unwrap();
    assert_eq!(config.quote_api_key, "td_key");
    assert_eq!(config.reference_api_key, "ndl_key");
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.database_path, crate::DEFAULT_DATABASE_PATH);
  }

  #[test]
  #[serial]
  fn test_config_invalid_timeout() {
    env::set_var("TWELVE_DATA_API_KEY", "td_key");
    env::set_var("NASDAQ_DATA_LINK_API_KEY", "ndl_key");
    env::set_var("SCANNER_TIMEOUT_SECS", "soon");

    let result = Config::from_env();
    env::remove_var("SCANNER_TIMEOUT_SECS");
    assert!(matches!(result, Err(Error::Config(_))));
  }

  #[test]
  fn test_validate_rejects_bad_url() {
    let config = Config::default_with_keys("a".to_string(), "b".to_string()).with_base_url("not a url");
    assert!(matches!(config.validate(), Err(Error::Config(_))));
  }

  #[test]
  fn test_validate_caps_retries() {
    let mut config = Config::default_with_keys("a".to_string(), "b".to_string());
    config.max_retries = MAX_RETRIES_LIMIT;
    assert!(config.validate().is_ok());

    config.max_retries = 64;
    assert!(matches!(config.validate(), Err(Error::Config(_))));
  }

  #[test]
  fn test_validate_rejects_empty_key() {
    let config = Config::default_with_keys(" ".to_string(), "b".to_string());
    assert!(matches!(config.validate(), Err(Error::ApiKey(_))));
  }
}
