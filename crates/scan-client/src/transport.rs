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

//! HTTP transport shared by the quote and reference-data endpoints

use reqwest::{Client, Response, StatusCode};
use scan_core::{Error, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Longest pause between two attempts
const MAX_RETRY_DELAY: Duration = Duration::from_secs(300);

/// How the API key is attached to each request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyParam {
  /// `apikey=` (Twelve Data)
  ApiKey,
  /// `api_key=` (Nasdaq Data Link)
  ApiUnderscoreKey,
}

impl KeyParam {
  fn name(&self) -> &'static str {
    match self {
      KeyParam::ApiKey => "apikey",
      KeyParam::ApiUnderscoreKey => "api_key",
    }
  }
}

/// HTTP transport for one upstream API
pub struct Transport {
  client: Client,
  base_url: String,
  api_key: String,
  key_param: KeyParam,
  max_retries: u32,
}

impl Transport {
  /// Create a new transport instance
  pub fn new(
    base_url: &str,
    api_key: &str,
    key_param: KeyParam,
    timeout_secs: u64,
    max_retries: u32,
  ) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(timeout_secs))
      .user_agent("scan-client/0.1.0")
      .build()
      .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key: api_key.to_string(),
      key_param,
      max_retries,
    })
  }

  /// Create a mock transport for testing
  #[cfg(test)]
  pub fn new_mock(key_param: KeyParam) -> Self {
    Self {
      client: Client::new(),
      base_url: "https://mock.example.com".to_string(),
      api_key: "test_key".to_string(),
      key_param,
      max_retries: 0,
    }
  }

  /// GET `{base}/{path}` with the given query parameters and decode the body.
  ///
  /// Connection failures and non-success statuses are retried up to
  /// `max_retries` times with exponential backoff. A body that arrives but
  /// cannot be decoded is never retried.
  #[instrument(skip(self, params), fields(path = %path))]
  pub async fn get<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T>
  where
    T: DeserializeOwned,
  {
    let url = self.build_url(path, params)?;

    let mut attempt = 0;
    let mut last_error = None;

    while attempt <= self.max_retries {
      if attempt > 0 {
        let delay = retry_delay(attempt);
        warn!(
          "Retrying request in {}ms (attempt {} of {})",
          delay.as_millis(),
          attempt + 1,
          self.max_retries + 1
        );
        tokio::time::sleep(delay).await;
      }

      match self.make_request(&url).await {
        Ok(response) => {
          let text = response
            .text()
            .await
            .map_err(|e| Error::Http(format!("Failed to read response body: {}", e)))?;

          debug!("Response body length: {} bytes", text.len());

          self.check_api_error(&text)?;

          return serde_json::from_str::<T>(&text).map_err(|e| {
            error!("Failed to parse JSON response: {}", e);
            Error::Parse(format!(
              "Failed to parse response: {}. Response: {}",
              e,
              truncate(&text, 200)
            ))
          });
        }
        Err(e) => {
          warn!("Request failed (attempt {}): {}", attempt + 1, e);
          last_error = Some(e);
          attempt += 1;
        }
      }
    }

    Err(last_error.unwrap_or_else(|| Error::Http("Max retries exceeded".to_string())))
  }

  /// Build the full URL for an API request. The key is appended last.
  fn build_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/{}", self.base_url, path.trim_start_matches('/')))
      .map_err(|e| Error::Http(format!("Invalid base URL: {}", e)))?;

    {
      let mut query_pairs = url.query_pairs_mut();
      for (key, value) in params {
        query_pairs.append_pair(key, value);
      }
      query_pairs.append_pair(self.key_param.name(), &self.api_key);
    }

    Ok(url)
  }

  async fn make_request(&self, url: &Url) -> Result<Response> {
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

    let status = response.status();
    if status.is_success() {
      debug!("Request successful with status: {}", status);
      Ok(response)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
      warn!("Provider rejected request: {}", status);
      Err(Error::RateLimit(format!("HTTP {}", status)))
    } else {
      error!("Request failed with status: {}", status);
      Err(Error::Http(format!("HTTP error: {}", status)))
    }
  }

  /// Errors that arrive with a 200 status
  fn check_api_error(&self, response_text: &str) -> Result<()> {
    if !response_text.contains("quandl_error") {
      return Ok(());
    }

    let parsed: serde_json::Value = serde_json::from_str(response_text)?;
    if let Some(err) = parsed.get("quandl_error") {
      let code = err.get("code").and_then(|c| c.as_str()).unwrap_or("unknown");
      let message = err.get("message").and_then(|m| m.as_str()).unwrap_or("");
      if code.starts_with("QEAx") || code.starts_with("QEPx") {
        return Err(Error::ApiKey(format!("{}: {}", code, message)));
      }
      if code.starts_with("QELx") {
        return Err(Error::RateLimit(format!("{}: {}", code, message)));
      }
      return Err(Error::Api(format!("{}: {}", code, message)));
    }
    Ok(())
  }

  /// Get the base URL being used
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn max_retries(&self) -> u32 {
    self.max_retries
  }
}

/// Exponential backoff, 2^attempt seconds, capped at `MAX_RETRY_DELAY`
fn retry_delay(attempt: u32) -> Duration {
  Duration::from_secs(2_u64.saturating_pow(attempt)).min(MAX_RETRY_DELAY)
}

fn truncate(text: &str, max: usize) -> &str {
  match text.char_indices().nth(max) {
    Some((idx, _)) => &text[..idx],
    None => text,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_build_url_quote() {
    let transport = Transport::new_mock(KeyParam::ApiKey);
    let params = [("symbol", "AAPL".to_string()), ("interval", "5min".to_string())];

    let url = transport.build_url("time_series", &params).unwrap().to_string();

    assert!(url.starts_with("https://mock.example.com/time_series?"));
    assert!(url.contains("symbol=AAPL"));
    assert!(url.contains("interval=5min"));
    assert!(url.ends_with("apikey=test_key"));
  }

  #[test]
  fn test_build_url_reference() {
    let transport = Transport::new_mock(KeyParam::ApiUnderscoreKey);
    let url =
      transport.build_url("/datatables/SHARADAR/TICKERS.json", &[]).unwrap().to_string();

    assert_eq!(
      url,
      "https://mock.example.com/datatables/SHARADAR/TICKERS.json?api_key=test_key"
    );
  }

  #[test]
  fn test_check_api_error_quandl() {
    let transport = Transport::new_mock(KeyParam::ApiUnderscoreKey);

    let body = r#"{"quandl_error": {"code": "QECx02", "message": "You have submitted an incorrect Quandl code."}}"#;
    assert!(matches!(transport.check_api_error(body), Err(Error::Api(_))));

    let body = r#"{"quandl_error": {"code": "QEAx01", "message": "We could not recognize your API key"}}"#;
    assert!(matches!(transport.check_api_error(body), Err(Error::ApiKey(_))));

    let body = r#"{"quandl_error": {"code": "QELx01", "message": "You have exceeded the API speed limit"}}"#;
    assert!(matches!(transport.check_api_error(body), Err(Error::RateLimit(_))));
  }

  #[test]
  fn test_check_api_error_success() {
    let transport = Transport::new_mock(KeyParam::ApiKey);
    assert!(transport.check_api_error(r#"{"values": [], "status": "ok"}"#).is_ok());
  }

  #[test]
  fn test_retry_delay_is_capped() {
    assert_eq!(retry_delay(1), Duration::from_secs(2));
    assert_eq!(retry_delay(3), Duration::from_secs(8));
    assert_eq!(retry_delay(64), MAX_RETRY_DELAY);
    assert_eq!(retry_delay(u32::MAX), MAX_RETRY_DELAY);
  }

  #[test]
  fn test_truncate_respects_char_boundaries() {
    assert_eq!(truncate("héllo", 2), "hé");
    assert_eq!(truncate("abc", 10), "abc");
  }
}
