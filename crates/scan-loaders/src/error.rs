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

use scan_database_sqlite::RepositoryError;
use thiserror::Error;

/// Pass-level errors. Any of these aborts the current pass; the scan loop
/// logs it, backs off and continues.
#[derive(Error, Debug, Clone)]
pub enum LoaderError {
  #[error("API error: {0}")]
  ApiError(String),

  #[error("Database error: {0}")]
  DatabaseError(String),

  #[error("Universe refresh failed: {0}")]
  UniverseRefreshError(String),

  #[error("Invalid data: {0}")]
  InvalidData(String),

  #[error("Configuration error: {0}")]
  ConfigurationError(String),
}

impl From<scan_core::Error> for LoaderError {
  fn from(err: scan_core::Error) -> Self {
    LoaderError::ApiError(err.to_string())
  }
}

impl From<RepositoryError> for LoaderError {
  fn from(err: RepositoryError) -> Self {
    LoaderError::DatabaseError(err.to_string())
  }
}

pub type LoaderResult<T> = Result<T, LoaderError>;

/// Why a ticker produced no signal even though the provider answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
  /// First request returned no usable bars
  NoIntradayBars,
  /// Look-back request returned no usable bars
  NoLookbackBars,
  /// Session low was zero or negative
  NonPositiveLow,
  /// Look-back window traded no volume
  ZeroLookbackVolume,
}

impl std::fmt::Display for EmptyReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let text = match self {
      EmptyReason::NoIntradayBars => "no intraday bars",
      EmptyReason::NoLookbackBars => "no look-back bars",
      EmptyReason::NonPositiveLow => "session low is not positive",
      EmptyReason::ZeroLookbackVolume => "look-back volume is zero",
    };
    f.write_str(text)
  }
}

/// Per-ticker fetch failure. Never aborts a batch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
  #[error("empty data ({reason}) after {requests_consumed} request(s)")]
  EmptyData { requests_consumed: u32, reason: EmptyReason },

  #[error("transport error: {0}")]
  TransportError(String),
}

impl FetchError {
  /// Quota units charged for this failure
  pub fn requests_consumed(&self) -> u32 {
    match self {
      FetchError::EmptyData { requests_consumed, .. } => *requests_consumed,
      FetchError::TransportError(_) => 0,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_loader_error_display() {
    let err = LoaderError::UniverseRefreshError("HTTP error: 503".to_string());
    assert_eq!(err.to_string(), "Universe refresh failed: HTTP error: 503");
  }

  #[test]
  fn test_loader_error_from_core_error() {
    let err = LoaderError::from(scan_core::Error::Http("timeout".to_string()));
    assert!(matches!(err, LoaderError::ApiError(_)));
    assert!(err.to_string().contains("timeout"));
  }

  #[test]
  fn test_loader_error_from_repository_error() {
    let err = LoaderError::from(RepositoryError::TransactionError("locked".to_string()));
    assert!(matches!(err, LoaderError::DatabaseError(_)));
  }

  #[test]
  fn test_fetch_error_request_accounting() {
    let first =
      FetchError::EmptyData { requests_consumed: 1, reason: EmptyReason::NoIntradayBars };
    let second = FetchError::EmptyData { requests_consumed: 2, reason: EmptyReason::NonPositiveLow };
    let transport = FetchError::TransportError("connection reset".to_string());

    assert_eq!(first.requests_consumed(), 1);
    assert_eq!(second.requests_consumed(), 2);
    assert_eq!(transport.requests_consumed(), 0);
  }

  #[test]
  fn test_fetch_error_display() {
    let err = FetchError::EmptyData { requests_consumed: 2, reason: EmptyReason::NoLookbackBars };
    assert_eq!(err.to_string(), "empty data (no look-back bars) after 2 request(s)");
  }
}
