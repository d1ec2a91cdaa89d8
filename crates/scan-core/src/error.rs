use thiserror::Error;

/// The main error type for scan-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Environment variable error
  #[error("Environment variable error: {0}")]
  EnvVar(#[from] std::env::VarError),

  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),

  /// API key error
  #[error("Failed to retrieve API key: {0}")]
  ApiKey(String),

  /// Serialization/Deserialization error
  #[error("Serialization error: {0}")]
  Serde(#[from] serde_json::Error),

  /// Date/Time parsing error
  #[error("Date parsing error")]
  ParseDate(#[from] chrono::ParseError),

  /// Missing required field in response
  #[error("Missing required field: {0}")]
  MissingField(String),

  /// Provider refused the call because the quota is spent
  #[error("Rate limit exceeded: {0}")]
  RateLimit(String),

  /// Invalid response from API
  #[error("Invalid API response: {0}")]
  InvalidResponse(String),

  /// HTTP transport error
  #[error("HTTP error: {0}")]
  Http(String),

  /// Error reported in the body of an API response
  #[error("API error: {0}")]
  Api(String),

  /// Parse error for data processing
  #[error("Parse error: {0}")]
  Parse(String),
}

/// Result type alias for scan-* crates
pub type Result<T> = std::result::Result<T, Error>;
