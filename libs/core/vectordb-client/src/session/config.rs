use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::{ClientError, ClientResult};

/// Configuration for opening a vector database session
///
/// Provides builder pattern for customizing deadlines, credentials and the
/// underlying HTTP connection pool. The defaults assume a co-located server
/// (docker-compose or a sidecar) where a 10s handshake is already generous.
#[derive(Debug, Clone)]
pub struct SessionConfig {
  // Deadlines
  pub connect_timeout: Duration,
  pub request_timeout: Duration,

  // Credentials / routing
  pub token: Option<String>,
  pub database: String,

  // TCP settings
  pub tcp_nodelay: bool,
  pub tcp_keepalive: Option<Duration>,
  pub pool_idle_timeout: Option<Duration>,
}

impl Default for SessionConfig {
  fn default() -> Self {
    Self {
      connect_timeout: Duration::from_secs(10),
      request_timeout: Duration::from_secs(30),
      token: None,
      database: "default".to_string(),
      tcp_nodelay: true,
      tcp_keepalive: Some(Duration::from_secs(30)),
      pool_idle_timeout: Some(Duration::from_secs(90)),
    }
  }
}

impl SessionConfig {
  /// Create a new configuration with defaults
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the deadline for the initial handshake
  ///
  /// # Example
  /// ```ignore
  /// let config = SessionConfig::new()
  ///     .with_connect_timeout(Duration::from_secs(2));
  /// ```
  pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
    self.connect_timeout = timeout;
    self
  }

  /// Set the timeout for individual requests after the session is open
  ///
  /// `Duration::ZERO` disables the per-request deadline.
  pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
    self.request_timeout = timeout;
    self
  }

  /// Authenticate with a bearer token (`user:password` or an API key)
  pub fn with_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  /// Target a database other than `default`
  pub fn with_database(mut self, database: impl Into<String>) -> Self {
    self.database = database.into();
    self
  }

  /// Check values that would make every request fail
  pub fn validate(&self) -> ClientResult<()> {
    if self.connect_timeout.is_zero() {
      return Err(ClientError::InvalidConfig(
        "connect_timeout must be greater than zero".to_string(),
      ));
    }
    if self.database.trim().is_empty() {
      return Err(ClientError::InvalidConfig(
        "database name must not be empty".to_string(),
      ));
    }
    Ok(())
  }

  /// Build the pooled HTTP client this configuration describes
  pub(crate) fn build_http_client(&self) -> ClientResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Some(token) = &self.token {
      let value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ClientError::InvalidConfig(format!("invalid token: {}", e)))?;
      headers.insert(AUTHORIZATION, value);
    }

    let mut builder = reqwest::Client::builder()
      .default_headers(headers)
      .connect_timeout(self.connect_timeout)
      .tcp_nodelay(self.tcp_nodelay)
      .tcp_keepalive(self.tcp_keepalive)
      .pool_idle_timeout(self.pool_idle_timeout);

    if !self.request_timeout.is_zero() {
      builder = builder.timeout(self.request_timeout);
    }

    builder
      .build()
      .map_err(|e| ClientError::InvalidConfig(format!("failed to build HTTP client: {}", e)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_config() {
    let config = SessionConfig::default();
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.database, "default");
    assert!(config.token.is_none());
    assert!(config.tcp_nodelay);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_builder_pattern() {
    let config = SessionConfig::new()
      .with_connect_timeout(Duration::from_secs(2))
      .with_request_timeout(Duration::from_secs(120))
      .with_token("root:Milvus")
      .with_database("words");

    assert_eq!(config.connect_timeout, Duration::from_secs(2));
    assert_eq!(config.request_timeout, Duration::from_secs(120));
    assert_eq!(config.token.as_deref(), Some("root:Milvus"));
    assert_eq!(config.database, "words");
  }

  #[test]
  fn test_zero_connect_timeout_is_invalid() {
    let config = SessionConfig::new().with_connect_timeout(Duration::ZERO);
    assert!(matches!(config.validate(), Err(ClientError::InvalidConfig(_))));
  }

  #[test]
  fn test_blank_database_is_invalid() {
    let config = SessionConfig::new().with_database("  ");
    assert!(matches!(config.validate(), Err(ClientError::InvalidConfig(_))));
  }

  #[test]
  fn test_token_with_newline_is_rejected() {
    let config = SessionConfig::new().with_token("bad\ntoken");
    assert!(matches!(
      config.build_http_client(),
      Err(ClientError::InvalidConfig(_))
    ));
  }
}
