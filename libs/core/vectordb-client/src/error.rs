use std::time::Duration;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while opening or using a vector database session
#[derive(Error, Debug)]
pub enum ClientError {
  /// Address could not be turned into an http(s) URL
  #[error("Invalid URI: {0}")]
  InvalidUri(String),

  /// TCP/TLS connection could not be established
  #[error("Connection failed: {0}")]
  ConnectionFailed(#[source] reqwest::Error),

  /// Handshake did not complete before the connect deadline
  #[error("Connection timeout after {0:?}")]
  ConnectionTimeout(Duration),

  /// An individual request exceeded the request timeout
  #[error("Request timed out: {0}")]
  RequestTimeout(#[source] reqwest::Error),

  #[error("HTTP transport error: {0}")]
  Http(#[source] reqwest::Error),

  /// Server answered with a non-2xx HTTP status
  #[error("Unexpected HTTP status {status}: {message}")]
  Status { status: u16, message: String },

  /// Server answered 2xx but the envelope carried a non-zero code
  #[error("Server error {code}: {message}")]
  Api { code: i64, message: String },

  #[error("Failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  /// Invalid configuration
  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),

  /// Retry layer gave up
  #[error("Maximum retries ({attempts}) exceeded: {last}")]
  MaxRetriesExceeded {
    attempts: u32,
    #[source]
    last: Box<ClientError>,
  },
}

impl ClientError {
  /// Whether retrying the same call could plausibly succeed.
  ///
  /// Used by the retry layer; the session itself never retries.
  pub fn is_transient(&self) -> bool {
    match self {
      ClientError::ConnectionFailed(_)
      | ClientError::ConnectionTimeout(_)
      | ClientError::RequestTimeout(_) => true,
      ClientError::Status { status, .. } => *status == 429 || *status >= 500,
      _ => false,
    }
  }
}

impl From<reqwest::Error> for ClientError {
  fn from(err: reqwest::Error) -> Self {
    if err.is_connect() {
      ClientError::ConnectionFailed(err)
    } else if err.is_timeout() {
      ClientError::RequestTimeout(err)
    } else {
      ClientError::Http(err)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_timeout_is_transient() {
    assert!(ClientError::ConnectionTimeout(Duration::from_secs(10)).is_transient());
  }

  #[test]
  fn test_server_errors_are_transient_client_errors_are_not() {
    let unavailable = ClientError::Status {
      status: 503,
      message: "unavailable".to_string(),
    };
    let throttled = ClientError::Status {
      status: 429,
      message: "slow down".to_string(),
    };
    let bad_request = ClientError::Status {
      status: 400,
      message: "bad".to_string(),
    };
    assert!(unavailable.is_transient());
    assert!(throttled.is_transient());
    assert!(!bad_request.is_transient());
  }

  #[test]
  fn test_api_and_config_errors_are_permanent() {
    let api = ClientError::Api {
      code: 100,
      message: "collection not found".to_string(),
    };
    assert!(!api.is_transient());
    assert!(!ClientError::InvalidUri("::".to_string()).is_transient());
  }

  #[test]
  fn test_display_names_deadline() {
    let err = ClientError::ConnectionTimeout(Duration::from_secs(10));
    assert_eq!(err.to_string(), "Connection timeout after 10s");
  }
}
