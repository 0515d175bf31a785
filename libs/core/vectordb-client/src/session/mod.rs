pub mod config;

pub use config::SessionConfig;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Path used as the handshake: cheap, authenticated, and touches the catalog.
pub const HANDSHAKE_PATH: &str = "/v2/vectordb/collections/list";

/// Response envelope shared by every Milvus REST v2 endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
  code: i64,
  #[serde(default)]
  data: serde_json::Value,
  #[serde(default)]
  message: Option<String>,
}

/// An open session against the vector database.
///
/// Holds a pooled HTTP client and the resolved base URL. Cloning is cheap and
/// shares the pool. Owned by the caller for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Session {
  http: reqwest::Client,
  base_url: String,
  config: SessionConfig,
}

impl Session {
  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn database(&self) -> &str {
    &self.config.database
  }

  pub fn config(&self) -> &SessionConfig {
    &self.config
  }

  /// POST `body` to `path` and decode the envelope's `data` into `T`.
  ///
  /// A missing `data` member decodes as JSON `null`, so `T` may be `()`,
  /// `Option<_>` or `serde_json::Value` for endpoints that return nothing.
  pub async fn post<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
  where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
  {
    let url = format!("{}{}", self.base_url, path);
    tracing::trace!(target: "vectordb_client", %url, "POST");

    let response = self.http.post(&url).json(body).send().await?;
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
      let message = String::from_utf8_lossy(&bytes).into_owned();
      tracing::debug!(
          target: "vectordb_client",
          %url,
          status = status.as_u16(),
          "Non-success HTTP status"
      );
      return Err(ClientError::Status {
        status: status.as_u16(),
        message,
      });
    }

    let envelope: Envelope = serde_json::from_slice(&bytes)?;
    if envelope.code != 0 && envelope.code != 200 {
      return Err(ClientError::Api {
        code: envelope.code,
        message: envelope
          .message
          .unwrap_or_else(|| "Unknown error".to_string()),
      });
    }

    Ok(serde_json::from_value(envelope.data)?)
  }

  /// Round-trip that proves the server is up and accepts our credentials
  pub async fn handshake(&self) -> ClientResult<()> {
    let body = serde_json::json!({ "dbName": self.config.database });
    let _: serde_json::Value = self.post(HANDSHAKE_PATH, &body).await?;
    Ok(())
  }

  /// Release the session. Pooled connections close when the last clone drops.
  pub fn close(self) {
    tracing::info!(target: "vectordb_client", base_url = %self.base_url, "Closing vector database session");
  }
}

/// Opens a session with default configuration (10s handshake deadline)
///
/// ## Example
/// ```ignore
/// use vectordb_client::connect;
///
/// let session = connect("localhost:19530").await?;
/// ```
pub async fn connect(addr: impl Into<String>) -> ClientResult<Session> {
  connect_with_config(addr, SessionConfig::default()).await
}

/// Creates a session without contacting the server
///
/// The first request made through the session is the first network I/O.
/// Useful when the server is started after this process, or in tests.
pub fn connect_lazy(addr: impl Into<String>, config: SessionConfig) -> ClientResult<Session> {
  let addr_string = addr.into();
  config.validate()?;

  let base_url = normalize_address(&addr_string).inspect_err(|e| {
    tracing::error!(target: "vectordb_client", addr = %addr_string, error = %e, "Invalid URI");
  })?;

  let http = config.build_http_client()?;

  tracing::debug!(
      target: "vectordb_client",
      addr = %base_url,
      "Creating lazy vector database session (connects on first request)"
  );

  Ok(Session {
    http,
    base_url,
    config,
  })
}

/// Opens a session, failing fast if the server does not answer in time
///
/// The handshake and the deadline race; whichever finishes first decides the
/// outcome and the loser is dropped. There is no retry here: a handshake
/// error is returned as-is, and an expired deadline becomes
/// [`ClientError::ConnectionTimeout`]. Layer [`crate::connect_with_retry`] on top
/// when the server may still be starting.
///
/// ## Example
/// ```ignore
/// use vectordb_client::{connect_with_config, SessionConfig};
/// use std::time::Duration;
///
/// let config = SessionConfig::default()
///     .with_connect_timeout(Duration::from_secs(2))
///     .with_token("root:Milvus");
///
/// let session = connect_with_config("http://localhost:19530", config).await?;
/// ```
pub async fn connect_with_config(
  addr: impl Into<String>,
  config: SessionConfig,
) -> ClientResult<Session> {
  let session = connect_lazy(addr, config)?;
  let deadline = session.config.connect_timeout;

  tracing::info!(
      target: "vectordb_client",
      addr = %session.base_url,
      deadline_ms = deadline.as_millis() as u64,
      "Connecting to vector database"
  );

  match tokio::time::timeout(deadline, session.handshake()).await {
    Ok(Ok(())) => {
      tracing::info!(target: "vectordb_client", addr = %session.base_url, "Connected to vector database");
      Ok(session)
    }
    Ok(Err(e)) => {
      tracing::error!(
          target: "vectordb_client",
          addr = %session.base_url,
          error = %e,
          "Failed to connect to vector database"
      );
      Err(e)
    }
    Err(_) => {
      tracing::error!(
          target: "vectordb_client",
          addr = %session.base_url,
          "Vector database did not answer within {:?}; is the server running?",
          deadline
      );
      Err(ClientError::ConnectionTimeout(deadline))
    }
  }
}

/// Turns `host:port` or a full URL into a base URL without a trailing slash
fn normalize_address(addr: &str) -> ClientResult<String> {
  let trimmed = addr.trim();
  if trimmed.is_empty() {
    return Err(ClientError::InvalidUri("address is empty".to_string()));
  }

  let candidate = if trimmed.contains("://") {
    trimmed.to_string()
  } else {
    format!("http://{}", trimmed)
  };

  let url = reqwest::Url::parse(&candidate)
    .map_err(|e| ClientError::InvalidUri(format!("{}: {}", trimmed, e)))?;

  if !matches!(url.scheme(), "http" | "https") {
    return Err(ClientError::InvalidUri(format!(
      "{}: unsupported scheme '{}'",
      trimmed,
      url.scheme()
    )));
  }
  if url.host_str().is_none() {
    return Err(ClientError::InvalidUri(format!("{}: missing host", trimmed)));
  }

  Ok(candidate.trim_end_matches('/').to_string())
}
