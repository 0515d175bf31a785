//! # Vector Database Client Library
//!
//! Session management for the Milvus REST v2 surface: address resolution,
//! bearer-token auth, pooled HTTP transport and the response envelope.
//!
//! The one piece of non-trivial behaviour here is [`connect_with_config`]: the
//! handshake races a hard deadline, so a process pointed at a server that is
//! down (or a port that accepts TCP but never answers) fails within the
//! configured window instead of hanging.
//!
//! ## Quick Start
//!
//! ```ignore
//! use vectordb_client::{connect_with_config, SessionConfig};
//! use std::time::Duration;
//!
//! let config = SessionConfig::default().with_connect_timeout(Duration::from_secs(10));
//! let session = connect_with_config("localhost:19530", config).await?;
//! let names: Vec<String> = session
//!     .post("/v2/vectordb/collections/list", &serde_json::json!({}))
//!     .await?;
//! ```
//!
//! ### With Retry
//! ```ignore
//! use vectordb_client::{connect_with_retry, RetryConfig, SessionConfig};
//!
//! let retry = RetryConfig::new().with_max_retries(5);
//! let session = connect_with_retry("localhost:19530", SessionConfig::default(), retry).await?;
//! ```

pub mod error;
pub mod retry;
pub mod session;

pub use error::{ClientError, ClientResult};
pub use retry::{RetryConfig, connect_with_retry, retry_with_backoff};
pub use session::{
  HANDSHAKE_PATH, Session, SessionConfig, connect, connect_lazy, connect_with_config,
};
