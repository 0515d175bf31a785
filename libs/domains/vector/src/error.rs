use std::time::Duration;

use strum::Display;
use thiserror::Error;
use vectordb_client::ClientError;

/// Milvus status codes that map onto a specific kind
mod codes {
    pub const RATE_LIMIT: i64 = 8;
    pub const QUOTA_EXCEEDED: i64 = 9;
    pub const COLLECTION_NOT_FOUND: i64 = 100;
    pub const COLLECTION_NUM_LIMIT: i64 = 102;
    pub const PARAMETER_INVALID: i64 = 1100;
    pub const INDEX_NOT_FOUND: i64 = 700;
}

/// Classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum VectorErrorKind {
    ConnectionTimeout,
    OperationTimeout,
    RemoteUnavailable,
    SchemaConflict,
    SchemaInvalid,
    NotFound,
    ResourceExhausted,
    Validation,
    Remote,
    Config,
    Internal,
}

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Connection to vector database timed out after {0:?}")]
    ConnectionTimeout(Duration),

    #[error("{operation} on '{target}' did not complete within {timeout:?}")]
    OperationTimeout {
        operation: String,
        target: String,
        timeout: Duration,
    },

    #[error("Vector database unavailable during {operation}: {source}")]
    RemoteUnavailable {
        operation: String,
        #[source]
        source: ClientError,
    },

    #[error("Schema conflict: {0}")]
    SchemaConflict(String),

    #[error("Invalid schema: {0}")]
    SchemaInvalid(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Resource exhausted during {operation}: {message}")]
    ResourceExhausted { operation: String, message: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{operation} failed: {source}")]
    Remote {
        operation: String,
        #[source]
        source: ClientError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type VectorResult<T> = Result<T, VectorError>;

impl VectorError {
    pub fn kind(&self) -> VectorErrorKind {
        match self {
            VectorError::ConnectionTimeout(_) => VectorErrorKind::ConnectionTimeout,
            VectorError::OperationTimeout { .. } => VectorErrorKind::OperationTimeout,
            VectorError::RemoteUnavailable { .. } => VectorErrorKind::RemoteUnavailable,
            VectorError::SchemaConflict(_) => VectorErrorKind::SchemaConflict,
            VectorError::SchemaInvalid(_) => VectorErrorKind::SchemaInvalid,
            VectorError::NotFound(_) => VectorErrorKind::NotFound,
            VectorError::ResourceExhausted { .. } => VectorErrorKind::ResourceExhausted,
            VectorError::Validation(_) => VectorErrorKind::Validation,
            VectorError::Remote { .. } => VectorErrorKind::Remote,
            VectorError::Config(_) => VectorErrorKind::Config,
            VectorError::Internal(_) => VectorErrorKind::Internal,
        }
    }

    /// Classifies a client failure raised while running `operation`.
    pub fn from_client(operation: &str, err: ClientError) -> Self {
        let operation = operation.to_string();
        match err {
            ClientError::ConnectionTimeout(d) => VectorError::ConnectionTimeout(d),
            ClientError::InvalidUri(msg) | ClientError::InvalidConfig(msg) => VectorError::Config(msg),
            ClientError::Status { status: 429, message } => {
                VectorError::ResourceExhausted { operation, message }
            }
            ClientError::Api { code, message } => match code {
                codes::COLLECTION_NOT_FOUND | codes::INDEX_NOT_FOUND => VectorError::NotFound(message),
                codes::RATE_LIMIT | codes::QUOTA_EXCEEDED | codes::COLLECTION_NUM_LIMIT => {
                    VectorError::ResourceExhausted { operation, message }
                }
                codes::PARAMETER_INVALID => VectorError::Validation(message),
                // Milvus reports duplicates under a generic code; only the text tells them apart
                _ if message.contains("already exist") => VectorError::SchemaConflict(message),
                _ => VectorError::Remote {
                    operation,
                    source: ClientError::Api { code, message },
                },
            },
            other @ ClientError::MaxRetriesExceeded { .. } => VectorError::RemoteUnavailable {
                operation,
                source: other,
            },
            other if other.is_transient() => VectorError::RemoteUnavailable {
                operation,
                source: other,
            },
            other => VectorError::Remote {
                operation,
                source: other,
            },
        }
    }

    /// Whether the target simply does not exist
    pub fn is_not_found(&self) -> bool {
        self.kind() == VectorErrorKind::NotFound
    }
}

/// Attaches the operation name to a client result
pub(crate) trait ClientResultExt<T> {
    fn during(self, operation: &str) -> VectorResult<T>;
}

impl<T> ClientResultExt<T> for Result<T, ClientError> {
    fn during(self, operation: &str) -> VectorResult<T> {
        self.map_err(|e| VectorError::from_client(operation, e))
    }
}
