use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or};
use vectordb_client::SessionConfig;

/// Milvus connection configuration
#[derive(Debug, Clone)]
pub struct MilvusConfig {
    pub url: String,
    /// Bearer token, `user:password` or an API key
    pub token: Option<String>,
    pub database: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Upper bound on waiting for an index build or a load to finish
    pub operation_timeout_secs: u64,
}

impl MilvusConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_operation_timeout(mut self, secs: u64) -> Self {
        self.operation_timeout_secs = secs;
        self
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn session_config(&self) -> SessionConfig {
        let config = SessionConfig::new()
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs))
            .with_database(self.database.clone());

        match &self.token {
            Some(token) => config.with_token(token.clone()),
            None => config,
        }
    }
}

impl Default for MilvusConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:19530".to_string(),
            token: None,
            database: "default".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            operation_timeout_secs: 300,
        }
    }
}

impl FromEnv for MilvusConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let token = std::env::var("MILVUS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            url: env_or_default("MILVUS_URL", &defaults.url),
            token,
            database: env_or_default("MILVUS_DB_NAME", &defaults.database),
            connect_timeout_secs: env_parse_or(
                "MILVUS_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            request_timeout_secs: env_parse_or(
                "MILVUS_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            operation_timeout_secs: env_parse_or(
                "MILVUS_OPERATION_TIMEOUT_SECS",
                defaults.operation_timeout_secs,
            )?,
        })
    }
}
