use crate::{env_or_default, ConfigError, FromEnv};
use std::fmt::Display;
use std::str::FromStr;

/// What the top-level boundary does with an error from the vector database.
///
/// `FailFast` mirrors the historical behaviour of stopping the process on the
/// first remote failure. `Propagate` hands the error back to the caller so it can
/// retry, degrade or report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    #[default]
    FailFast,
    Propagate,
}

impl FailurePolicy {
    pub fn is_fail_fast(&self) -> bool {
        matches!(self, FailurePolicy::FailFast)
    }

    /// Apply the policy to the outcome of `operation`.
    ///
    /// Under `FailFast` an error is logged with the operation name and the process
    /// exits with status 1. Under `Propagate` the result is returned untouched.
    pub fn enforce<T, E: Display>(&self, operation: &str, result: Result<T, E>) -> Result<T, E> {
        match (self, result) {
            (_, Ok(value)) => Ok(value),
            (FailurePolicy::FailFast, Err(err)) => {
                tracing::error!(operation, error = %err, "fatal vector database failure");
                std::process::exit(1);
            }
            (FailurePolicy::Propagate, Err(err)) => Err(err),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail-fast" | "fail_fast" | "failfast" | "abort" => Ok(FailurePolicy::FailFast),
            "propagate" | "return" => Ok(FailurePolicy::Propagate),
            other => Err(format!("unknown failure policy '{}'", other)),
        }
    }
}

impl FromEnv for FailurePolicy {
    /// Reads VECTORDB_FAILURE_POLICY (`fail-fast` | `propagate`), defaulting to fail-fast
    fn from_env() -> Result<Self, ConfigError> {
        env_or_default("VECTORDB_FAILURE_POLICY", "fail-fast")
            .parse()
            .map_err(|details| ConfigError::ParseError {
                key: "VECTORDB_FAILURE_POLICY".to_string(),
                details,
            })
    }
}
