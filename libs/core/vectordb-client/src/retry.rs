use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::error::{ClientError, ClientResult};
use crate::session::{Session, SessionConfig, connect_with_config};

/// Exponential backoff settings for [`retry_with_backoff`]
#[derive(Debug, Clone)]
pub struct RetryConfig {
  pub max_retries: u32,
  pub initial_backoff: Duration,
  pub max_backoff: Duration,
  pub multiplier: f64,
  pub jitter: bool,
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      max_retries: 3,
      initial_backoff: Duration::from_millis(200),
      max_backoff: Duration::from_secs(5),
      multiplier: 2.0,
      jitter: true,
    }
  }
}

impl RetryConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_max_retries(mut self, max_retries: u32) -> Self {
    self.max_retries = max_retries;
    self
  }

  pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
    self.initial_backoff = backoff;
    self
  }

  pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
    self.max_backoff = backoff;
    self
  }

  pub fn without_jitter(mut self) -> Self {
    self.jitter = false;
    self
  }

  /// Delay before retry number `attempt` (0-based), before jitter
  pub fn backoff_for(&self, attempt: u32) -> Duration {
    let factor = self.multiplier.max(1.0).powi(attempt as i32);
    let millis = (self.initial_backoff.as_millis() as f64 * factor)
      .min(self.max_backoff.as_millis() as f64);
    Duration::from_millis(millis as u64)
  }

  fn delay_for(&self, attempt: u32) -> Duration {
    let base = self.backoff_for(attempt);
    if !self.jitter || base.is_zero() {
      return base;
    }
    // Jitter in [base/2, base]
    let half = base.as_millis() as u64 / 2;
    let extra = rand::rng().random_range(0..=half);
    Duration::from_millis(half + extra)
  }
}

/// Runs `operation` until it succeeds, fails permanently, or retries run out
///
/// Only errors for which [`ClientError::is_transient`] holds are retried.
pub async fn retry_with_backoff<T, F, Fut>(mut operation: F, config: RetryConfig) -> ClientResult<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = ClientResult<T>>,
{
  let mut attempt = 0;
  loop {
    match operation().await {
      Ok(value) => return Ok(value),
      Err(e) if !e.is_transient() => return Err(e),
      Err(e) if attempt >= config.max_retries => {
        return Err(ClientError::MaxRetriesExceeded {
          attempts: attempt + 1,
          last: Box::new(e),
        });
      }
      Err(e) => {
        let delay = config.delay_for(attempt);
        tracing::warn!(
            target: "vectordb_client",
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            error = %e,
            "Transient failure, retrying"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
      }
    }
  }
}

/// Opens a session, retrying transient handshake failures with backoff
///
/// Each attempt keeps its own fail-fast deadline from `config`.
pub async fn connect_with_retry(
  addr: impl Into<String>,
  config: SessionConfig,
  retry: RetryConfig,
) -> ClientResult<Session> {
  let addr = addr.into();
  retry_with_backoff(
    || {
      let addr = addr.clone();
      let config = config.clone();
      async move { connect_with_config(addr, config).await }
    },
    retry,
  )
  .await
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Arc;
  use std::sync::atomic::{AtomicU32, Ordering};

  #[test]
  fn test_backoff_grows_and_caps() {
    let config = RetryConfig::new()
      .with_initial_backoff(Duration::from_millis(100))
      .with_max_backoff(Duration::from_millis(350));

    assert_eq!(config.backoff_for(0), Duration::from_millis(100));
    assert_eq!(config.backoff_for(1), Duration::from_millis(200));
    assert_eq!(config.backoff_for(2), Duration::from_millis(350));
    assert_eq!(config.backoff_for(10), Duration::from_millis(350));
  }

  #[test]
  fn test_jitter_stays_within_bounds() {
    let config = RetryConfig::new().with_initial_backoff(Duration::from_millis(100));
    for _ in 0..50 {
      let delay = config.delay_for(0);
      assert!(delay >= Duration::from_millis(50) && delay <= Duration::from_millis(100));
    }
  }

  #[tokio::test]
  async fn test_retries_transient_then_succeeds() {
    let calls = Arc::new(AtomicU32::new(0));
    let config = RetryConfig::new()
      .with_initial_backoff(Duration::from_millis(1))
      .without_jitter();

    let counter = calls.clone();
    let result = retry_with_backoff(
      move || {
        let counter = counter.clone();
        async move {
          if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(ClientError::ConnectionTimeout(Duration::from_millis(1)))
          } else {
            Ok(42)
          }
        }
      },
      config,
    )
    .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn test_permanent_error_is_not_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let result: ClientResult<()> = retry_with_backoff(
      move || {
        let counter = counter.clone();
        async move {
          counter.fetch_add(1, Ordering::SeqCst);
          Err(ClientError::Api {
            code: 1800,
            message: "user hasn't authenticated".to_string(),
          })
        }
      },
      RetryConfig::new(),
    )
    .await;

    assert!(matches!(result, Err(ClientError::Api { code: 1800, .. })));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_gives_up_after_max_retries() {
    let config = RetryConfig::new()
      .with_max_retries(2)
      .with_initial_backoff(Duration::from_millis(1))
      .without_jitter();

    let result: ClientResult<()> = retry_with_backoff(
      || async { Err(ClientError::ConnectionTimeout(Duration::from_millis(1))) },
      config,
    )
    .await;

    match result {
      Err(ClientError::MaxRetriesExceeded { attempts, last }) => {
        assert_eq!(attempts, 3);
        assert!(matches!(*last, ClientError::ConnectionTimeout(_)));
      }
      other => panic!("expected MaxRetriesExceeded, got {:?}", other),
    }
  }
}
