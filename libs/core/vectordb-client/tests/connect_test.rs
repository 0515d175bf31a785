//! Connection establishment tests
//!
//! These run against sockets owned by the test:
//! - a listener that accepts TCP but never answers (hung server)
//! - a closed port (server down)
//! - a small axum app speaking the REST envelope (healthy / rejecting server)

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{Json, Router, routing::post};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use vectordb_client::{
  ClientError, HANDSHAKE_PATH, RetryConfig, SessionConfig, connect_with_config, connect_with_retry,
};

async fn spawn_app(router: Router) -> SocketAddr {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, router).await.unwrap();
  });
  addr
}

/// Accepts connections and holds them open without ever writing a byte
async fn spawn_silent_listener() -> SocketAddr {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    let mut held = Vec::new();
    while let Ok((socket, _)) = listener.accept().await {
      held.push(socket);
    }
  });
  addr
}

fn short_deadline() -> SessionConfig {
  SessionConfig::default()
    .with_connect_timeout(Duration::from_millis(300))
    .with_request_timeout(Duration::from_secs(30))
}

#[tokio::test]
async fn test_hung_server_times_out_within_deadline() {
  let addr = spawn_silent_listener().await;
  let started = Instant::now();

  let result = connect_with_config(addr.to_string(), short_deadline()).await;

  let elapsed = started.elapsed();
  match result {
    Err(ClientError::ConnectionTimeout(deadline)) => {
      assert_eq!(deadline, Duration::from_millis(300));
    }
    other => panic!("expected ConnectionTimeout, got {:?}", other),
  }
  assert!(
    elapsed < Duration::from_secs(3),
    "connect should give up near its deadline, took {:?}",
    elapsed
  );
}

#[tokio::test]
async fn test_closed_port_fails_without_hanging() {
  let addr = {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
  };
  let started = Instant::now();

  let result = connect_with_config(addr.to_string(), short_deadline()).await;

  assert!(result.is_err());
  assert!(matches!(
    result.unwrap_err(),
    ClientError::ConnectionFailed(_) | ClientError::ConnectionTimeout(_)
  ));
  assert!(started.elapsed() < Duration::from_secs(3));
}

#[tokio::test]
async fn test_healthy_server_returns_session() {
  let router = Router::new().route(
    HANDSHAKE_PATH,
    post(|Json(body): Json<Value>| async move {
      assert_eq!(body["dbName"], "default");
      Json(json!({ "code": 0, "data": ["words", "books"] }))
    }),
  );
  let addr = spawn_app(router).await;

  let session = connect_with_config(format!("http://{}", addr), short_deadline())
    .await
    .unwrap();

  assert_eq!(session.base_url(), format!("http://{}", addr));
  let names: Vec<String> = session
    .post(HANDSHAKE_PATH, &json!({ "dbName": "default" }))
    .await
    .unwrap();
  assert_eq!(names, vec!["words".to_string(), "books".to_string()]);
  session.close();
}

#[tokio::test]
async fn test_handshake_error_is_surfaced_immediately() {
  let router = Router::new().route(
    HANDSHAKE_PATH,
    post(|| async {
      Json(json!({ "code": 1800, "message": "user hasn't authenticated" }))
    }),
  );
  let addr = spawn_app(router).await;

  let result = connect_with_config(addr.to_string(), short_deadline()).await;

  match result {
    Err(ClientError::Api { code, message }) => {
      assert_eq!(code, 1800);
      assert!(message.contains("authenticated"));
    }
    other => panic!("expected Api error, got {:?}", other),
  }
}

#[tokio::test]
async fn test_retry_layer_gives_up_on_hung_server() {
  let addr = spawn_silent_listener().await;
  let config = SessionConfig::default().with_connect_timeout(Duration::from_millis(100));
  let retry = RetryConfig::new()
    .with_max_retries(1)
    .with_initial_backoff(Duration::from_millis(10))
    .without_jitter();

  let result = connect_with_retry(addr.to_string(), config, retry).await;

  match result {
    Err(ClientError::MaxRetriesExceeded { attempts, last }) => {
      assert_eq!(attempts, 2);
      assert!(matches!(*last, ClientError::ConnectionTimeout(_)));
    }
    other => panic!("expected MaxRetriesExceeded, got {:?}", other),
  }
}
