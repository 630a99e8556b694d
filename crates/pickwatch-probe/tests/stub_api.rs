//! Probe tests against a stub picks API served on an ephemeral port.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::Router;

use pickwatch_core::config::HarnessConfig;
use pickwatch_probe::{Auth, ProbeOutcome, Prober};

#[derive(Clone, Default)]
struct StubState {
    verify_calls: Arc<AtomicU32>,
}

async fn health() -> &'static str {
    r#"{"status":"ok","version":"2.4.1"}"#
}

async fn best_bets(headers: HeaderMap) -> (StatusCode, &'static str) {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some("test-key") => (StatusCode::OK, r#"{"picks":[]}"#),
        _ => (StatusCode::UNAUTHORIZED, r#"{"error":"missing api key"}"#),
    }
}

async fn broken_json() -> &'static str {
    "{not json"
}

/// Fails twice, then succeeds — exercises the retry path.
async fn flaky_verify(State(state): State<StubState>) -> (StatusCode, &'static str) {
    let n = state.verify_calls.fetch_add(1, Ordering::SeqCst);
    if n < 2 {
        (StatusCode::SERVICE_UNAVAILABLE, r#"{"error":"warming up"}"#)
    } else {
        (StatusCode::OK, r#"{"checks":[{"name":"db","result":"pass"}]}"#)
    }
}

async fn spawn_stub() -> (String, StubState) {
    let state = StubState::default();
    let app = Router::new()
        .route("/health", get(health))
        .route("/live/best-bets/nba", get(best_bets))
        .route("/live/debug/integrations", get(broken_json))
        .route("/ops/verify", get(flaky_verify))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

fn prober_for(base_url: &str) -> Prober {
    let config: HarnessConfig = toml::from_str(&format!(
        r#"
[target]
base_url = "{base_url}"
api_key = "test-key"
timeout = "2s"

[retry]
max_attempts = 4
base_backoff = "10ms"
max_backoff = "50ms"
"#
    ))
    .unwrap();
    Prober::from_config(&config).unwrap()
}

#[tokio::test]
async fn fetch_health_returns_body() {
    let (base_url, _) = spawn_stub().await;
    let prober = prober_for(&base_url);

    match prober.fetch("/health", Auth::None).await {
        ProbeOutcome::Ok { status, body } => {
            assert_eq!(status, 200);
            assert!(body.contains("\"status\":\"ok\""));
        }
        other => panic!("expected Ok, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_json_parses_body() {
    let (base_url, _) = spawn_stub().await;
    let prober = prober_for(&base_url);

    let value = prober.fetch_json("/health", Auth::None).await.unwrap();
    assert_eq!(value["version"], "2.4.1");
}

#[tokio::test]
async fn api_key_header_is_sent() {
    let (base_url, _) = spawn_stub().await;
    let prober = prober_for(&base_url);

    let value = prober
        .fetch_json("/live/best-bets/nba", Auth::ApiKey)
        .await
        .unwrap();
    assert!(value["picks"].is_array());
}

#[tokio::test]
async fn missing_api_key_is_status_error() {
    let (base_url, _) = spawn_stub().await;
    let prober = prober_for(&base_url);

    // Auth::None skips the key header; the stub rejects with 401.
    let err = prober
        .fetch_json("/live/best-bets/nba", Auth::None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("401"), "got: {err}");
}

#[tokio::test]
async fn invalid_json_is_json_error() {
    let (base_url, _) = spawn_stub().await;
    let prober = prober_for(&base_url);

    let err = prober
        .fetch_json("/live/debug/integrations", Auth::ApiKey)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("invalid JSON"), "got: {err}");
}

#[tokio::test]
async fn retry_recovers_from_transient_failures() {
    let (base_url, state) = spawn_stub().await;
    let prober = prober_for(&base_url);

    let value = prober.get_json("/ops/verify", Auth::Admin).await.unwrap();
    assert_eq!(value["checks"][0]["result"], "pass");
    // Two 503s plus the successful attempt.
    assert_eq!(state.verify_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unknown_path_is_status_error() {
    let (base_url, _) = spawn_stub().await;
    let prober = prober_for(&base_url);

    let err = prober.fetch_json("/nope", Auth::None).await.unwrap_err();
    assert!(err.to_string().contains("404"), "got: {err}");
}
