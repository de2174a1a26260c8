// crates/sut-control-client/tests/client_unit.rs
// ============================================================================
// Module: Controller Client Tests
// Description: Tests for transport-failure folding and payload parsing.
// ============================================================================
//! ## Overview
//! Validates that transport failures surface through the same outcome
//! channel as logical failures and that info is absent on any failure.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use sut_control_client::ControllerClient;
use sut_control_client::ControllerClientConfig;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn short_timeout_config(addr: SocketAddr) -> ControllerClientConfig {
    let mut config = ControllerClientConfig::new(format!("http://{addr}"));
    config.timeout = Duration::from_millis(500);
    config
}

fn unbound_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    addr
}

async fn spawn_misbehaving_controller() -> SocketAddr {
    let app = Router::new()
        .route("/controller/v1/start", post(|| async { "not json" }))
        .route("/controller/v1/stop", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/controller/v1/info", get(|| async { "not json" }))
        .route("/healthz", get(|| async { StatusCode::OK }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind fixture");
    let addr = listener.local_addr().expect("fixture addr");
    let _serve = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn connection_refused_folds_into_the_outcome_channel() {
    let config = short_timeout_config(unbound_addr());
    let client = ControllerClient::new(&config).expect("client");
    let outcome = client.start_sut().await;
    assert!(!outcome.success);
    let detail = outcome.error.expect("error detail");
    assert!(detail.contains("controller transport error"));
}

#[tokio::test]
async fn info_is_absent_when_the_controller_is_unreachable() {
    let config = short_timeout_config(unbound_addr());
    let client = ControllerClient::new(&config).expect("client");
    assert!(client.info().await.is_none());
    assert!(!client.health().await);
}

#[tokio::test]
async fn malformed_outcome_payload_is_a_failure() {
    let addr = spawn_misbehaving_controller().await;
    let client = ControllerClient::new(&short_timeout_config(addr)).expect("client");
    let outcome = client.start_sut().await;
    assert!(!outcome.success);
    let detail = outcome.error.expect("error detail");
    assert!(detail.contains("controller protocol error"));
}

#[tokio::test]
async fn http_error_status_is_a_failure_with_detail() {
    let addr = spawn_misbehaving_controller().await;
    let client = ControllerClient::new(&short_timeout_config(addr)).expect("client");
    let outcome = client.stop_sut().await;
    assert!(!outcome.success);
    let detail = outcome.error.expect("error detail");
    assert!(detail.contains("http status 500"));
}

#[tokio::test]
async fn malformed_info_payload_is_absent_not_an_error() {
    let addr = spawn_misbehaving_controller().await;
    let client = ControllerClient::new(&short_timeout_config(addr)).expect("client");
    assert!(client.info().await.is_none());
    assert!(client.health().await);
}

#[test]
fn invalid_endpoint_is_a_config_error() {
    let config = ControllerClientConfig::new("not a url");
    let result = ControllerClient::new(&config);
    assert!(result.is_err());
}
