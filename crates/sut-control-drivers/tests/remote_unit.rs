// crates/sut-control-drivers/tests/remote_unit.rs
// ============================================================================
// Module: Remote Handle Tests
// Description: Tests for remote boot readiness and hook signalling.
// ============================================================================
//! ## Overview
//! Exercises the remote SUT handle against an in-process fixture instance.

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
use std::sync::Arc;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use sut_control_core::ReadinessProbe;
use sut_control_core::SutError;
use sut_control_core::SutHandle;
use sut_control_drivers::RemoteSut;
use sut_control_drivers::SutHooksConfig;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

struct FixtureSut {
    addr: SocketAddr,
    resets: Arc<AtomicU32>,
    shutdowns: Arc<AtomicU32>,
}

async fn spawn_fixture(reset_status: StatusCode) -> FixtureSut {
    let resets = Arc::new(AtomicU32::new(0));
    let shutdowns = Arc::new(AtomicU32::new(0));
    let reset_counter = Arc::clone(&resets);
    let shutdown_counter = Arc::clone(&shutdowns);
    let app = Router::new()
        .route("/health", get(|| async { StatusCode::OK }))
        .route(
            "/reset",
            post(move || {
                let counter = Arc::clone(&reset_counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    reset_status
                }
            }),
        )
        .route(
            "/shutdown",
            post(move || {
                let counter = Arc::clone(&shutdown_counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    StatusCode::OK
                }
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind fixture");
    let addr = listener.local_addr().expect("fixture addr");
    let _serve = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    FixtureSut {
        addr,
        resets,
        shutdowns,
    }
}

fn hooks_for(addr: SocketAddr) -> SutHooksConfig {
    let mut config = SutHooksConfig::new(format!("http://{addr}"));
    config.readiness = ReadinessProbe {
        timeout: Duration::from_secs(2),
        poll_interval: Duration::from_millis(20),
    };
    config
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn boot_locates_a_ready_instance() {
    let fixture = spawn_fixture(StatusCode::NO_CONTENT).await;
    let mut handle = RemoteSut::new(&hooks_for(fixture.addr)).expect("remote handle");
    let endpoint = handle.boot().await.expect("boot");
    assert_eq!(endpoint.base_url, format!("http://{}", fixture.addr));
    assert_eq!(handle.locate(), Some(endpoint));
}

#[tokio::test]
async fn boot_fails_when_nothing_listens() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    let mut config = hooks_for(addr);
    config.readiness.timeout = Duration::from_millis(200);
    let mut handle = RemoteSut::new(&config).expect("remote handle");
    let result = handle.boot().await;
    assert!(matches!(result, Err(SutError::NotReady { .. })));
    assert!(handle.locate().is_none());
}

#[tokio::test]
async fn reset_signals_the_hook() {
    let fixture = spawn_fixture(StatusCode::NO_CONTENT).await;
    let mut handle = RemoteSut::new(&hooks_for(fixture.addr)).expect("remote handle");
    handle.boot().await.expect("boot");
    handle.reset().await.expect("reset");
    assert_eq!(fixture.resets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_reset_status_maps_to_a_reset_error() {
    let fixture = spawn_fixture(StatusCode::INTERNAL_SERVER_ERROR).await;
    let mut handle = RemoteSut::new(&hooks_for(fixture.addr)).expect("remote handle");
    handle.boot().await.expect("boot");
    let result = handle.reset().await;
    assert!(matches!(result, Err(SutError::Reset(_))));
}

#[tokio::test]
async fn shutdown_without_a_hook_stops_addressing_only() {
    let fixture = spawn_fixture(StatusCode::NO_CONTENT).await;
    let mut handle = RemoteSut::new(&hooks_for(fixture.addr)).expect("remote handle");
    handle.boot().await.expect("boot");
    handle.shutdown().await.expect("shutdown");
    assert!(handle.locate().is_none());
    assert_eq!(fixture.shutdowns.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn shutdown_signals_the_hook_when_configured() {
    let fixture = spawn_fixture(StatusCode::NO_CONTENT).await;
    let mut config = hooks_for(fixture.addr);
    config.shutdown_path = Some("/shutdown".to_string());
    let mut handle = RemoteSut::new(&config).expect("remote handle");
    handle.boot().await.expect("boot");
    handle.shutdown().await.expect("shutdown");
    assert_eq!(fixture.shutdowns.load(Ordering::SeqCst), 1);
}
