// system-tests/tests/invalid_sequences.rs
// ============================================================================
// Module: Invalid Sequence System Tests
// Description: Contract-violation orderings rejected across the wire.
// Purpose: Ensure invalid transitions are reported, never silently tolerated.
// Dependencies: system-tests fixtures
// ============================================================================

//! ## Overview
//! Issues lifecycle calls out of order and checks that every violation is
//! reported as a failure with detail, and that a rejected reset allocates
//! nothing on the SUT side.

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

use std::sync::Arc;
use std::time::Duration;

use sut_control_harness::EmbeddedController;
use sut_control_harness::wait_for_controller_ready;
use system_tests::SampleSut;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);
const READY_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn reset_before_start_is_rejected_and_allocates_nothing() {
    let driver = Arc::new(SampleSut::new());
    let controller =
        EmbeddedController::launch(Arc::clone(&driver)).await.expect("launch controller");
    let client = controller.client(CLIENT_TIMEOUT).expect("client");
    wait_for_controller_ready(&client, READY_TIMEOUT).await.expect("controller ready");

    let reset = client.reset_sut().await;
    assert!(!reset.success);
    let detail = reset.error.expect("error detail");
    assert!(detail.contains("invalid lifecycle transition"));
    assert!(driver.bound_addr().await.is_none(), "rejected reset opened a listener");
    assert!(client.info().await.is_none());

    controller.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_before_start_is_rejected() {
    let driver = Arc::new(SampleSut::new());
    let controller = EmbeddedController::launch(driver).await.expect("launch controller");
    let client = controller.client(CLIENT_TIMEOUT).expect("client");
    wait_for_controller_ready(&client, READY_TIMEOUT).await.expect("controller ready");

    let stop = client.stop_sut().await;
    assert!(!stop.success);
    let detail = stop.error.expect("error detail");
    assert!(detail.contains("invalid lifecycle transition"));

    controller.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn second_start_is_rejected_while_started() {
    let driver = Arc::new(SampleSut::new());
    let controller = EmbeddedController::launch(driver).await.expect("launch controller");
    let client = controller.client(CLIENT_TIMEOUT).expect("client");
    wait_for_controller_ready(&client, READY_TIMEOUT).await.expect("controller ready");

    assert!(client.start_sut().await.success);
    let second = client.start_sut().await;
    assert!(!second.success);
    let detail = second.error.expect("error detail");
    assert!(detail.contains("invalid lifecycle transition"));
    assert!(client.info().await.is_some(), "running instance must survive the rejection");

    assert!(client.stop_sut().await.success);
    controller.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn start_after_stop_is_rejected() {
    let driver = Arc::new(SampleSut::new());
    let controller = EmbeddedController::launch(driver).await.expect("launch controller");
    let client = controller.client(CLIENT_TIMEOUT).expect("client");
    wait_for_controller_ready(&client, READY_TIMEOUT).await.expect("controller ready");

    assert!(client.start_sut().await.success);
    assert!(client.stop_sut().await.success);

    let restart = client.start_sut().await;
    assert!(!restart.success);
    let detail = restart.error.expect("error detail");
    assert!(detail.contains("invalid lifecycle transition"));

    controller.shutdown().await;
}
