// crates/sut-control-harness/src/readiness.rs
// ============================================================================
// Module: Readiness Helpers
// Description: Readiness probes for controller services.
// Purpose: Ensure controllers are ready without arbitrary sleeps.
// Dependencies: sut-control-client, tokio
// ============================================================================

//! ## Overview
//! Polls the controller's liveness probe until it answers or a timeout
//! expires, so suites never race the serving task.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use sut_control_client::ControllerClient;
use tokio::time::Instant;
use tokio::time::sleep;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Interval between controller readiness checks.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Polls the liveness probe until the controller responds or timeout expires.
///
/// # Errors
///
/// Returns a description of the timeout when the controller never answers.
pub async fn wait_for_controller_ready(
    client: &ControllerClient,
    timeout: Duration,
) -> Result<(), String> {
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        if client.health().await {
            return Ok(());
        }
        if start.elapsed() > timeout {
            return Err(format!("controller readiness timeout after {attempts} attempts"));
        }
        sleep(POLL_INTERVAL).await;
    }
}
