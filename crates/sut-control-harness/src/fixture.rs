// crates/sut-control-harness/src/fixture.rs
// ============================================================================
// Module: Suite Fixture
// Description: Required lifecycle call sequence for test suites.
// Purpose: Bind controller calls to suite setup, per-case reset, and teardown.
// Dependencies: sut-control-client, sut-control-core
// ============================================================================

//! ## Overview
//! [`SuiteFixture`] encodes the lifecycle contract every suite must follow:
//! start once and require the SUT description, reset before each case, stop
//! when the suite completes. Any violation is surfaced as a hard error
//! because a broken control channel invalidates every subsequent test
//! result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sut_control_client::ControllerClient;
use sut_control_core::CommandOutcome;
use sut_control_core::SutInfo;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors produced by fixture lifecycle steps.
///
/// # Invariants
/// - Variants are stable for suite-level assertions.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Suite start was rejected or failed.
    #[error("suite start failed: {0}")]
    Start(String),
    /// SUT description was absent after a successful start.
    #[error("sut info unavailable after start")]
    MissingInfo,
    /// Per-case reset was rejected or failed.
    #[error("case reset failed: {0}")]
    Reset(String),
    /// Suite stop was rejected or failed.
    #[error("suite stop failed: {0}")]
    Stop(String),
}

/// Extracts the failure detail from an outcome.
fn failure_detail(outcome: CommandOutcome) -> String {
    outcome.error.unwrap_or_else(|| "unspecified failure".to_string())
}

// ============================================================================
// SECTION: Suite Fixture
// ============================================================================

/// Lifecycle fixture driving one controller for one suite.
///
/// # Invariants
/// - `info` was captured from a successful start with a non-empty base URL.
pub struct SuiteFixture {
    /// Client addressing the controller service.
    client: ControllerClient,
    /// Description captured once at suite start.
    info: SutInfo,
}

impl SuiteFixture {
    /// Starts the SUT once for the suite and captures its description.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the start is rejected or the SUT
    /// description is missing its base URL.
    pub async fn init(client: ControllerClient) -> Result<Self, FixtureError> {
        let outcome = client.start_sut().await;
        if !outcome.success {
            return Err(FixtureError::Start(failure_detail(outcome)));
        }
        let info = client.info().await.ok_or(FixtureError::MissingInfo)?;
        if info.base_url.is_empty() {
            return Err(FixtureError::MissingInfo);
        }
        Ok(Self {
            client,
            info,
        })
    }

    /// Returns the SUT description captured at suite start.
    #[must_use]
    pub const fn info(&self) -> &SutInfo {
        &self.info
    }

    /// Returns the base URL of the SUT under test.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.info.base_url
    }

    /// Resets the SUT before a test case runs.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the reset is rejected; the suite must
    /// stop the instance rather than continue.
    pub async fn before_case(&self) -> Result<(), FixtureError> {
        let outcome = self.client.reset_sut().await;
        if outcome.success {
            Ok(())
        } else {
            Err(FixtureError::Reset(failure_detail(outcome)))
        }
    }

    /// Stops the SUT after the suite completes.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] when the stop is rejected.
    pub async fn teardown(self) -> Result<(), FixtureError> {
        let outcome = self.client.stop_sut().await;
        if outcome.success {
            Ok(())
        } else {
            Err(FixtureError::Stop(failure_detail(outcome)))
        }
    }
}
