// crates/sut-control-core/src/embedded.rs
// ============================================================================
// Module: Embedded SUT Handle
// Description: In-process SUT variant backed by an application driver.
// Purpose: Boot the SUT inside the harness process with readiness blocking.
// Dependencies: crate::handle, async-trait, tokio
// ============================================================================

//! ## Overview
//! [`EmbeddedSut`] adapts an application-supplied [`SutDriver`] to the
//! [`SutHandle`] contract. The driver boots the SUT inside the current
//! process and exposes a readiness check; the handle polls that check until
//! the instance accepts requests or the readiness window expires, in which
//! case the driver is stopped again so nothing leaks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio::time::sleep;

use crate::handle::SutEndpoint;
use crate::handle::SutError;
use crate::handle::SutHandle;

// ============================================================================
// SECTION: Readiness Probe
// ============================================================================

/// Default readiness window for embedded boots.
const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(5);
/// Default interval between readiness polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Polling parameters for readiness blocking.
///
/// # Invariants
/// - `poll_interval` is expected to be much smaller than `timeout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessProbe {
    /// Maximum time to wait for the instance to become ready.
    pub timeout: Duration,
    /// Interval between readiness checks.
    pub poll_interval: Duration,
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_READINESS_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

// ============================================================================
// SECTION: Driver Trait
// ============================================================================

/// Application-side driver for an in-process SUT.
///
/// Implementations boot their server inside the harness process, report its
/// endpoint, answer readiness checks, and restore baseline state on demand.
#[async_trait]
pub trait SutDriver: Send + Sync {
    /// Boots the SUT in-process and returns its endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SutError`] when the SUT cannot be started.
    async fn start(&self) -> Result<SutEndpoint, SutError>;

    /// Reports whether the SUT currently accepts requests.
    async fn is_ready(&self) -> bool;

    /// Restores the SUT's persistent state to its initial baseline.
    ///
    /// # Errors
    ///
    /// Returns [`SutError`] when the baseline cannot be restored.
    async fn reset(&self) -> Result<(), SutError>;

    /// Shuts the SUT down and releases its resources.
    ///
    /// # Errors
    ///
    /// Returns [`SutError`] when teardown fails.
    async fn stop(&self) -> Result<(), SutError>;
}

// ============================================================================
// SECTION: Embedded Handle
// ============================================================================

/// In-process SUT handle backed by a [`SutDriver`].
///
/// # Invariants
/// - `endpoint` is present exactly while the driver has been booted through
///   this handle and not yet shut down.
pub struct EmbeddedSut {
    /// Driver supplied by the application under test.
    driver: Arc<dyn SutDriver>,
    /// Readiness polling parameters.
    probe: ReadinessProbe,
    /// Endpoint recorded at the last successful boot.
    endpoint: Option<SutEndpoint>,
}

impl EmbeddedSut {
    /// Creates an embedded handle with the default readiness probe.
    #[must_use]
    pub fn new(driver: Arc<dyn SutDriver>) -> Self {
        Self::with_probe(driver, ReadinessProbe::default())
    }

    /// Creates an embedded handle with an explicit readiness probe.
    #[must_use]
    pub const fn with_probe(driver: Arc<dyn SutDriver>, probe: ReadinessProbe) -> Self {
        Self {
            driver,
            probe,
            endpoint: None,
        }
    }

    /// Polls the driver until it reports ready or the window expires.
    async fn await_ready(&self) -> Result<(), SutError> {
        let start = Instant::now();
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            if self.driver.is_ready().await {
                return Ok(());
            }
            if start.elapsed() > self.probe.timeout {
                let waited_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                return Err(SutError::NotReady {
                    waited_ms,
                    detail: format!("driver not ready after {attempts} attempts"),
                });
            }
            sleep(self.probe.poll_interval).await;
        }
    }
}

#[async_trait]
impl SutHandle for EmbeddedSut {
    async fn boot(&mut self) -> Result<SutEndpoint, SutError> {
        let endpoint = self.driver.start().await?;
        if let Err(err) = self.await_ready().await {
            // Never leave a half-started instance behind a failed boot.
            let _ = self.driver.stop().await;
            return Err(err);
        }
        self.endpoint = Some(endpoint.clone());
        Ok(endpoint)
    }

    fn locate(&self) -> Option<SutEndpoint> {
        self.endpoint.clone()
    }

    async fn reset(&mut self) -> Result<(), SutError> {
        self.driver.reset().await
    }

    async fn shutdown(&mut self) -> Result<(), SutError> {
        self.endpoint = None;
        self.driver.stop().await
    }
}
