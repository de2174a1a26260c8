// crates/sut-control-drivers/src/hooks.rs
// ============================================================================
// Module: SUT Hook Client
// Description: Bounded HTTP client for SUT health, reset, and shutdown hooks.
// Purpose: Share hook signalling between the remote and process variants.
// Dependencies: sut-control-core, reqwest, url
// ============================================================================

//! ## Overview
//! Out-of-process SUT variants address their instance through three HTTP
//! hooks: a health probe, a reset hook, and an optional shutdown hook. This
//! client issues those requests with explicit timeouts and redirects
//! disabled, and owns the readiness poll loop used during boot.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use sut_control_core::ReadinessProbe;
use sut_control_core::SutEndpoint;
use sut_control_core::SutError;
use tokio::time::Instant;
use tokio::time::sleep;
use url::Url;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Hook addressing for an out-of-process SUT.
///
/// # Invariants
/// - `base_url` is an absolute HTTP(S) URL.
/// - Hook paths are absolute (`/`-prefixed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SutHooksConfig {
    /// Base URL of the SUT's externally reachable API.
    pub base_url: String,
    /// Health probe path on the SUT.
    pub health_path: String,
    /// Reset hook path on the SUT.
    pub reset_path: String,
    /// Optional shutdown hook path on the SUT.
    pub shutdown_path: Option<String>,
    /// Timeout applied to each hook request.
    pub request_timeout: Duration,
    /// Readiness polling parameters for boots.
    pub readiness: ReadinessProbe,
}

impl SutHooksConfig {
    /// Creates a hook configuration with default paths and timings.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            health_path: "/health".to_string(),
            reset_path: "/reset".to_string(),
            shutdown_path: None,
            request_timeout: Duration::from_secs(2),
            readiness: ReadinessProbe::default(),
        }
    }
}

// ============================================================================
// SECTION: Hook Client
// ============================================================================

/// Bounded HTTP client over a SUT's hook endpoints.
pub(crate) struct HookClient {
    /// Underlying HTTP client with timeout and no redirects.
    client: Client,
    /// Parsed SUT base URL.
    base_url: Url,
    /// Resolved health probe URL.
    health_url: Url,
    /// Resolved reset hook URL.
    reset_url: Url,
    /// Resolved shutdown hook URL, when configured.
    shutdown_url: Option<Url>,
    /// Readiness polling parameters.
    probe: ReadinessProbe,
}

impl HookClient {
    /// Builds a hook client from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SutError`] when the base URL or a hook path is invalid or
    /// the HTTP client cannot be constructed.
    pub(crate) fn new(config: &SutHooksConfig) -> Result<Self, SutError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| SutError::Boot(format!("invalid sut base url: {err}")))?;
        let health_url = join_hook(&base_url, &config.health_path)?;
        let reset_url = join_hook(&base_url, &config.reset_path)?;
        let shutdown_url = match &config.shutdown_path {
            Some(path) => Some(join_hook(&base_url, path)?),
            None => None,
        };
        let client = Client::builder()
            .timeout(config.request_timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| SutError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url,
            health_url,
            reset_url,
            shutdown_url,
            probe: config.readiness,
        })
    }

    /// Returns the endpoint the hooks address.
    pub(crate) fn endpoint(&self) -> SutEndpoint {
        let mut base = self.base_url.as_str();
        base = base.strip_suffix('/').unwrap_or(base);
        SutEndpoint::new(base)
    }

    /// Reports whether the health probe answers with a success status.
    pub(crate) async fn is_ready(&self) -> bool {
        match self.client.get(self.health_url.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Polls the health probe until ready or the window expires.
    ///
    /// # Errors
    ///
    /// Returns [`SutError::NotReady`] when the window expires first.
    pub(crate) async fn await_ready(&self) -> Result<(), SutError> {
        let start = Instant::now();
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            if self.is_ready().await {
                return Ok(());
            }
            if start.elapsed() > self.probe.timeout {
                let waited_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                return Err(SutError::NotReady {
                    waited_ms,
                    detail: format!(
                        "health probe {} not answering after {attempts} attempts",
                        self.health_url
                    ),
                });
            }
            sleep(self.probe.poll_interval).await;
        }
    }

    /// Signals the reset hook.
    ///
    /// # Errors
    ///
    /// Returns [`SutError`] on transport failure or a non-success status.
    pub(crate) async fn signal_reset(&self) -> Result<(), SutError> {
        let response = self
            .client
            .post(self.reset_url.clone())
            .send()
            .await
            .map_err(|err| SutError::Transport(err.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(SutError::Reset(format!(
                "reset hook answered with status {}",
                response.status().as_u16()
            )))
        }
    }

    /// Signals the shutdown hook when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`SutError`] on transport failure or a non-success status.
    pub(crate) async fn signal_shutdown(&self) -> Result<(), SutError> {
        let Some(url) = &self.shutdown_url else {
            return Ok(());
        };
        let response = self
            .client
            .post(url.clone())
            .send()
            .await
            .map_err(|err| SutError::Transport(err.to_string()))?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(SutError::Shutdown(format!(
                "shutdown hook answered with status {}",
                response.status().as_u16()
            )))
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Joins an absolute hook path onto the SUT base URL.
fn join_hook(base: &Url, path: &str) -> Result<Url, SutError> {
    base.join(path).map_err(|err| SutError::Boot(format!("invalid hook path {path}: {err}")))
}
