// crates/sut-control-client/src/client.rs
// ============================================================================
// Module: Controller Client
// Description: HTTP proxy over the controller's lifecycle operations.
// Purpose: Give test drivers a blocking, single-failure-channel contract.
// Dependencies: sut-control-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! Each call blocks the caller until a definitive result is known; nothing is
//! fire-and-forget because test ordering depends on synchronous completion.
//! Transport-level failures (connection refused, timeout, malformed payload)
//! surface as failed [`CommandOutcome`]s or an absent info result, identical
//! in shape to logical failures, with the transport detail preserved in the
//! error text.
//!
//! Security posture: controller responses are treated as untrusted input;
//! body reads are bounded. See `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use sut_control_core::CommandOutcome;
use sut_control_core::InfoResponse;
use sut_control_core::SutInfo;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum controller response body size accepted by the client.
pub const MAX_CONTROLLER_RESPONSE_BYTES: usize = 64 * 1024;

/// Default timeout applied to controller requests.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Controller client configuration.
///
/// # Invariants
/// - `endpoint` is an absolute HTTP(S) URL addressing the controller service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerClientConfig {
    /// Controller service endpoint.
    pub endpoint: String,
    /// Timeout applied to each request.
    pub timeout: Duration,
}

impl ControllerClientConfig {
    /// Creates a configuration for the given endpoint with default timings.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Creates a configuration addressing a loopback controller port.
    #[must_use]
    pub fn for_local_port(port: u16) -> Self {
        Self::new(format!("http://127.0.0.1:{port}"))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Controller client errors.
///
/// # Invariants
/// - Variants are stable for error mapping and tests.
/// - String payloads may include untrusted server text.
#[derive(Debug, Error)]
pub enum ControllerClientError {
    /// Configuration error.
    #[error("controller client config error: {0}")]
    Config(String),
    /// Transport error.
    #[error("controller transport error: {0}")]
    Transport(String),
    /// Response parsing error.
    #[error("controller protocol error: {0}")]
    Protocol(String),
    /// Response size exceeds limits.
    #[error("controller response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Actual size in bytes.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client over one controller service instance.
///
/// # Invariants
/// - Route URLs are resolved once at construction and never change.
pub struct ControllerClient {
    /// Underlying HTTP client with timeout and no redirects.
    client: Client,
    /// Resolved start route.
    start_url: Url,
    /// Resolved stop route.
    stop_url: Url,
    /// Resolved reset route.
    reset_url: Url,
    /// Resolved info route.
    info_url: Url,
    /// Resolved liveness route.
    health_url: Url,
}

impl ControllerClient {
    /// Creates a client for the configured controller endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerClientError`] when the endpoint is invalid or the
    /// HTTP client cannot be constructed.
    pub fn new(config: &ControllerClientConfig) -> Result<Self, ControllerClientError> {
        let base = Url::parse(&config.endpoint)
            .map_err(|err| ControllerClientError::Config(format!("invalid endpoint: {err}")))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| ControllerClientError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            start_url: join_route(&base, "/controller/v1/start")?,
            stop_url: join_route(&base, "/controller/v1/stop")?,
            reset_url: join_route(&base, "/controller/v1/reset")?,
            info_url: join_route(&base, "/controller/v1/info")?,
            health_url: join_route(&base, "/healthz")?,
        })
    }

    /// Requests a SUT start and blocks until the outcome is known.
    pub async fn start_sut(&self) -> CommandOutcome {
        self.command(&self.start_url).await
    }

    /// Requests a SUT stop and blocks until the outcome is known.
    pub async fn stop_sut(&self) -> CommandOutcome {
        self.command(&self.stop_url).await
    }

    /// Requests a SUT reset and blocks until the outcome is known.
    pub async fn reset_sut(&self) -> CommandOutcome {
        self.command(&self.reset_url).await
    }

    /// Fetches the SUT description; absent on any failure, never an error.
    pub async fn info(&self) -> Option<SutInfo> {
        match self.fetch_info().await {
            Ok(response) => response.info,
            Err(_) => None,
        }
    }

    /// Reports whether the controller service answers its liveness probe.
    pub async fn health(&self) -> bool {
        match self.client.get(self.health_url.clone()).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Issues a lifecycle command, folding transport failures into the
    /// outcome channel.
    async fn command(&self, url: &Url) -> CommandOutcome {
        match self.post_outcome(url).await {
            Ok(outcome) => outcome,
            Err(err) => CommandOutcome::failure(err.to_string()),
        }
    }

    /// Posts a lifecycle command and parses the outcome payload.
    async fn post_outcome(&self, url: &Url) -> Result<CommandOutcome, ControllerClientError> {
        let response = self
            .client
            .post(url.clone())
            .send()
            .await
            .map_err(|err| ControllerClientError::Transport(err.to_string()))?;
        let status = response.status();
        let body = read_response_body_with_limit(response, MAX_CONTROLLER_RESPONSE_BYTES).await?;
        if !status.is_success() {
            let preview = String::from_utf8_lossy(&body);
            return Err(ControllerClientError::Transport(format!(
                "http status {}: {}",
                status.as_u16(),
                preview.trim()
            )));
        }
        serde_json::from_slice(&body)
            .map_err(|err| ControllerClientError::Protocol(format!("invalid outcome payload: {err}")))
    }

    /// Fetches and parses the info payload.
    async fn fetch_info(&self) -> Result<InfoResponse, ControllerClientError> {
        let response = self
            .client
            .get(self.info_url.clone())
            .send()
            .await
            .map_err(|err| ControllerClientError::Transport(err.to_string()))?;
        let status = response.status();
        let body = read_response_body_with_limit(response, MAX_CONTROLLER_RESPONSE_BYTES).await?;
        if !status.is_success() {
            return Err(ControllerClientError::Transport(format!(
                "http status {}",
                status.as_u16()
            )));
        }
        serde_json::from_slice(&body)
            .map_err(|err| ControllerClientError::Protocol(format!("invalid info payload: {err}")))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Joins a controller route onto the endpoint base URL.
fn join_route(base: &Url, route: &str) -> Result<Url, ControllerClientError> {
    base.join(route)
        .map_err(|err| ControllerClientError::Config(format!("invalid route {route}: {err}")))
}

/// Reads an HTTP response body while enforcing a hard byte limit.
async fn read_response_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ControllerClientError> {
    let mut body = Vec::new();
    let mut total: usize = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|err| ControllerClientError::Transport(err.to_string()))?
    {
        let next_total =
            total.checked_add(chunk.len()).ok_or(ControllerClientError::ResponseTooLarge {
                actual: usize::MAX,
                limit,
            })?;
        if next_total > limit {
            return Err(ControllerClientError::ResponseTooLarge {
                actual: next_total,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
        total = next_total;
    }
    Ok(body)
}
