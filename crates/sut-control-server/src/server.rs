// crates/sut-control-server/src/server.rs
// ============================================================================
// Module: Controller Service
// Description: HTTP service exposing start/stop/reset/info for one SUT.
// Purpose: Serialize lifecycle operations behind a network-addressable API.
// Dependencies: sut-control-core, sut-control-config, axum, tokio
// ============================================================================

//! ## Overview
//! The controller service wraps one [`SutController`] and exposes its four
//! operations over HTTP. Lifecycle failures (boot, reset, invalid
//! transitions) are answered with HTTP 200 and `success: false`, so the
//! transport layer only fails for transport reasons and clients keep a
//! single failure channel. Binding and serving are split so the embedded
//! launcher can publish the chosen control port before requests arrive.
//!
//! Security posture: requests are untrusted and carry no bodies of interest;
//! body sizes are capped. See `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::routing::post;
use sut_control_config::ServerConfig;
use sut_control_core::CommandOutcome;
use sut_control_core::ControllerError;
use sut_control_core::InfoResponse;
use sut_control_core::SutController;
use sut_control_core::SutHandle;
use thiserror::Error;

use crate::telemetry::LifecycleMetricEvent;
use crate::telemetry::LifecycleMetrics;
use crate::telemetry::LifecycleOp;
use crate::telemetry::NoopMetrics;
use crate::telemetry::OpOutcome;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors produced while binding or serving the controller service.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ServeError {
    /// Configuration error.
    #[error("controller config error: {0}")]
    Config(String),
    /// Transport error while binding or serving.
    #[error("controller transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Controller Server
// ============================================================================

/// Controller service instance, ready to bind.
pub struct ControllerServer {
    /// Server settings (bind address, body limits).
    config: ServerConfig,
    /// Handle over the one managed SUT.
    handle: Box<dyn SutHandle>,
    /// Metrics sink for lifecycle operations.
    metrics: Arc<dyn LifecycleMetrics>,
}

impl ControllerServer {
    /// Creates a controller service with discarded metrics.
    #[must_use]
    pub fn new(config: ServerConfig, handle: Box<dyn SutHandle>) -> Self {
        Self::with_metrics(config, handle, Arc::new(NoopMetrics))
    }

    /// Creates a controller service with an explicit metrics sink.
    #[must_use]
    pub fn with_metrics(
        config: ServerConfig,
        handle: Box<dyn SutHandle>,
        metrics: Arc<dyn LifecycleMetrics>,
    ) -> Self {
        Self {
            config,
            handle,
            metrics,
        }
    }

    /// Binds the service and fixes its control port.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError`] when the bind address is invalid or the
    /// listener cannot be bound (including port exhaustion).
    pub async fn bind(self) -> Result<BoundController, ServeError> {
        let addr: SocketAddr = self
            .config
            .bind
            .parse()
            .map_err(|_| ServeError::Config(format!("invalid bind address: {}", self.config.bind)))?;
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| ServeError::Transport(format!("controller bind failed: {err}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|err| ServeError::Transport(format!("controller address unavailable: {err}")))?;
        let controller = Arc::new(SutController::new(self.handle, local_addr.port()));
        let state = Arc::new(ServerState {
            controller,
            metrics: self.metrics,
        });
        Ok(BoundController {
            local_addr,
            max_body_bytes: self.config.max_body_bytes,
            listener,
            state,
        })
    }
}

/// Controller service bound to its control port.
pub struct BoundController {
    /// Address the listener is bound to.
    local_addr: SocketAddr,
    /// Maximum accepted request body size.
    max_body_bytes: usize,
    /// Bound TCP listener.
    listener: tokio::net::TcpListener,
    /// Shared handler state.
    state: Arc<ServerState>,
}

impl BoundController {
    /// Returns the address the controller service is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves lifecycle requests until the task is stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ServeError`] when the HTTP server fails.
    pub async fn serve(self) -> Result<(), ServeError> {
        let app = build_router(Arc::clone(&self.state), self.max_body_bytes);
        axum::serve(self.listener, app)
            .await
            .map_err(|err| ServeError::Transport(format!("controller server failed: {err}")))
    }
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Shared state for controller handlers.
struct ServerState {
    /// Serialized lifecycle controller.
    controller: Arc<SutController>,
    /// Metrics sink for lifecycle operations.
    metrics: Arc<dyn LifecycleMetrics>,
}

/// Builds the controller route table.
fn build_router(state: Arc<ServerState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(handle_health))
        .route("/controller/v1/info", get(handle_info))
        .route("/controller/v1/start", post(handle_start))
        .route("/controller/v1/stop", post(handle_stop))
        .route("/controller/v1/reset", post(handle_reset))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Answers liveness probes.
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Reports the last known SUT description, absent unless started.
async fn handle_info(State(state): State<Arc<ServerState>>) -> Json<InfoResponse> {
    let started = Instant::now();
    let info = state.controller.info().await;
    record(&state, LifecycleOp::Info, OpOutcome::Ok, started);
    Json(InfoResponse {
        info,
    })
}

/// Boots the managed SUT.
async fn handle_start(State(state): State<Arc<ServerState>>) -> Json<CommandOutcome> {
    let started = Instant::now();
    let result = state.controller.start_sut().await.map(|_| ());
    finish_command(&state, LifecycleOp::Start, result, started)
}

/// Stops the managed SUT.
async fn handle_stop(State(state): State<Arc<ServerState>>) -> Json<CommandOutcome> {
    let started = Instant::now();
    let result = state.controller.stop_sut().await;
    finish_command(&state, LifecycleOp::Stop, result, started)
}

/// Resets the managed SUT to its baseline state.
async fn handle_reset(State(state): State<Arc<ServerState>>) -> Json<CommandOutcome> {
    let started = Instant::now();
    let result = state.controller.reset_sut().await;
    finish_command(&state, LifecycleOp::Reset, result, started)
}

/// Records telemetry and flattens a lifecycle result onto the wire.
fn finish_command(
    state: &ServerState,
    op: LifecycleOp,
    result: Result<(), ControllerError>,
    started: Instant,
) -> Json<CommandOutcome> {
    let outcome = match &result {
        Ok(()) => OpOutcome::Ok,
        Err(_) => OpOutcome::Error,
    };
    record(state, op, outcome, started);
    match result {
        Ok(()) => Json(CommandOutcome::ok()),
        Err(err) => Json(CommandOutcome::failure(err.to_string())),
    }
}

/// Records one counter event and one latency observation.
fn record(state: &ServerState, op: LifecycleOp, outcome: OpOutcome, started: Instant) {
    let event = LifecycleMetricEvent {
        op,
        outcome,
    };
    state.metrics.record_operation(event);
    state.metrics.record_latency(event, started.elapsed());
}
