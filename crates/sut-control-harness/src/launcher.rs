// crates/sut-control-harness/src/launcher.rs
// ============================================================================
// Module: Embedded Launcher
// Description: In-process controller service on an ephemeral loopback port.
// Purpose: Provide deterministic controller startup and teardown for suites.
// Dependencies: sut-control-server, sut-control-client, tokio
// ============================================================================

//! ## Overview
//! [`EmbeddedController`] binds the controller service inside the harness
//! process, serves it on a background task, and exposes the control port the
//! bind selected. Shutdown aborts the serving task; the embedded SUT itself
//! is stopped through the lifecycle API, not by the launcher.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sut_control_client::ControllerClient;
use sut_control_client::ControllerClientConfig;
use sut_control_client::ControllerClientError;
use sut_control_config::ServerConfig;
use sut_control_core::EmbeddedSut;
use sut_control_core::ReadinessProbe;
use sut_control_core::SutDriver;
use sut_control_core::SutHandle;
use sut_control_server::ControllerServer;
use sut_control_server::ServeError;
use thiserror::Error;
use tokio::task::JoinHandle;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors produced while launching an embedded controller.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Controller service failed to bind.
    #[error("embedded controller launch failed: {0}")]
    Serve(#[from] ServeError),
    /// Controller client could not be constructed.
    #[error("embedded controller client error: {0}")]
    Client(#[from] ControllerClientError),
}

// ============================================================================
// SECTION: Embedded Controller
// ============================================================================

/// Handle for a controller service running inside the harness process.
pub struct EmbeddedController {
    /// Address the controller service is bound to.
    local_addr: SocketAddr,
    /// Background task serving lifecycle requests.
    join: JoinHandle<Result<(), ServeError>>,
}

impl EmbeddedController {
    /// Launches a controller over an embedded SUT driver.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] when the controller cannot be bound.
    pub async fn launch(driver: Arc<dyn SutDriver>) -> Result<Self, LaunchError> {
        Self::launch_with_probe(driver, ReadinessProbe::default()).await
    }

    /// Launches a controller over an embedded SUT driver with an explicit
    /// readiness probe.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] when the controller cannot be bound.
    pub async fn launch_with_probe(
        driver: Arc<dyn SutDriver>,
        probe: ReadinessProbe,
    ) -> Result<Self, LaunchError> {
        Self::launch_handle(Box::new(EmbeddedSut::with_probe(driver, probe))).await
    }

    /// Launches a controller over an arbitrary SUT handle.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] when the controller cannot be bound.
    pub async fn launch_handle(handle: Box<dyn SutHandle>) -> Result<Self, LaunchError> {
        let config = ServerConfig {
            bind: "127.0.0.1:0".to_string(),
            ..ServerConfig::default()
        };
        let bound = ControllerServer::new(config, handle).bind().await?;
        let local_addr = bound.local_addr();
        let join = tokio::spawn(bound.serve());
        Ok(Self {
            local_addr,
            join,
        })
    }

    /// Returns the address the controller service is bound to.
    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the control port chosen for control traffic.
    #[must_use]
    pub const fn control_port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Builds a controller client addressing this instance.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError`] when the client cannot be constructed.
    pub fn client(&self, timeout: Duration) -> Result<ControllerClient, LaunchError> {
        let mut config = ControllerClientConfig::for_local_port(self.control_port());
        config.timeout = timeout;
        Ok(ControllerClient::new(&config)?)
    }

    /// Shuts down the controller serving task.
    pub async fn shutdown(self) {
        self.join.abort();
        let _ = self.join.await;
    }
}

// Intentionally no Drop impl: runtime shutdown tears the serving task down.
