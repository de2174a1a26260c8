// crates/sut-control-drivers/src/remote.rs
// ============================================================================
// Module: Remote SUT Handle
// Description: Handle over a SUT started independently of the harness.
// Purpose: Locate and signal an already-running instance across the network.
// Dependencies: crate::hooks, sut-control-core
// ============================================================================

//! ## Overview
//! [`RemoteSut`] never spawns anything. Boot only verifies that the
//! independently started instance answers its health probe; reset and
//! shutdown are signalled through the configured hooks. Without a shutdown
//! hook, shutting down simply stops addressing the instance.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use sut_control_core::SutEndpoint;
use sut_control_core::SutError;
use sut_control_core::SutHandle;

use crate::hooks::HookClient;
use crate::hooks::SutHooksConfig;

// ============================================================================
// SECTION: Remote Handle
// ============================================================================

/// Handle addressing a SUT that was started independently.
///
/// # Invariants
/// - `endpoint` is present exactly between a successful boot and shutdown.
pub struct RemoteSut {
    /// Hook client over the instance's admin endpoints.
    hooks: HookClient,
    /// Endpoint recorded at the last successful boot.
    endpoint: Option<SutEndpoint>,
}

impl RemoteSut {
    /// Creates a remote handle for the given hook configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SutError`] when the configuration is invalid.
    pub fn new(config: &SutHooksConfig) -> Result<Self, SutError> {
        Ok(Self {
            hooks: HookClient::new(config)?,
            endpoint: None,
        })
    }
}

#[async_trait]
impl SutHandle for RemoteSut {
    async fn boot(&mut self) -> Result<SutEndpoint, SutError> {
        self.hooks.await_ready().await?;
        let endpoint = self.hooks.endpoint();
        self.endpoint = Some(endpoint.clone());
        Ok(endpoint)
    }

    fn locate(&self) -> Option<SutEndpoint> {
        self.endpoint.clone()
    }

    async fn reset(&mut self) -> Result<(), SutError> {
        self.hooks.signal_reset().await
    }

    async fn shutdown(&mut self) -> Result<(), SutError> {
        self.endpoint = None;
        self.hooks.signal_shutdown().await
    }
}
