// crates/sut-control-core/src/handle.rs
// ============================================================================
// Module: SUT Handle Abstraction
// Description: Polymorphic handle over one concrete SUT instance.
// Purpose: Define the boot/locate/reset/shutdown contract for SUT variants.
// Dependencies: async-trait, thiserror
// ============================================================================

//! ## Overview
//! A [`SutHandle`] knows how to boot, locate, reset, and shut down exactly one
//! SUT instance. Variants hide whether the instance runs embedded in the
//! current process or as an independent process reached over the network.
//! Invariants:
//! - After a successful `boot`, the instance is fully ready to accept
//!   requests; readiness blocking is the handle's responsibility.
//! - `reset` restores baseline state without re-provisioning the endpoint.
//! - `shutdown` releases every resource the handle owns, under any exit path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// SECTION: Endpoint
// ============================================================================

/// Endpoint reported by a SUT handle after a successful boot.
///
/// # Invariants
/// - `base_url` remains stable across resets of the same instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SutEndpoint {
    /// Base URL of the SUT's externally reachable API.
    pub base_url: String,
    /// Additional addressing metadata for the instance.
    pub metadata: BTreeMap<String, String>,
}

impl SutEndpoint {
    /// Creates an endpoint for the given base URL with empty metadata.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            metadata: BTreeMap::new(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors reported by SUT handle operations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum SutError {
    /// Instance failed to boot.
    #[error("sut boot failed: {0}")]
    Boot(String),
    /// Instance did not become ready within the readiness window.
    #[error("sut not ready after {waited_ms} ms: {detail}")]
    NotReady {
        /// Milliseconds spent waiting for readiness.
        waited_ms: u64,
        /// Description of the readiness failure.
        detail: String,
    },
    /// Instance state could not be restored to its baseline.
    #[error("sut reset failed: {0}")]
    Reset(String),
    /// Instance could not be shut down cleanly.
    #[error("sut shutdown failed: {0}")]
    Shutdown(String),
    /// Transport-level failure while signalling the instance.
    #[error("sut transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Handle Trait
// ============================================================================

/// Handle over one concrete SUT instance.
#[async_trait]
pub trait SutHandle: Send + Sync {
    /// Boots the instance and blocks until it is ready to accept requests.
    ///
    /// # Errors
    ///
    /// Returns [`SutError`] when the instance fails to boot or to become
    /// ready; no resource may remain allocated on failure.
    async fn boot(&mut self) -> Result<SutEndpoint, SutError>;

    /// Returns the endpoint of a booted instance, if any.
    fn locate(&self) -> Option<SutEndpoint>;

    /// Restores the instance's persistent state to its initial baseline.
    ///
    /// # Errors
    ///
    /// Returns [`SutError`] when the baseline cannot be restored; the
    /// instance is then undefined and should be shut down.
    async fn reset(&mut self) -> Result<(), SutError>;

    /// Releases all resources held for the instance.
    ///
    /// # Errors
    ///
    /// Returns [`SutError`] when teardown reports a failure; resources must
    /// still be released on a best-effort basis.
    async fn shutdown(&mut self) -> Result<(), SutError>;
}
