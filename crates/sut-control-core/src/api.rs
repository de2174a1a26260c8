// crates/sut-control-core/src/api.rs
// ============================================================================
// Module: Controller Wire API
// Description: Value types exchanged between controller clients and services.
// Purpose: Describe a running SUT instance and the outcome of lifecycle calls.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! These values form the controller wire contract. [`SutInfo`] is created once
//! per successful start and is read-only afterward; [`CommandOutcome`] is the
//! single failure channel for every lifecycle command, so callers distinguish
//! transport failures from logical failures only by the error detail.
//!
//! Security posture: values received over the network are untrusted; see
//! `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: SUT Info
// ============================================================================

/// Immutable description of a running SUT instance.
///
/// # Invariants
/// - Created once per successful start; never mutated afterward.
/// - `base_url` addresses the SUT's externally reachable API surface.
/// - `control_port` is the port the controller service itself is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SutInfo {
    /// Base URL of the SUT's externally reachable API.
    pub base_url: String,
    /// Port the controller service is bound to.
    pub control_port: u16,
    /// Additional addressing metadata reported by the SUT handle.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

// ============================================================================
// SECTION: Command Outcome
// ============================================================================

/// Result of a lifecycle command.
///
/// # Invariants
/// - `error` is `None` when `success` is true.
/// - Transport and logical failures share this channel; `error` carries the
///   distinguishing detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// Indicates whether the command reached its target state.
    pub success: bool,
    /// Failure detail when the command did not succeed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandOutcome {
    /// Returns a successful outcome.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Returns a failed outcome carrying the provided detail.
    #[must_use]
    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(detail.into()),
        }
    }
}

// ============================================================================
// SECTION: Info Response
// ============================================================================

/// Response payload for info queries.
///
/// # Invariants
/// - `info` is absent whenever the controller is not in the started phase;
///   it is never a stale or default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResponse {
    /// Last known SUT description, present only while started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<SutInfo>,
}

impl InfoResponse {
    /// Returns a response with no SUT description.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            info: None,
        }
    }

    /// Returns a response carrying the given SUT description.
    #[must_use]
    pub const fn present(info: SutInfo) -> Self {
        Self {
            info: Some(info),
        }
    }
}
