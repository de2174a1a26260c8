// crates/sut-control-core/src/lifecycle.rs
// ============================================================================
// Module: Controller Lifecycle
// Description: Lifecycle state machine serializing operations on one SUT.
// Purpose: Guarantee deterministic start/reset/stop sequencing for a suite.
// Dependencies: crate::{api, handle}, tokio
// ============================================================================

//! ## Overview
//! [`SutController`] owns exactly one [`SutHandle`] and drives it through the
//! phases `NotStarted -> Started -> (Resetting -> Started)* -> Stopped`.
//! `Stopped` is terminal. All four operations are serialized by a single
//! mutex so that overlapping calls from a misbehaving driver cannot corrupt
//! the phase.
//! Invariants:
//! - At most one SUT instance is managed at a time.
//! - Invalid transitions are reported as errors, never silently tolerated.
//! - A failed start leaves the phase at `NotStarted` with nothing allocated.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::api::SutInfo;
use crate::handle::SutError;
use crate::handle::SutHandle;

// ============================================================================
// SECTION: Lifecycle Phase
// ============================================================================

/// Phase of the controller lifecycle state machine.
///
/// # Invariants
/// - Variants are stable for error reporting and tests.
/// - `Stopped` is terminal; no operation leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// No SUT instance has been started.
    NotStarted,
    /// A SUT instance is running and ready.
    Started,
    /// A reset is in flight for the running instance.
    Resetting,
    /// The managed instance has been stopped; terminal.
    Stopped,
}

impl LifecyclePhase {
    /// Returns a stable label for the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Started => "started",
            Self::Resetting => "resetting",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned by controller lifecycle operations.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Operation invoked from a phase where it is not valid.
    #[error("invalid lifecycle transition: {operation} from {phase}")]
    InvalidTransition {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Phase the controller was in when the operation arrived.
        phase: LifecyclePhase,
    },
    /// Underlying SUT handle operation failed.
    #[error(transparent)]
    Handle(#[from] SutError),
}

// ============================================================================
// SECTION: Controller
// ============================================================================

/// Serialized lifecycle state and the one owned SUT handle.
struct ControllerState {
    /// Current lifecycle phase.
    phase: LifecyclePhase,
    /// Handle over the managed SUT instance.
    handle: Box<dyn SutHandle>,
    /// Description recorded at the last successful start.
    info: Option<SutInfo>,
}

/// Controller over the lifecycle of one SUT instance.
///
/// # Invariants
/// - Exactly one lifecycle operation executes at a time.
/// - `info` is present if and only if the phase is `Started`.
pub struct SutController {
    /// Control port published in [`SutInfo`] for this controller.
    control_port: u16,
    /// Lifecycle state guarded for mutual exclusion.
    state: Mutex<ControllerState>,
}

impl SutController {
    /// Creates a controller for the given handle and control port.
    #[must_use]
    pub fn new(handle: Box<dyn SutHandle>, control_port: u16) -> Self {
        Self {
            control_port,
            state: Mutex::new(ControllerState {
                phase: LifecyclePhase::NotStarted,
                handle,
                info: None,
            }),
        }
    }

    /// Returns the control port published for this controller.
    #[must_use]
    pub const fn control_port(&self) -> u16 {
        self.control_port
    }

    /// Boots the managed SUT and records its description.
    ///
    /// Valid only from `NotStarted`. The handle blocks until the instance is
    /// ready; on failure the phase stays at `NotStarted` and the caller may
    /// retry. The controller never retries on its own.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] on an invalid transition or a boot
    /// failure.
    pub async fn start_sut(&self) -> Result<SutInfo, ControllerError> {
        let mut state = self.state.lock().await;
        if state.phase != LifecyclePhase::NotStarted {
            return Err(ControllerError::InvalidTransition {
                operation: "start",
                phase: state.phase,
            });
        }
        let endpoint = state.handle.boot().await?;
        let info = SutInfo {
            base_url: endpoint.base_url,
            control_port: self.control_port,
            metadata: endpoint.metadata,
        };
        state.info = Some(info.clone());
        state.phase = LifecyclePhase::Started;
        Ok(info)
    }

    /// Stops the managed SUT and releases its resources.
    ///
    /// Valid from `Started`; calling again from `Stopped` is a successful
    /// no-op. The phase transitions to `Stopped` and the recorded description
    /// is discarded even when the handle reports a shutdown failure, so no
    /// exit path leaves the instance addressable.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] on an invalid transition or when the
    /// handle reports a shutdown failure.
    pub async fn stop_sut(&self) -> Result<(), ControllerError> {
        let mut state = self.state.lock().await;
        match state.phase {
            LifecyclePhase::Stopped => return Ok(()),
            LifecyclePhase::Started => {}
            phase @ (LifecyclePhase::NotStarted | LifecyclePhase::Resetting) => {
                return Err(ControllerError::InvalidTransition {
                    operation: "stop",
                    phase,
                });
            }
        }
        let result = state.handle.shutdown().await;
        state.info = None;
        state.phase = LifecyclePhase::Stopped;
        result.map_err(ControllerError::Handle)
    }

    /// Restores the managed SUT to its initial baseline state.
    ///
    /// Valid only from `Started`. The endpoint is not re-provisioned, so the
    /// description reported by [`Self::info`] is unchanged by a successful
    /// reset. On failure the instance is undefined; the caller must treat it
    /// as unusable and call [`Self::stop_sut`].
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError`] on an invalid transition or a reset
    /// failure.
    pub async fn reset_sut(&self) -> Result<(), ControllerError> {
        let mut state = self.state.lock().await;
        if state.phase != LifecyclePhase::Started {
            return Err(ControllerError::InvalidTransition {
                operation: "reset",
                phase: state.phase,
            });
        }
        state.phase = LifecyclePhase::Resetting;
        let result = state.handle.reset().await;
        state.phase = LifecyclePhase::Started;
        result.map_err(ControllerError::Handle)
    }

    /// Returns the description of the running instance, if started.
    ///
    /// From any phase other than `Started` this returns `None`; it never
    /// fails and never reports a stale value.
    pub async fn info(&self) -> Option<SutInfo> {
        let state = self.state.lock().await;
        if state.phase == LifecyclePhase::Started {
            state.info.clone()
        } else {
            None
        }
    }

    /// Returns the current lifecycle phase.
    pub async fn phase(&self) -> LifecyclePhase {
        self.state.lock().await.phase
    }
}
