// crates/sut-control-drivers/src/lib.rs
// ============================================================================
// Module: SUT Control Drivers Library
// Description: Out-of-process SUT handle implementations.
// Purpose: Expose remote and process-managed variants of the SUT handle.
// Dependencies: crate::{hooks, process, remote}
// ============================================================================

//! ## Overview
//! Handles for SUTs that run outside the harness process: a remote variant
//! that only locates and signals an independently started instance, and a
//! process variant that spawns and supervises the instance as a child
//! process. Both signal readiness, reset, and shutdown over the SUT's HTTP
//! hook endpoints.
//!
//! Security posture: hook responses are untrusted; requests are bounded with
//! explicit timeouts and redirects disabled. See
//! `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod hooks;
pub mod process;
pub mod remote;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hooks::SutHooksConfig;
pub use process::ProcessSut;
pub use process::ProcessSutConfig;
pub use remote::RemoteSut;
