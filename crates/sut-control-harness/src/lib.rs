// crates/sut-control-harness/src/lib.rs
// ============================================================================
// Module: SUT Control Harness Library
// Description: Test-suite glue over the controller service and client.
// Purpose: Expose the embedded launcher, readiness helpers, and fixture.
// Dependencies: crate::{fixture, launcher, readiness}
// ============================================================================

//! ## Overview
//! The harness binds the controller lifecycle into a test suite: the
//! embedded launcher runs the controller service inside the harness process
//! on an ephemeral port, the readiness helper waits for it without arbitrary
//! sleeps, and the suite fixture encodes the required call sequence
//! (start once, reset before each case, stop at the end) with hard failures
//! on any violation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod fixture;
pub mod launcher;
pub mod readiness;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use fixture::FixtureError;
pub use fixture::SuiteFixture;
pub use launcher::EmbeddedController;
pub use launcher::LaunchError;
pub use readiness::wait_for_controller_ready;
