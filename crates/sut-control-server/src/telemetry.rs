// crates/sut-control-server/src/telemetry.rs
// ============================================================================
// Module: Controller Telemetry
// Description: Observability hooks for lifecycle operations.
// Purpose: Provide metric events and latency buckets without hard deps.
// Dependencies: Standard library.
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for lifecycle operation
//! counters and latency histograms. It is intentionally dependency-light so
//! downstream deployments can plug in Prometheus or OpenTelemetry without
//! redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default latency buckets in milliseconds for lifecycle operation histograms.
pub const LIFECYCLE_LATENCY_BUCKETS_MS: &[u64] =
    &[1, 2, 5, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000];

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Lifecycle operation classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    /// Start of the managed SUT.
    Start,
    /// Stop of the managed SUT.
    Stop,
    /// Reset of the managed SUT.
    Reset,
    /// Info query against the controller.
    Info,
}

impl LifecycleOp {
    /// Returns a stable label for the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reset => "reset",
            Self::Info => "info",
        }
    }
}

/// Lifecycle operation outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpOutcome {
    /// Successful operation.
    Ok,
    /// Failed operation.
    Error,
}

impl OpOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Lifecycle operation metric event payload.
///
/// # Invariants
/// - One event is recorded per handled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleMetricEvent {
    /// Operation that was handled.
    pub op: LifecycleOp,
    /// Outcome of the operation.
    pub outcome: OpOutcome,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for lifecycle operations and latencies.
pub trait LifecycleMetrics: Send + Sync {
    /// Records an operation counter event.
    fn record_operation(&self, event: LifecycleMetricEvent);
    /// Records a latency observation for the operation.
    fn record_latency(&self, event: LifecycleMetricEvent, latency: Duration);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
pub struct NoopMetrics;

impl LifecycleMetrics for NoopMetrics {
    fn record_operation(&self, _event: LifecycleMetricEvent) {}

    fn record_latency(&self, _event: LifecycleMetricEvent, _latency: Duration) {}
}
