//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Pipeline (production runs, retries, uploads)
//! - Status poller (poll outcomes, status transitions, thumbnails)
//! - Autopilot (quota deficits)
//! - External services (collaborator gateway calls)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Opts};

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Production runs by length class and result.
pub static PRODUCTION_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelpilot_production_runs_total", "Total production runs"),
        &["length", "result"], // result: "registered", "kickoff_failed", "error"
    )
    .unwrap()
});

/// Duration of a production run up to kickoff.
pub static PRODUCTION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reelpilot_production_duration_seconds",
            "Duration of a production run from script to kickoff",
        )
        .buckets(vec![1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["length"],
    )
    .unwrap()
});

/// User-triggered retries.
pub static RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelpilot_retries_total", "Total retries of failed videos"),
        &["from_status"],
    )
    .unwrap()
});

/// Upload attempts by result.
pub static UPLOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelpilot_uploads_total", "Total upload attempts"),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

// =============================================================================
// Poller Metrics
// =============================================================================

/// Status transitions by target status.
pub static STATUS_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelpilot_status_transitions_total",
            "Total video status transitions",
        ),
        &["to"],
    )
    .unwrap()
});

/// Poll outcomes.
pub static POLL_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelpilot_poll_outcomes_total", "Total poll outcomes"),
        &["outcome"],
    )
    .unwrap()
});

/// Background thumbnail generations by result.
pub static THUMBNAILS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelpilot_thumbnails_total", "Total thumbnail generations"),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

// =============================================================================
// Autopilot Metrics
// =============================================================================

/// Deficit computed by the last autopilot run.
pub static AUTOPILOT_DEFICIT: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "reelpilot_autopilot_deficit",
            "Quota deficit computed by the last autopilot run",
        ),
        &["length"],
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reelpilot_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 120.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "reelpilot_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Pipeline
        Box::new(PRODUCTION_RUNS.clone()),
        Box::new(PRODUCTION_DURATION.clone()),
        Box::new(RETRIES.clone()),
        Box::new(UPLOADS.clone()),
        // Poller
        Box::new(STATUS_TRANSITIONS.clone()),
        Box::new(POLL_OUTCOMES.clone()),
        Box::new(THUMBNAILS.clone()),
        // Autopilot
        Box::new(AUTOPILOT_DEFICIT.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}
