//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Reelpilot server:
//! - HTTP request metrics (latency, counts)
//! - Videos by status (collected dynamically)
//! - Poller and autopilot loop state (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use reelpilot_core::{VideoStatus, VideoStore};
use tracing::warn;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reelpilot_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 60.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reelpilot_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reelpilot_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Video Metrics
// =============================================================================

/// Videos by current status (collected dynamically).
pub static VIDEOS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("reelpilot_videos_by_status", "Current video count by status"),
        &["status"],
    )
    .unwrap()
});

// =============================================================================
// Background Loop Metrics
// =============================================================================

/// Whether the status poller loop is running (1 = running, 0 = stopped).
pub static POLLER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reelpilot_poller_running",
        "Whether the status poller is running",
    )
    .unwrap()
});

/// Whether the autopilot loop is running (1 = running, 0 = stopped).
pub static AUTOPILOT_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "reelpilot_autopilot_running",
        "Whether the autopilot loop is running",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Videos
    registry
        .register(Box::new(VIDEOS_BY_STATUS.clone()))
        .unwrap();

    // Background loops
    registry.register(Box::new(POLLER_RUNNING.clone())).unwrap();
    registry
        .register(Box::new(AUTOPILOT_RUNNING.clone()))
        .unwrap();

    // Core metrics (pipeline, poller, autopilot, external services)
    for metric in reelpilot_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update gauges with current values
/// from the video store and the background loops.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    POLLER_RUNNING.set(i64::from(state.poller().is_running()));

    AUTOPILOT_RUNNING.set(i64::from(state.autopilot().is_running()));

    let videos = state.videos();
    for status in VideoStatus::ALL {
        if let Ok(keys) = videos.keys_with_status(status) {
            VIDEOS_BY_STATUS
                .with_label_values(&[status.as_str()])
                .set(keys.len() as i64);
        }
    }
}

/// Normalize a path for metric labels (replace video keys with placeholders).
pub fn normalize_path(path: &str) -> String {
    let key_regex = regex_lite::Regex::new(r"^(/api/v1/videos/)[^/]+").unwrap();
    key_regex.replace(path, "${1}{key}").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_key() {
        let path = "/api/v1/videos/Why%20Cats%20Purr";
        assert_eq!(normalize_path(path), "/api/v1/videos/{key}");
    }

    #[test]
    fn test_normalize_path_key_with_action() {
        let path = "/api/v1/videos/Black%20Holes%20-%20Part%202/retry";
        assert_eq!(normalize_path(path), "/api/v1/videos/{key}/retry");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/v1/videos"), "/api/v1/videos");
        assert_eq!(normalize_path("/api/v1/autopilot/short"), "/api/v1/autopilot/short");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        // Access metrics to ensure they're initialized
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("reelpilot_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        // Prometheus only outputs vectors that have at least one child
        VIDEOS_BY_STATUS.with_label_values(&["processing"]).set(0);
        POLLER_RUNNING.set(0);
        reelpilot_core::metrics::STATUS_TRANSITIONS
            .with_label_values(&["generated"])
            .inc();

        let output = encode_metrics();

        assert!(output.contains("reelpilot_videos_by_status"));
        assert!(output.contains("reelpilot_poller_running"));
        assert!(output.contains("reelpilot_status_transitions_total"));
    }
}
