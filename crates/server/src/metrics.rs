//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the taskmill server:
//! - HTTP request metrics (latency, counts, errors)
//! - Authentication failures
//! - Orchestrator and worker status (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use regex_lite::Regex;

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
            "taskmill_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("taskmill_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "taskmill_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "taskmill_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Orchestrator Metrics (collected dynamically)
// =============================================================================

/// Whether the cycle loop is running.
pub static ORCHESTRATOR_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "taskmill_orchestrator_running",
        "Whether the orchestrator is running (1) or stopped (0)",
    )
    .unwrap()
});

/// Completed cycles as seen by the orchestrator.
pub static ORCHESTRATOR_CYCLES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "taskmill_orchestrator_cycle_count",
        "Cycles started since the process began",
    )
    .unwrap()
});

/// Worker activity flag by worker.
pub static WORKER_ACTIVE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "taskmill_worker_active",
            "Whether a worker is active (1) or deactivated (0)",
        ),
        &["worker"],
    )
    .unwrap()
});

/// Register all metrics with the registry.
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
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();

    // Orchestrator
    registry
        .register(Box::new(ORCHESTRATOR_RUNNING.clone()))
        .unwrap();
    registry
        .register(Box::new(ORCHESTRATOR_CYCLES.clone()))
        .unwrap();
    registry.register(Box::new(WORKER_ACTIVE.clone())).unwrap();

    // Core metrics (cycles, workers, payouts)
    for metric in taskmill_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update gauges with current values
/// from the orchestrator and its workers.
pub async fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let Some(orchestrator) = state.orchestrator() else {
        ORCHESTRATOR_RUNNING.set(0);
        return;
    };

    let status = orchestrator.status().await;
    ORCHESTRATOR_RUNNING.set(if status.running { 1 } else { 0 });
    ORCHESTRATOR_CYCLES.set(status.cycle_count as i64);

    for worker in orchestrator.pool().workers() {
        WORKER_ACTIVE
            .with_label_values(&[worker.name()])
            .set(if worker.is_active() { 1 } else { 0 });
    }
}

static WORKER_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/workers/[^/]+").unwrap());
static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace names and IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = WORKER_SEGMENT.replace_all(path, "/workers/{name}");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_worker_name() {
        let path = "/api/v1/workers/scribe/deactivate";
        assert_eq!(normalize_path(path), "/api/v1/workers/{name}/deactivate");
    }

    #[test]
    fn test_normalize_path_numeric() {
        let path = "/api/v1/tasks/12345";
        assert_eq!(normalize_path(path), "/api/v1/tasks/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/health";
        assert_eq!(normalize_path(path), "/api/v1/health");
    }

    #[test]
    fn test_encode_includes_core_metrics() {
        taskmill_core::metrics::CYCLES_TOTAL.inc();
        let output = encode_metrics();
        assert!(output.contains("taskmill_cycles_total"));
        assert!(output.contains("taskmill_http_requests_in_flight"));
    }
}
