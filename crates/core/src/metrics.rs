//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Orchestrator (cycles, failures, cycle duration)
//! - Workers (discovery, executions, earnings)
//! - Payouts (results, duration)

use once_cell::sync::Lazy;
use prometheus::{Gauge, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Orchestrator
// =============================================================================

/// Cycles started.
pub static CYCLES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("taskmill_cycles_total", "Total scheduling cycles started").unwrap()
});

/// Cycles aborted by an infrastructure error.
pub static CYCLE_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "taskmill_cycle_errors_total",
        "Total cycles aborted by an error",
    )
    .unwrap()
});

/// Duration of a completed cycle in seconds.
pub static CYCLE_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "taskmill_cycle_duration_seconds",
            "Duration of a completed scheduling cycle",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
    )
    .unwrap()
});

// =============================================================================
// Workers
// =============================================================================

/// Tasks returned by discovery, by worker.
pub static TASKS_DISCOVERED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("taskmill_tasks_discovered_total", "Total tasks discovered"),
        &["worker"],
    )
    .unwrap()
});

/// Execution attempts by worker and result.
pub static TASK_EXECUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "taskmill_task_executions_total",
            "Total task execution attempts",
        ),
        &["worker", "result"], // "success", "failure", "timeout"
    )
    .unwrap()
});

/// Pool earnings since start, in the ledger's native unit.
pub static EARNINGS_TOTAL: Lazy<Gauge> = Lazy::new(|| {
    Gauge::new("taskmill_earnings_total", "Total earnings across all workers").unwrap()
});

// =============================================================================
// Payouts
// =============================================================================

/// Payout requests by result.
pub static PAYOUTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("taskmill_payouts_total", "Total payout requests"),
        &["result"], // "success", "unauthorized", "invalid", "not_ready", "ledger_error"
    )
    .unwrap()
});

/// Payout handling duration in seconds, including confirmation.
pub static PAYOUT_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "taskmill_payout_duration_seconds",
            "Duration of payout handling",
        )
        .buckets(vec![0.01, 0.1, 0.5, 1.0, 2.5, 5.0, 15.0, 30.0, 60.0, 120.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Orchestrator
        Box::new(CYCLES_TOTAL.clone()),
        Box::new(CYCLE_ERRORS.clone()),
        Box::new(CYCLE_DURATION.clone()),
        // Workers
        Box::new(TASKS_DISCOVERED.clone()),
        Box::new(TASK_EXECUTIONS.clone()),
        Box::new(EARNINGS_TOTAL.clone()),
        // Payouts
        Box::new(PAYOUTS_TOTAL.clone()),
        Box::new(PAYOUT_DURATION.clone()),
    ]
}
