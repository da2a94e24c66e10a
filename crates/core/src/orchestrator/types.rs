//! Types for the cycle orchestrator.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::worker::{WorkerError, WorkerSnapshot};

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// No worker with that name in the pool.
    #[error("worker not found: {0}")]
    WorkerNotFound(String),

    /// Infrastructure failure inside a cycle.
    #[error("worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    #[default]
    Idle,
    Discovering,
    Executing,
    Aggregating,
    Sleeping,
    Stopped,
}

/// Aggregate statistics for the scheduling loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    pub running: bool,
    pub total_earnings: Decimal,
    pub tasks_completed: u64,
    pub cycle_count: u64,
    pub cycle_errors: u64,
    pub phase: CyclePhase,
    pub last_cycle_started_at: Option<DateTime<Utc>>,
    pub last_cycle_finished_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Cycle statistics plus every worker, read together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorStats {
    pub cycle: CycleStats,
    pub workers: Vec<WorkerSnapshot>,
}

/// Lightweight status for health checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrchestratorStatus {
    pub running: bool,
    pub phase: CyclePhase,
    pub cycle_count: u64,
    pub active_workers: usize,
    pub total_workers: usize,
}

/// What one cycle did.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CycleReport {
    pub discovered: usize,
    pub executed: usize,
    pub succeeded: usize,
    pub earned: Decimal,
    pub interrupted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_stats_default() {
        let stats = CycleStats::default();
        assert!(!stats.running);
        assert_eq!(stats.cycle_count, 0);
        assert_eq!(stats.total_earnings, Decimal::ZERO);
        assert_eq!(stats.phase, CyclePhase::Idle);
    }

    #[test]
    fn test_phase_serialization() {
        let json = serde_json::to_string(&CyclePhase::Aggregating).unwrap();
        assert_eq!(json, "\"aggregating\"");
    }

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::WorkerNotFound("ghost".to_string());
        assert_eq!(err.to_string(), "worker not found: ghost");

        let err = OrchestratorError::from(WorkerError::Discovery("feed offline".to_string()));
        assert_eq!(
            err.to_string(),
            "worker error: task discovery failed: feed offline"
        );
    }
}
