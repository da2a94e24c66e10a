//! Types shared by workers, the pool and the orchestrator.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Errors raised by workers and their strategies.
///
/// Routine task failure is not an error; it is reported through
/// [`TaskOutcome`]. These variants are infrastructure failures.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("duplicate worker name: {0}")]
    DuplicateName(String),

    #[error("worker {worker}: success rate {rate} is outside 0.0-1.0")]
    InvalidSuccessRate { worker: String, rate: f64 },

    #[error("worker {0} has no capabilities")]
    NoCapabilities(String),

    #[error("task discovery failed: {0}")]
    Discovery(String),

    #[error("task execution failed: {0}")]
    Execution(String),
}

/// A unit of work offered to a worker.
///
/// Consumed by exactly one execution attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub reward: Decimal,
    pub capabilities: Vec<String>,
    pub discovered_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with the next process-wide id.
    pub fn new(title: impl Into<String>, reward: Decimal, capabilities: Vec<String>) -> Self {
        Self {
            id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
            title: title.into(),
            reward: reward.max(Decimal::ZERO),
            capabilities,
            discovered_at: Utc::now(),
        }
    }
}

/// Result of one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskOutcome {
    pub success: bool,
    pub earnings: Decimal,
}

impl TaskOutcome {
    pub fn succeeded(earnings: Decimal) -> Self {
        Self {
            success: true,
            earnings,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            earnings: Decimal::ZERO,
        }
    }
}

/// Read-only view of a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerSnapshot {
    pub name: String,
    pub capabilities: BTreeSet<String>,
    pub active: bool,
    pub tasks_completed: u64,
    pub total_earnings: Decimal,
    pub success_rate: f64,
}

/// Bounds on a worker's strategy calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerTimeouts {
    pub discovery: Duration,
    pub execution: Duration,
}

impl Default for WorkerTimeouts {
    fn default() -> Self {
        Self {
            discovery: Duration::from_secs(30),
            execution: Duration::from_secs(120),
        }
    }
}
