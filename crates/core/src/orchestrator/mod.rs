//! Cycle orchestrator for the worker pool.
//!
//! Each cycle visits the active workers in pool order:
//! - **Discover**: ask the worker's task source for work
//! - **Execute**: run up to `max_tasks_per_worker` tasks sequentially
//! - **Aggregate**: successful tasks are credited as they complete
//! - **Sleep**: wait for the next cycle, or the error backoff after a failure

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::Orchestrator;
pub use types::{CyclePhase, CycleStats, OrchestratorError, OrchestratorStats, OrchestratorStatus};
