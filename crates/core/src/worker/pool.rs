//! Fixed, ordered pool of workers sharing one earnings board.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use super::simulated::{SimulatedExecutor, SyntheticTaskSource};
use super::stats::{PoolStats, PoolTotals};
use super::traits::{TaskExecutor, TaskSource};
use super::types::{WorkerError, WorkerSnapshot, WorkerTimeouts};
use super::worker::Worker;
use crate::config::WorkerConfig;

/// Everything needed to build one worker.
pub struct WorkerSpec {
    pub name: String,
    pub capabilities: Vec<String>,
    pub success_rate: f64,
    pub source: Arc<dyn TaskSource>,
    pub executor: Arc<dyn TaskExecutor>,
}

impl WorkerSpec {
    pub fn new(
        name: &str,
        capabilities: &[&str],
        success_rate: f64,
        source: Arc<dyn TaskSource>,
        executor: Arc<dyn TaskExecutor>,
    ) -> Self {
        Self {
            name: name.to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            success_rate,
            source,
            executor,
        }
    }

    /// Spec backed by the simulated source and executor.
    pub fn simulated(config: &WorkerConfig) -> Self {
        let latency = Duration::from_millis(config.latency_ms);
        Self {
            name: config.name.clone(),
            capabilities: config.capabilities.clone(),
            success_rate: config.success_rate,
            source: Arc::new(SyntheticTaskSource::new(
                config.discovery_chance,
                config.min_reward,
                config.max_reward,
                latency,
            )),
            executor: Arc::new(SimulatedExecutor::new(config.success_rate, latency)),
        }
    }
}

/// Aggregate plus per-worker view, read in one step.
#[derive(Debug, Clone)]
pub struct PoolSnapshot {
    pub tasks_completed: u64,
    pub total_earnings: rust_decimal::Decimal,
    pub workers: Vec<WorkerSnapshot>,
}

#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<Worker>,
    board: Arc<PoolStats>,
}

impl WorkerPool {
    /// Build the pool. Worker order is preserved; names must be unique.
    pub fn new(specs: Vec<WorkerSpec>, timeouts: WorkerTimeouts) -> Result<Self, WorkerError> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if !seen.insert(spec.name.clone()) {
                return Err(WorkerError::DuplicateName(spec.name.clone()));
            }
        }

        let board = Arc::new(PoolStats::with_slots(specs.len()));
        let workers = specs
            .into_iter()
            .enumerate()
            .map(|(slot, spec)| {
                Worker::new(
                    spec.name,
                    spec.capabilities.into_iter().collect::<BTreeSet<_>>(),
                    spec.success_rate,
                    spec.source,
                    spec.executor,
                    timeouts,
                    Arc::clone(&board),
                    slot,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { workers, board })
    }

    /// Build a simulated pool from `[[workers]]` config entries.
    pub fn from_config(
        configs: &[WorkerConfig],
        timeouts: WorkerTimeouts,
    ) -> Result<Self, WorkerError> {
        Self::new(configs.iter().map(WorkerSpec::simulated).collect(), timeouts)
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn get(&self, name: &str) -> Option<&Worker> {
        self.workers.iter().find(|w| w.name() == name)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn board(&self) -> &Arc<PoolStats> {
        &self.board
    }

    /// Consistent snapshot: counters for every worker and the aggregate come
    /// from the same board read.
    pub async fn snapshot(&self) -> PoolSnapshot {
        let PoolTotals {
            tasks_completed,
            total_earnings,
            workers: counters,
        } = self.board.totals().await;

        let workers = self
            .workers
            .iter()
            .map(|worker| {
                let c = counters.get(worker.slot()).copied().unwrap_or_default();
                WorkerSnapshot {
                    name: worker.name().to_string(),
                    capabilities: worker.capabilities().clone(),
                    active: worker.is_active(),
                    tasks_completed: c.tasks_completed,
                    total_earnings: c.total_earnings,
                    success_rate: worker.success_rate(),
                }
            })
            .collect();

        PoolSnapshot {
            tasks_completed,
            total_earnings,
            workers,
        }
    }
}
