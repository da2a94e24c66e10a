//! Shared earnings board for a worker pool.
//!
//! Per-worker counters and the pool aggregate live behind one lock, so a
//! reader can never observe a worker credited without the aggregate (or
//! a completed count without its earnings).

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::RwLock;

/// Counters for a single worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkerCounters {
    pub tasks_completed: u64,
    pub total_earnings: Decimal,
}

/// Copy of the whole board taken under one read lock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PoolTotals {
    pub tasks_completed: u64,
    pub total_earnings: Decimal,
    /// Indexed by pool slot.
    pub workers: Vec<WorkerCounters>,
}

#[derive(Debug, Default)]
pub struct PoolStats {
    inner: RwLock<PoolTotals>,
}

impl PoolStats {
    pub fn with_slots(slots: usize) -> Self {
        Self {
            inner: RwLock::new(PoolTotals {
                tasks_completed: 0,
                total_earnings: Decimal::ZERO,
                workers: vec![WorkerCounters::default(); slots],
            }),
        }
    }

    /// Credit one completed task to a worker and the aggregate.
    ///
    /// Returns the new aggregate `(tasks_completed, total_earnings)`.
    /// Negative rewards count as zero, so earnings never decrease.
    pub async fn record_success(&self, slot: usize, reward: Decimal) -> (u64, Decimal) {
        let reward = reward.max(Decimal::ZERO);
        let mut board = self.inner.write().await;
        if let Some(counters) = board.workers.get_mut(slot) {
            counters.tasks_completed += 1;
            counters.total_earnings += reward;
            board.tasks_completed += 1;
            board.total_earnings += reward;
        }
        (board.tasks_completed, board.total_earnings)
    }

    pub async fn worker(&self, slot: usize) -> WorkerCounters {
        self.inner
            .read()
            .await
            .workers
            .get(slot)
            .copied()
            .unwrap_or_default()
    }

    pub async fn totals(&self) -> PoolTotals {
        self.inner.read().await.clone()
    }
}
