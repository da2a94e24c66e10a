//! Mock task executor for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::worker::{Task, TaskExecutor, WorkerError};

/// Mock implementation of the TaskExecutor trait.
///
/// Succeeds unless an outcome has been scripted with `push_outcome`.
#[derive(Debug, Default)]
pub struct MockExecutor {
    /// Scripted outcomes, consumed front to back.
    outcomes: Arc<RwLock<VecDeque<bool>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<WorkerError>>>,
    /// Ids of executed tasks, in order.
    executed: Arc<RwLock<Vec<u64>>>,
    call_count: AtomicUsize,
    delay: Duration,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every execution.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn push_outcome(&self, success: bool) {
        self.outcomes.write().await.push_back(success);
    }

    pub async fn set_next_error(&self, error: WorkerError) {
        *self.next_error.write().await = Some(error);
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub async fn executed(&self) -> Vec<u64> {
        self.executed.read().await.clone()
    }
}

#[async_trait]
impl TaskExecutor for MockExecutor {
    async fn execute(&self, _worker: &str, task: &Task) -> Result<bool, WorkerError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        self.executed.write().await.push(task.id);
        Ok(self.outcomes.write().await.pop_front().unwrap_or(true))
    }
}
