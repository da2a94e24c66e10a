//! Mock task source for testing.

use std::collections::{BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::worker::{Task, TaskSource, WorkerError};

/// Mock implementation of the TaskSource trait.
///
/// Returns scripted batches in order; once the script is exhausted every
/// call yields `repeat_count` fresh tasks (zero by default).
#[derive(Debug, Default)]
pub struct MockTaskSource {
    /// Scripted batches, consumed front to back.
    batches: Arc<RwLock<VecDeque<Vec<Task>>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<WorkerError>>>,
    /// If set, every call fails with a discovery error.
    always_fail: Arc<RwLock<Option<String>>>,
    /// Worker names in call order.
    calls: Arc<RwLock<Vec<String>>>,
    call_count: AtomicUsize,
    repeat_count: usize,
    repeat_reward: Decimal,
    delay: Duration,
}

impl MockTaskSource {
    /// Create a source that finds nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source that yields `count` tasks worth `reward` on every call.
    pub fn repeating(count: usize, reward: Decimal) -> Self {
        Self {
            repeat_count: count,
            repeat_reward: reward,
            ..Self::default()
        }
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queue a batch for a future call.
    pub async fn push_tasks(&self, tasks: Vec<Task>) {
        self.batches.write().await.push_back(tasks);
    }

    /// Make the next call fail.
    pub async fn set_next_error(&self, error: WorkerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every call fail until cleared with `None`.
    pub async fn set_always_fail(&self, message: Option<&str>) {
        *self.always_fail.write().await = message.map(str::to_string);
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Worker names that called discover, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }
}

#[async_trait]
impl TaskSource for MockTaskSource {
    async fn discover(
        &self,
        worker: &str,
        capabilities: &BTreeSet<String>,
    ) -> Result<Vec<Task>, WorkerError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.write().await.push(worker.to_string());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if let Some(message) = self.always_fail.read().await.as_ref() {
            return Err(WorkerError::Discovery(message.clone()));
        }

        if let Some(batch) = self.batches.write().await.pop_front() {
            return Ok(batch);
        }

        let tags: Vec<String> = capabilities.iter().cloned().collect();
        Ok((0..self.repeat_count)
            .map(|i| Task::new(format!("{} task {}", worker, i), self.repeat_reward, tags.clone()))
            .collect())
    }
}
