//! A named worker bound to a slot on the pool's earnings board.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::stats::PoolStats;
use super::traits::{TaskExecutor, TaskSource};
use super::types::{Task, TaskOutcome, WorkerError, WorkerSnapshot, WorkerTimeouts};
use crate::metrics;

pub struct Worker {
    name: String,
    capabilities: BTreeSet<String>,
    success_rate: f64,
    active: AtomicBool,
    source: Arc<dyn TaskSource>,
    executor: Arc<dyn TaskExecutor>,
    timeouts: WorkerTimeouts,
    board: Arc<PoolStats>,
    slot: usize,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("active", &self.is_active())
            .field("slot", &self.slot)
            .finish()
    }
}

impl Worker {
    /// Workers are only created by the pool, which owns the board.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        capabilities: BTreeSet<String>,
        success_rate: f64,
        source: Arc<dyn TaskSource>,
        executor: Arc<dyn TaskExecutor>,
        timeouts: WorkerTimeouts,
        board: Arc<PoolStats>,
        slot: usize,
    ) -> Result<Self, WorkerError> {
        if !(0.0..=1.0).contains(&success_rate) {
            return Err(WorkerError::InvalidSuccessRate {
                worker: name,
                rate: success_rate,
            });
        }
        if capabilities.is_empty() {
            return Err(WorkerError::NoCapabilities(name));
        }

        Ok(Self {
            name,
            capabilities,
            success_rate,
            active: AtomicBool::new(true),
            source,
            executor,
            timeouts,
            board,
            slot,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Flip the activity flag. Returns the previous value.
    pub fn set_active(&self, active: bool) -> bool {
        self.active.swap(active, Ordering::SeqCst)
    }

    /// Ask the task source for work.
    ///
    /// A source that exceeds the discovery timeout yields no tasks.
    pub async fn discover_tasks(&self) -> Result<Vec<Task>, WorkerError> {
        let discovery = self.source.discover(&self.name, &self.capabilities);
        match tokio::time::timeout(self.timeouts.discovery, discovery).await {
            Ok(Ok(tasks)) => {
                metrics::TASKS_DISCOVERED
                    .with_label_values(&[self.name.as_str()])
                    .inc_by(tasks.len() as u64);
                debug!(worker = %self.name, count = tasks.len(), "Discovered tasks");
                Ok(tasks)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!(
                    worker = %self.name,
                    timeout_ms = self.timeouts.discovery.as_millis() as u64,
                    "Task discovery timed out"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Attempt a task and credit its reward on success.
    ///
    /// Worker counters and the pool aggregate are updated together before
    /// this returns. An execution that exceeds the timeout is a failure.
    /// A negative reward is credited as zero.
    pub async fn execute(&self, task: &Task) -> Result<TaskOutcome, WorkerError> {
        let execution = self.executor.execute(&self.name, task);
        let succeeded = match tokio::time::timeout(self.timeouts.execution, execution).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(worker = %self.name, task_id = task.id, "Task execution timed out");
                metrics::TASK_EXECUTIONS
                    .with_label_values(&[self.name.as_str(), "timeout"])
                    .inc();
                return Ok(TaskOutcome::failed());
            }
        };

        if !succeeded {
            debug!(worker = %self.name, task_id = task.id, title = %task.title, "Task failed");
            metrics::TASK_EXECUTIONS
                .with_label_values(&[self.name.as_str(), "failure"])
                .inc();
            return Ok(TaskOutcome::failed());
        }

        let reward = task.reward.max(Decimal::ZERO);
        let (_, pool_earnings) = self.board.record_success(self.slot, reward).await;
        metrics::TASK_EXECUTIONS
            .with_label_values(&[self.name.as_str(), "success"])
            .inc();
        metrics::EARNINGS_TOTAL.set(pool_earnings.to_f64().unwrap_or_default());
        debug!(
            worker = %self.name,
            task_id = task.id,
            reward = %reward,
            "Task completed"
        );

        Ok(TaskOutcome::succeeded(reward))
    }

    pub async fn snapshot(&self) -> WorkerSnapshot {
        let counters = self.board.worker(self.slot).await;
        WorkerSnapshot {
            name: self.name.clone(),
            capabilities: self.capabilities.clone(),
            active: self.is_active(),
            tasks_completed: counters.tasks_completed,
            total_earnings: counters.total_earnings,
            success_rate: self.success_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockExecutor, MockTaskSource};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn make_worker(
        source: Arc<MockTaskSource>,
        executor: Arc<MockExecutor>,
        timeouts: WorkerTimeouts,
    ) -> (Worker, Arc<PoolStats>) {
        let board = Arc::new(PoolStats::with_slots(1));
        let worker = Worker::new(
            "scribe".to_string(),
            ["writing".to_string()].into_iter().collect(),
            0.9,
            source,
            executor,
            timeouts,
            Arc::clone(&board),
            0,
        )
        .unwrap();
        (worker, board)
    }

    #[test]
    fn test_rejects_out_of_range_success_rate() {
        let result = Worker::new(
            "scribe".to_string(),
            ["writing".to_string()].into_iter().collect(),
            1.01,
            Arc::new(MockTaskSource::new()),
            Arc::new(MockExecutor::new()),
            WorkerTimeouts::default(),
            Arc::new(PoolStats::with_slots(1)),
            0,
        );
        assert!(matches!(
            result,
            Err(WorkerError::InvalidSuccessRate { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_capabilities() {
        let result = Worker::new(
            "idle".to_string(),
            BTreeSet::new(),
            0.5,
            Arc::new(MockTaskSource::new()),
            Arc::new(MockExecutor::new()),
            WorkerTimeouts::default(),
            Arc::new(PoolStats::with_slots(1)),
            0,
        );
        assert!(matches!(result, Err(WorkerError::NoCapabilities(_))));
    }

    #[tokio::test]
    async fn test_successful_execution_credits_worker_and_pool() {
        let (worker, board) = make_worker(
            Arc::new(MockTaskSource::new()),
            Arc::new(MockExecutor::new()),
            WorkerTimeouts::default(),
        );
        let task = Task::new("essay", dec!(0.004), vec!["writing".to_string()]);

        let outcome = worker.execute(&task).await.unwrap();

        assert_eq!(outcome, TaskOutcome::succeeded(dec!(0.004)));
        let snapshot = worker.snapshot().await;
        assert_eq!(snapshot.tasks_completed, 1);
        assert_eq!(snapshot.total_earnings, dec!(0.004));
        let totals = board.totals().await;
        assert_eq!(totals.tasks_completed, 1);
        assert_eq!(totals.total_earnings, dec!(0.004));
    }

    #[tokio::test]
    async fn test_negative_reward_never_lowers_earnings() {
        let (worker, board) = make_worker(
            Arc::new(MockTaskSource::new()),
            Arc::new(MockExecutor::new()),
            WorkerTimeouts::default(),
        );
        worker
            .execute(&Task::new("first", dec!(0.5), vec![]))
            .await
            .unwrap();

        // Built by hand, bypassing the clamp in Task::new
        let task = Task {
            reward: dec!(-1),
            ..Task::new("refund", dec!(0), vec![])
        };
        let outcome = worker.execute(&task).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.earnings, Decimal::ZERO);
        let snapshot = worker.snapshot().await;
        assert_eq!(snapshot.tasks_completed, 2);
        assert_eq!(snapshot.total_earnings, dec!(0.5));
        assert_eq!(board.totals().await.total_earnings, dec!(0.5));
    }

    #[tokio::test]
    async fn test_failed_execution_leaves_counters_untouched() {
        let executor = Arc::new(MockExecutor::new());
        executor.push_outcome(false).await;
        let (worker, board) = make_worker(
            Arc::new(MockTaskSource::new()),
            executor,
            WorkerTimeouts::default(),
        );

        let outcome = worker
            .execute(&Task::new("essay", dec!(1), vec![]))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.earnings, Decimal::ZERO);
        assert_eq!(board.totals().await.tasks_completed, 0);
    }

    #[tokio::test]
    async fn test_execution_timeout_is_routine_failure() {
        let executor = Arc::new(MockExecutor::new().with_delay(Duration::from_millis(200)));
        let timeouts = WorkerTimeouts {
            discovery: Duration::from_secs(1),
            execution: Duration::from_millis(20),
        };
        let (worker, board) = make_worker(Arc::new(MockTaskSource::new()), executor, timeouts);

        let outcome = worker
            .execute(&Task::new("slow", dec!(1), vec![]))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(board.totals().await.tasks_completed, 0);
    }

    #[tokio::test]
    async fn test_executor_error_propagates() {
        let executor = Arc::new(MockExecutor::new());
        executor
            .set_next_error(WorkerError::Execution("sandbox crashed".to_string()))
            .await;
        let (worker, _) = make_worker(
            Arc::new(MockTaskSource::new()),
            executor,
            WorkerTimeouts::default(),
        );

        let result = worker.execute(&Task::new("boom", dec!(1), vec![])).await;
        assert!(matches!(result, Err(WorkerError::Execution(_))));
    }

    #[tokio::test]
    async fn test_discovery_timeout_yields_no_tasks() {
        let source = Arc::new(MockTaskSource::new().with_delay(Duration::from_millis(200)));
        source.push_tasks(vec![Task::new("late", dec!(1), vec![])]).await;
        let timeouts = WorkerTimeouts {
            discovery: Duration::from_millis(20),
            execution: Duration::from_secs(1),
        };
        let (worker, _) = make_worker(source, Arc::new(MockExecutor::new()), timeouts);

        let tasks = worker.discover_tasks().await.unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn test_discovery_error_propagates() {
        let source = Arc::new(MockTaskSource::new());
        source
            .set_next_error(WorkerError::Discovery("feed offline".to_string()))
            .await;
        let (worker, _) = make_worker(
            source.clone(),
            Arc::new(MockExecutor::new()),
            WorkerTimeouts::default(),
        );

        let result = worker.discover_tasks().await;
        assert!(matches!(result, Err(WorkerError::Discovery(_))));
        assert_eq!(source.call_count(), 1);
    }

    #[test]
    fn test_set_active_returns_previous() {
        let (worker, _) = make_worker(
            Arc::new(MockTaskSource::new()),
            Arc::new(MockExecutor::new()),
            WorkerTimeouts::default(),
        );
        assert!(worker.is_active());
        assert!(worker.set_active(false));
        assert!(!worker.is_active());
        assert!(!worker.set_active(true));
    }
}
