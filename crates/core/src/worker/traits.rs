use std::collections::BTreeSet;

use async_trait::async_trait;

use super::types::{Task, WorkerError};

/// Where a worker finds tasks.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Return tasks matching the given capability set. May be empty.
    async fn discover(
        &self,
        worker: &str,
        capabilities: &BTreeSet<String>,
    ) -> Result<Vec<Task>, WorkerError>;
}

/// How a worker carries out a task.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Attempt the task. `Ok(false)` is a routine failure.
    async fn execute(&self, worker: &str, task: &Task) -> Result<bool, WorkerError>;
}
