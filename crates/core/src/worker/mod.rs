//! Workers: named executors with capability tags and earnings counters.

mod pool;
mod simulated;
mod stats;
mod traits;
mod types;
#[allow(clippy::module_inception)]
mod worker;

pub use pool::{PoolSnapshot, WorkerPool, WorkerSpec};
pub use simulated::{SimulatedExecutor, SyntheticTaskSource};
pub use stats::{PoolStats, PoolTotals, WorkerCounters};
pub use traits::{TaskExecutor, TaskSource};
pub use types::{Task, TaskOutcome, WorkerError, WorkerSnapshot, WorkerTimeouts};
pub use worker::Worker;
