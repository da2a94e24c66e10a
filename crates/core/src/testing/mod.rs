//! Testing utilities and mock implementations.
//!
//! Mocks for the worker strategies and the ledger, so the orchestrator,
//! payout guard and control surface can be exercised without timing
//! randomness or a real ledger.
//!
//! # Example
//!
//! ```rust,ignore
//! use taskmill_core::testing::{MockExecutor, MockLedger, MockTaskSource};
//!
//! let source = MockTaskSource::repeating(2, dec!(0.5));
//! let executor = MockExecutor::new();
//! let ledger = MockLedger::new();
//!
//! // Inject failures
//! source.set_next_error(WorkerError::Discovery("offline".into())).await;
//! ledger.set_ready(false).await;
//! ```

mod mock_executor;
mod mock_ledger;
mod mock_task_source;

pub use mock_executor::MockExecutor;
pub use mock_ledger::{MockLedger, RecordedTransfer};
pub use mock_task_source::MockTaskSource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::{MockExecutor, MockTaskSource};
    use crate::auth::AuthRequest;
    use crate::config::{load_config_from_str, Config};
    use crate::worker::{Task, WorkerPool, WorkerSpec, WorkerTimeouts};

    /// Admin key used by [`test_config`].
    pub const ADMIN_KEY: &str = "test-admin-key";

    /// Create a task with reasonable defaults.
    pub fn task(title: &str, reward: Decimal) -> Task {
        Task::new(title, reward, vec!["writing".to_string()])
    }

    /// Request carrying the test admin key.
    pub fn admin_request() -> AuthRequest {
        AuthRequest::local().with_header("X-Admin-Key", ADMIN_KEY)
    }

    /// Config with the test admin key and short timings.
    pub fn test_config() -> Config {
        load_config_from_str(&format!(
            r#"
[auth]
admin_key = "{ADMIN_KEY}"

[orchestrator]
cycle_interval_ms = 20
error_backoff_ms = 20
discovery_timeout_ms = 1000
execution_timeout_ms = 1000
"#
        ))
        .unwrap()
    }

    /// Pool whose workers share one scripted source and one executor.
    pub fn mock_pool(
        names: &[&str],
        source: &Arc<MockTaskSource>,
        executor: &Arc<MockExecutor>,
    ) -> WorkerPool {
        let specs = names
            .iter()
            .map(|name| {
                WorkerSpec::new(
                    name,
                    &["writing"],
                    1.0,
                    source.clone(),
                    executor.clone(),
                )
            })
            .collect();
        WorkerPool::new(specs, WorkerTimeouts::default()).unwrap()
    }
}
