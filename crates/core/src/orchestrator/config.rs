//! Orchestrator configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::worker::WorkerTimeouts;

/// Configuration for the cycle loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Start the cycle loop at boot.
    /// When disabled, the loop can still be started via the API.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Pause between cycles (milliseconds).
    #[serde(default = "default_cycle_interval")]
    pub cycle_interval_ms: u64,

    /// Pause after a failed cycle (milliseconds).
    #[serde(default = "default_error_backoff")]
    pub error_backoff_ms: u64,

    /// Tasks taken from each worker's discovery per cycle.
    #[serde(default = "default_max_tasks_per_worker")]
    pub max_tasks_per_worker: usize,

    /// Discovery calls slower than this yield no tasks (milliseconds).
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout_ms: u64,

    /// Executions slower than this count as failed (milliseconds).
    #[serde(default = "default_execution_timeout")]
    pub execution_timeout_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_cycle_interval() -> u64 {
    300_000 // 5 minutes
}

fn default_error_backoff() -> u64 {
    60_000 // 1 minute
}

fn default_max_tasks_per_worker() -> usize {
    2
}

fn default_discovery_timeout() -> u64 {
    30_000
}

fn default_execution_timeout() -> u64 {
    120_000
}

impl OrchestratorConfig {
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn worker_timeouts(&self) -> WorkerTimeouts {
        WorkerTimeouts {
            discovery: Duration::from_millis(self.discovery_timeout_ms),
            execution: Duration::from_millis(self.execution_timeout_ms),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            cycle_interval_ms: default_cycle_interval(),
            error_backoff_ms: default_error_backoff(),
            max_tasks_per_worker: default_max_tasks_per_worker(),
            discovery_timeout_ms: default_discovery_timeout(),
            execution_timeout_ms: default_execution_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert!(config.enabled);
        assert_eq!(config.cycle_interval(), Duration::from_secs(300));
        assert_eq!(config.error_backoff(), Duration::from_secs(60));
        assert_eq!(config.max_tasks_per_worker, 2);
        assert_eq!(config.worker_timeouts(), WorkerTimeouts::default());
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            enabled = false
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.cycle_interval_ms, 300_000);
        assert_eq!(config.max_tasks_per_worker, 2);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            enabled = true
            cycle_interval_ms = 10000
            error_backoff_ms = 5000
            max_tasks_per_worker = 3
            discovery_timeout_ms = 1500
            execution_timeout_ms = 2500
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.cycle_interval(), Duration::from_secs(10));
        assert_eq!(config.error_backoff(), Duration::from_secs(5));
        assert_eq!(config.max_tasks_per_worker, 3);
        assert_eq!(
            config.worker_timeouts().discovery,
            Duration::from_millis(1500)
        );
        assert_eq!(
            config.worker_timeouts().execution,
            Duration::from_millis(2500)
        );
    }
}
