//! Randomised task source and executor used by the binary.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::traits::{TaskExecutor, TaskSource};
use super::types::{Task, WorkerError};

/// Largest batch a single discovery call produces.
const MAX_BATCH: usize = 3;

/// Reward precision in decimal places.
const REWARD_SCALE: u32 = 6;

/// Produces synthetic tasks for a worker's capabilities.
#[derive(Debug, Clone)]
pub struct SyntheticTaskSource {
    discovery_chance: f64,
    min_reward: Decimal,
    max_reward: Decimal,
    latency: Duration,
}

impl SyntheticTaskSource {
    pub fn new(
        discovery_chance: f64,
        min_reward: Decimal,
        max_reward: Decimal,
        latency: Duration,
    ) -> Self {
        Self {
            discovery_chance: discovery_chance.clamp(0.0, 1.0),
            min_reward: min_reward.min(max_reward),
            max_reward: max_reward.max(min_reward),
            latency,
        }
    }

    fn roll_tasks(&self, capabilities: &BTreeSet<String>) -> Vec<Task> {
        let mut rng = rand::thread_rng();
        if capabilities.is_empty() || !rng.gen_bool(self.discovery_chance) {
            return Vec::new();
        }

        let caps: Vec<&String> = capabilities.iter().collect();
        let count = rng.gen_range(1..=MAX_BATCH);
        (0..count)
            .map(|_| {
                let capability = caps[rng.gen_range(0..caps.len())];
                let spread = Decimal::from_f64(rng.gen::<f64>()).unwrap_or_default();
                let reward = (self.min_reward + (self.max_reward - self.min_reward) * spread)
                    .round_dp(REWARD_SCALE);
                Task::new(
                    format!("{} job #{}", capability, rng.gen_range(1000..10000)),
                    reward,
                    vec![capability.clone()],
                )
            })
            .collect()
    }
}

#[async_trait]
impl TaskSource for SyntheticTaskSource {
    async fn discover(
        &self,
        _worker: &str,
        capabilities: &BTreeSet<String>,
    ) -> Result<Vec<Task>, WorkerError> {
        tokio::time::sleep(self.latency).await;
        Ok(self.roll_tasks(capabilities))
    }
}

/// Succeeds with a fixed probability after a simulated delay.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    success_rate: f64,
    latency: Duration,
}

impl SimulatedExecutor {
    pub fn new(success_rate: f64, latency: Duration) -> Self {
        Self {
            success_rate: success_rate.clamp(0.0, 1.0),
            latency,
        }
    }
}

#[async_trait]
impl TaskExecutor for SimulatedExecutor {
    async fn execute(&self, _worker: &str, _task: &Task) -> Result<bool, WorkerError> {
        tokio::time::sleep(self.latency).await;
        Ok(rand::thread_rng().gen_bool(self.success_rate))
    }
}
