use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Admin key is not blank
/// - Fee rate below 100%
/// - Orchestrator intervals and task cap are positive
/// - Worker names unique, success rates in range, reward bounds ordered
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    if !config.auth.is_configured() {
        return Err(invalid("auth.admin_key cannot be empty"));
    }

    if config.payout.fee_rate_bps >= 10_000 {
        return Err(invalid("payout.fee_rate_bps must be below 10000"));
    }

    let orchestrator = &config.orchestrator;
    if orchestrator.cycle_interval_ms == 0 {
        return Err(invalid("orchestrator.cycle_interval_ms must be positive"));
    }
    if orchestrator.error_backoff_ms == 0 {
        return Err(invalid("orchestrator.error_backoff_ms must be positive"));
    }
    if orchestrator.discovery_timeout_ms == 0 || orchestrator.execution_timeout_ms == 0 {
        return Err(invalid("orchestrator timeouts must be positive"));
    }
    if orchestrator.max_tasks_per_worker == 0 {
        return Err(invalid("orchestrator.max_tasks_per_worker must be at least 1"));
    }

    if config.workers.is_empty() {
        return Err(invalid("at least one worker must be configured"));
    }

    let mut seen = HashSet::new();
    for worker in &config.workers {
        if worker.name.trim().is_empty() {
            return Err(invalid("worker name cannot be empty"));
        }
        if !seen.insert(worker.name.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate worker name: {}",
                worker.name
            )));
        }
        if worker.capabilities.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "worker {} has no capabilities",
                worker.name
            )));
        }
        if !(0.0..=1.0).contains(&worker.success_rate) {
            return Err(ConfigError::ValidationError(format!(
                "worker {} success_rate must be within 0.0-1.0",
                worker.name
            )));
        }
        if !(0.0..=1.0).contains(&worker.discovery_chance) {
            return Err(ConfigError::ValidationError(format!(
                "worker {} discovery_chance must be within 0.0-1.0",
                worker.name
            )));
        }
        if worker.min_reward.is_sign_negative() || worker.min_reward > worker.max_reward {
            return Err(ConfigError::ValidationError(format!(
                "worker {} reward range is invalid",
                worker.name
            )));
        }
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}
