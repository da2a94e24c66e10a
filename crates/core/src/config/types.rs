use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::orchestrator::OrchestratorConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub payout: PayoutConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default = "default_workers")]
    pub workers: Vec<WorkerConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Admin credential configuration.
///
/// Every privileged command (payout, stop, worker toggles) must present
/// this key. There is deliberately no "none" method.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub admin_key: SecretString,
}

impl AuthConfig {
    pub fn new(admin_key: impl Into<String>) -> Self {
        Self {
            admin_key: SecretString::from(admin_key.into()),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.admin_key.expose_secret().trim().is_empty()
    }
}

/// Payout fee configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PayoutConfig {
    /// Fee withheld from every payout, in basis points (200 = 2%).
    #[serde(default = "default_fee_rate_bps")]
    pub fee_rate_bps: u32,
}

impl PayoutConfig {
    /// Fee rate as an exact decimal fraction.
    pub fn fee_rate(&self) -> Decimal {
        Decimal::new(self.fee_rate_bps as i64, 4)
    }
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            fee_rate_bps: default_fee_rate_bps(),
        }
    }
}

fn default_fee_rate_bps() -> u32 {
    200
}

/// Simulated ledger configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    /// Address of the wallet the process pays out from.
    #[serde(default = "default_ledger_address")]
    pub address: String,
    /// Starting balance in the ledger's native unit.
    #[serde(default = "default_initial_balance")]
    pub initial_balance: Decimal,
    /// Simulated time until a transfer is confirmed (milliseconds).
    #[serde(default = "default_confirmation_delay_ms")]
    pub confirmation_delay_ms: u64,
    /// Give up waiting for confirmation after this long (seconds).
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            address: default_ledger_address(),
            initial_balance: default_initial_balance(),
            confirmation_delay_ms: default_confirmation_delay_ms(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
        }
    }
}

fn default_ledger_address() -> String {
    "0x00000000000000000000000000000000000a11ce".to_string()
}

fn default_initial_balance() -> Decimal {
    dec!(1000)
}

fn default_confirmation_delay_ms() -> u64 {
    1500
}

fn default_confirmation_timeout_secs() -> u64 {
    120
}

/// One worker in the pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkerConfig {
    pub name: String,
    pub capabilities: Vec<String>,
    /// Nominal probability that a task succeeds (0.0-1.0).
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,
    /// Probability that a discovery call yields a task (0.0-1.0).
    #[serde(default = "default_discovery_chance")]
    pub discovery_chance: f64,
    #[serde(default = "default_min_reward")]
    pub min_reward: Decimal,
    #[serde(default = "default_max_reward")]
    pub max_reward: Decimal,
    /// Simulated I/O latency for discovery and execution (milliseconds).
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

impl WorkerConfig {
    pub fn new(name: &str, capabilities: &[&str], success_rate: f64) -> Self {
        Self {
            name: name.to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            success_rate,
            discovery_chance: default_discovery_chance(),
            min_reward: default_min_reward(),
            max_reward: default_max_reward(),
            latency_ms: default_latency_ms(),
        }
    }
}

fn default_success_rate() -> f64 {
    0.85
}

fn default_discovery_chance() -> f64 {
    0.7
}

fn default_min_reward() -> Decimal {
    dec!(0.001)
}

fn default_max_reward() -> Decimal {
    dec!(0.01)
}

fn default_latency_ms() -> u64 {
    2000
}

/// Built-in pool used when the config file lists no workers.
pub fn default_workers() -> Vec<WorkerConfig> {
    vec![
        WorkerConfig::new("scribe", &["writing", "translation"], 0.9),
        WorkerConfig::new("analyst", &["data-analysis", "research"], 0.85),
        WorkerConfig::new("reviewer", &["code-review", "testing"], 0.8),
        WorkerConfig::new("scout", &["research", "web-scraping"], 0.75),
    ]
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub orchestrator: OrchestratorConfig,
    pub payout: PayoutConfig,
    pub ledger: LedgerConfig,
    pub workers: Vec<WorkerConfig>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub admin_key_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                admin_key_configured: config.auth.is_configured(),
            },
            server: config.server.clone(),
            orchestrator: config.orchestrator.clone(),
            payout: config.payout.clone(),
            ledger: config.ledger.clone(),
            workers: config.workers.clone(),
            logging: config.logging.clone(),
        }
    }
}
