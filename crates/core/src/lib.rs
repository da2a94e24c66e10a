pub mod auth;
pub mod config;
pub mod ledger;
pub mod metrics;
pub mod orchestrator;
pub mod payout;
pub mod testing;
pub mod worker;

pub use auth::{
    create_authenticator, AdminKeyAuthenticator, AuthError, AuthRequest, Authenticator, Identity,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, LogFormat,
    SanitizedConfig,
};
pub use ledger::{LedgerClient, LedgerError, SimulatedLedger, TransferReceipt, WalletInfo};
pub use orchestrator::{
    CyclePhase, CycleStats, Orchestrator, OrchestratorConfig, OrchestratorError,
    OrchestratorStats, OrchestratorStatus,
};
pub use payout::{PayoutError, PayoutFailure, PayoutGuard, PayoutReceipt, PayoutRequest, ValidatedPayout};
pub use worker::{
    Task, TaskExecutor, TaskOutcome, TaskSource, Worker, WorkerError, WorkerPool, WorkerSnapshot,
    WorkerSpec,
};
