use std::sync::Arc;

use taskmill_core::{
    Authenticator, Config, LedgerClient, Orchestrator, PayoutGuard, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    ledger: Option<Arc<dyn LedgerClient>>,
    orchestrator: Option<Arc<Orchestrator>>,
    payout_guard: Option<PayoutGuard>,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        ledger: Option<Arc<dyn LedgerClient>>,
        orchestrator: Option<Arc<Orchestrator>>,
    ) -> Self {
        let payout_guard = ledger.as_ref().map(|ledger| {
            PayoutGuard::new(
                Arc::clone(&authenticator),
                Arc::clone(ledger),
                &config.payout,
            )
        });

        Self {
            config,
            authenticator,
            ledger,
            orchestrator,
            payout_guard,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn ledger(&self) -> Option<&Arc<dyn LedgerClient>> {
        self.ledger.as_ref()
    }

    pub fn orchestrator(&self) -> Option<&Arc<Orchestrator>> {
        self.orchestrator.as_ref()
    }

    pub fn payout_guard(&self) -> Option<&PayoutGuard> {
        self.payout_guard.as_ref()
    }
}
