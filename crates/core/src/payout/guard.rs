//! Admin-gated payouts: authorize, validate, then transfer through the ledger.

use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::types::{
    PayoutError, PayoutFailure, PayoutReceipt, PayoutRequest, ValidatedPayout,
};
use crate::auth::{AuthRequest, Authenticator};
use crate::config::PayoutConfig;
use crate::ledger::LedgerClient;
use crate::metrics;

pub struct PayoutGuard {
    authenticator: Arc<dyn Authenticator>,
    ledger: Arc<dyn LedgerClient>,
    fee_rate: Decimal,
}

impl PayoutGuard {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        ledger: Arc<dyn LedgerClient>,
        config: &PayoutConfig,
    ) -> Self {
        Self {
            authenticator,
            ledger,
            fee_rate: config.fee_rate(),
        }
    }

    pub fn fee_rate(&self) -> Decimal {
        self.fee_rate
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    /// Whether the request carries the admin credential.
    pub async fn authorize(&self, request: &AuthRequest) -> bool {
        self.authenticator.authenticate(request).await.is_ok()
    }

    /// Check the request and compute the fee split. No side effects.
    pub fn validate(&self, request: PayoutRequest) -> Result<ValidatedPayout, PayoutError> {
        let to_address = request
            .to_address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .ok_or(PayoutError::MissingField("to_address"))?;
        let amount = request.amount.ok_or(PayoutError::MissingField("amount"))?;

        if amount <= Decimal::ZERO {
            return Err(PayoutError::InvalidAmount(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        if !self.ledger.is_valid_address(&to_address) {
            return Err(PayoutError::InvalidAddress(to_address));
        }

        let fee = amount * self.fee_rate;
        let net_amount = amount - fee;
        if net_amount <= Decimal::ZERO {
            return Err(PayoutError::InvalidAmount(format!(
                "amount {} leaves nothing after fees",
                amount
            )));
        }

        Ok(ValidatedPayout {
            to_address,
            amount,
            fee,
            net_amount,
        })
    }

    /// Transfer the net amount and wait for confirmation. Never retried.
    pub async fn execute(&self, payout: &ValidatedPayout) -> Result<PayoutReceipt, PayoutError> {
        if !self.ledger.is_ready().await {
            return Err(PayoutError::LedgerNotReady);
        }

        let receipt = self
            .ledger
            .transfer(&payout.to_address, payout.net_amount)
            .await?;

        Ok(PayoutReceipt {
            success: true,
            tx_id: receipt.tx_id,
            confirmed_block: receipt.confirmed_block,
            to_address: receipt.to_address,
            amount: payout.amount,
            fee: payout.fee,
            net_amount: payout.net_amount,
            fee_rate: self.fee_rate,
        })
    }

    /// Full control-surface flow. The credential is checked before the
    /// body is parsed.
    pub async fn submit(
        &self,
        request: &AuthRequest,
        body: &[u8],
    ) -> Result<PayoutReceipt, PayoutError> {
        self.submit_with_breakdown(request, body)
            .await
            .map_err(|failure| failure.error)
    }

    /// Like [`submit`](Self::submit), but a failure after validation keeps
    /// the fee split so the caller can report it.
    pub async fn submit_with_breakdown(
        &self,
        request: &AuthRequest,
        body: &[u8],
    ) -> Result<PayoutReceipt, PayoutFailure> {
        let started = Instant::now();
        let result = self.submit_inner(request, body).await;

        let label = match &result {
            Ok(_) => "success",
            Err(failure) => failure.error.kind(),
        };
        metrics::PAYOUTS_TOTAL.with_label_values(&[label]).inc();
        metrics::PAYOUT_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());

        match &result {
            Ok(receipt) => info!(
                tx_id = %receipt.tx_id,
                to = %receipt.to_address,
                net_amount = %receipt.net_amount,
                fee = %receipt.fee,
                "Payout confirmed"
            ),
            Err(failure) => match &failure.error {
                PayoutError::Unauthorized(e) => {
                    warn!(source_ip = %request.source_ip, "Payout rejected: {}", e)
                }
                e @ (PayoutError::Ledger(_) | PayoutError::LedgerNotReady) => {
                    error!("Payout failed: {}", e)
                }
                e => warn!("Payout rejected: {}", e),
            },
        }

        result
    }

    async fn submit_inner(
        &self,
        request: &AuthRequest,
        body: &[u8],
    ) -> Result<PayoutReceipt, PayoutFailure> {
        self.authenticator
            .authenticate(request)
            .await
            .map_err(PayoutError::Unauthorized)?;

        let parsed: PayoutRequest = serde_json::from_slice(body)
            .map_err(|e| PayoutError::MalformedRequest(e.to_string()))?;
        let payout = self.validate(parsed)?;
        self.execute(&payout)
            .await
            .map_err(|e| PayoutFailure::after_validation(e, &payout))
    }
}
