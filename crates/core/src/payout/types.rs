use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum PayoutError {
    #[error("unauthorized")]
    Unauthorized(#[source] AuthError),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("ledger not ready")]
    LedgerNotReady,

    #[error("{0}")]
    Ledger(#[from] LedgerError),
}

impl PayoutError {
    /// Label used for the payout metric.
    pub fn kind(&self) -> &'static str {
        match self {
            PayoutError::Unauthorized(_) => "unauthorized",
            PayoutError::MalformedRequest(_)
            | PayoutError::MissingField(_)
            | PayoutError::InvalidAmount(_)
            | PayoutError::InvalidAddress(_) => "invalid",
            PayoutError::LedgerNotReady => "not_ready",
            PayoutError::Ledger(_) => "ledger_error",
        }
    }
}

/// A failed payout, with the fee split when validation had already passed.
///
/// Only ledger-side failures carry `payout`; authorization and validation
/// failures never reach the point where the split is known.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PayoutFailure {
    pub error: PayoutError,
    pub payout: Option<ValidatedPayout>,
}

impl PayoutFailure {
    pub fn after_validation(error: PayoutError, payout: &ValidatedPayout) -> Self {
        Self {
            error,
            payout: Some(payout.clone()),
        }
    }
}

impl From<PayoutError> for PayoutFailure {
    fn from(error: PayoutError) -> Self {
        Self {
            error,
            payout: None,
        }
    }
}

/// Payout request as received. Fields are optional so that absence is
/// reported as a validation error rather than a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayoutRequest {
    #[serde(default)]
    pub to_address: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

impl PayoutRequest {
    pub fn new(to_address: &str, amount: Decimal) -> Self {
        Self {
            to_address: Some(to_address.to_string()),
            amount: Some(amount),
        }
    }
}

/// A payout that passed validation, with its fee split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedPayout {
    pub to_address: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub net_amount: Decimal,
}

/// Result of a confirmed payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutReceipt {
    pub success: bool,
    pub tx_id: String,
    pub confirmed_block: u64,
    pub to_address: String,
    pub amount: Decimal,
    pub fee: Decimal,
    pub net_amount: Decimal,
    pub fee_rate: Decimal,
}
