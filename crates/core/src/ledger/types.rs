use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Decimal, requested: Decimal },

    #[error("transfer rejected: {0}")]
    Rejected(String),

    #[error("transfer not confirmed within {0}s")]
    Timeout(u64),

    #[error("ledger transport error: {0}")]
    Transport(String),

    #[error("ledger not ready")]
    NotReady,
}

/// Confirmed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub tx_id: String,
    pub confirmed_block: u64,
    pub amount: Decimal,
    pub to_address: String,
}

/// Wallet summary for the control surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub address: String,
    pub balance: Decimal,
    pub ready: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = LedgerError::InsufficientFunds {
            balance: dec!(1.5),
            requested: dec!(2),
        };
        assert_eq!(
            err.to_string(),
            "insufficient funds: balance 1.5, requested 2"
        );
        assert_eq!(LedgerError::Timeout(120).to_string(), "transfer not confirmed within 120s");
    }

    #[test]
    fn test_receipt_serializes_amount_as_string() {
        let receipt = TransferReceipt {
            tx_id: "0xabc".to_string(),
            confirmed_block: 7,
            amount: dec!(98),
            to_address: "0x1".to_string(),
        };
        let json = serde_json::to_value(&receipt).unwrap();
        assert_eq!(json["amount"], "98");
        assert_eq!(json["confirmed_block"], 7);
    }
}
