use async_trait::async_trait;
use rust_decimal::Decimal;

use super::types::{LedgerError, TransferReceipt};

/// Client for the funds ledger the payout wallet lives on.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Whether the client is connected and able to transfer.
    async fn is_ready(&self) -> bool;

    /// Balance of the payout wallet.
    async fn balance(&self) -> Result<Decimal, LedgerError>;

    /// Whether `address` is well-formed for this ledger.
    fn is_valid_address(&self, address: &str) -> bool;

    /// Address of the payout wallet.
    fn address(&self) -> String;

    /// Send `amount` to `to` and wait for confirmation.
    async fn transfer(&self, to: &str, amount: Decimal) -> Result<TransferReceipt, LedgerError>;

    /// Name of this ledger implementation
    fn name(&self) -> &str;
}
