//! Mock ledger client for testing.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;

use crate::ledger::{LedgerClient, LedgerError, TransferReceipt};

/// A recorded transfer for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTransfer {
    pub to_address: String,
    pub amount: Decimal,
    pub timestamp: chrono::DateTime<Utc>,
}

/// Mock implementation of the LedgerClient trait.
///
/// Provides controllable behavior for testing:
/// - Track transfers for assertions
/// - Toggle readiness
/// - Simulate failures
///
/// Any address starting with `0x` is accepted, so `"0xVALID"` passes.
#[derive(Debug)]
pub struct MockLedger {
    address: String,
    balance: Arc<RwLock<Decimal>>,
    ready: Arc<RwLock<bool>>,
    /// Successful transfers.
    transfers: Arc<RwLock<Vec<RecordedTransfer>>>,
    /// If set, the next transfer will fail with this error.
    next_error: Arc<RwLock<Option<LedgerError>>>,
    attempts: AtomicUsize,
    block: AtomicU64,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            address: "0xMOCKWALLET".to_string(),
            balance: Arc::new(RwLock::new(dec!(1000))),
            ready: Arc::new(RwLock::new(true)),
            transfers: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            attempts: AtomicUsize::new(0),
            block: AtomicU64::new(100),
        }
    }

    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    pub async fn set_balance(&self, balance: Decimal) {
        *self.balance.write().await = balance;
    }

    pub async fn set_next_error(&self, error: LedgerError) {
        *self.next_error.write().await = Some(error);
    }

    pub async fn recorded_transfers(&self) -> Vec<RecordedTransfer> {
        self.transfers.read().await.clone()
    }

    /// Transfer calls, including failed ones.
    pub fn transfer_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn is_ready(&self) -> bool {
        *self.ready.read().await
    }

    async fn balance(&self) -> Result<Decimal, LedgerError> {
        if !self.is_ready().await {
            return Err(LedgerError::NotReady);
        }
        Ok(*self.balance.read().await)
    }

    fn is_valid_address(&self, address: &str) -> bool {
        address.len() > 2 && address.starts_with("0x")
    }

    fn address(&self) -> String {
        self.address.clone()
    }

    async fn transfer(&self, to: &str, amount: Decimal) -> Result<TransferReceipt, LedgerError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }

        self.transfers.write().await.push(RecordedTransfer {
            to_address: to.to_string(),
            amount,
            timestamp: Utc::now(),
        });
        *self.balance.write().await -= amount;

        Ok(TransferReceipt {
            tx_id: format!("0xmock{}", self.attempts.load(Ordering::SeqCst)),
            confirmed_block: self.block.fetch_add(1, Ordering::SeqCst) + 1,
            amount,
            to_address: to.to_string(),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
