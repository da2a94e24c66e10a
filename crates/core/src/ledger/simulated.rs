//! In-memory ledger with simulated confirmation latency.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::traits::LedgerClient;
use super::types::{LedgerError, TransferReceipt};
use crate::config::LedgerConfig;

static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap());

/// Whether `address` is `0x` followed by 40 hex characters.
pub fn is_hex_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

const GENESIS_BLOCK: u64 = 1_000_000;

pub struct SimulatedLedger {
    address: String,
    balance: Mutex<Decimal>,
    block: AtomicU64,
    ready: AtomicBool,
    confirmation_delay: Duration,
    confirmation_timeout: Duration,
}

impl SimulatedLedger {
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            address: config.address.clone(),
            balance: Mutex::new(config.initial_balance),
            block: AtomicU64::new(GENESIS_BLOCK),
            ready: AtomicBool::new(is_hex_address(&config.address)),
            confirmation_delay: Duration::from_millis(config.confirmation_delay_ms),
            confirmation_timeout: Duration::from_secs(config.confirmation_timeout_secs),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    async fn wait_for_confirmation(&self) -> Result<u64, LedgerError> {
        let confirmation = async {
            tokio::time::sleep(self.confirmation_delay).await;
            self.block.fetch_add(1, Ordering::SeqCst) + 1
        };
        tokio::time::timeout(self.confirmation_timeout, confirmation)
            .await
            .map_err(|_| LedgerError::Timeout(self.confirmation_timeout.as_secs()))
    }
}

#[async_trait]
impl LedgerClient for SimulatedLedger {
    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn balance(&self) -> Result<Decimal, LedgerError> {
        if !self.is_ready().await {
            return Err(LedgerError::NotReady);
        }
        Ok(*self.balance.lock().await)
    }

    fn is_valid_address(&self, address: &str) -> bool {
        is_hex_address(address)
    }

    fn address(&self) -> String {
        self.address.clone()
    }

    async fn transfer(&self, to: &str, amount: Decimal) -> Result<TransferReceipt, LedgerError> {
        if !self.is_ready().await {
            return Err(LedgerError::NotReady);
        }
        if !is_hex_address(to) {
            return Err(LedgerError::Rejected(format!("invalid recipient {}", to)));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Rejected("amount must be positive".to_string()));
        }

        // Debit up front so concurrent transfers cannot overdraw.
        {
            let mut balance = self.balance.lock().await;
            if *balance < amount {
                return Err(LedgerError::InsufficientFunds {
                    balance: *balance,
                    requested: amount,
                });
            }
            *balance -= amount;
        }

        let tx_id = format!("0x{}", uuid::Uuid::new_v4().simple());
        match self.wait_for_confirmation().await {
            Ok(confirmed_block) => {
                info!(tx_id = %tx_id, to = %to, amount = %amount, confirmed_block, "Transfer confirmed");
                Ok(TransferReceipt {
                    tx_id,
                    confirmed_block,
                    amount,
                    to_address: to.to_string(),
                })
            }
            Err(e) => {
                warn!(tx_id = %tx_id, "Transfer not confirmed, refunding");
                *self.balance.lock().await += amount;
                Err(e)
            }
        }
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
