//! Ledger client interface and the in-process simulated ledger.

mod simulated;
mod traits;
mod types;

pub use simulated::{is_hex_address, SimulatedLedger};
pub use traits::LedgerClient;
pub use types::{LedgerError, TransferReceipt, WalletInfo};
