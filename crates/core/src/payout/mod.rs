//! Payout guard: the only path that moves funds.

mod guard;
mod types;

pub use guard::PayoutGuard;
pub use types::{PayoutError, PayoutFailure, PayoutReceipt, PayoutRequest, ValidatedPayout};
