//! Banking backend trait.

use crate::bank::{Account, User};
use crate::card::Card;
use thiserror::Error;

/// Reasons the ledger refuses a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The user is unknown, its token is stale, or the account is not theirs.
    #[error("account {account_id} is not accessible to user {user_id}")]
    OwnershipMismatch { user_id: String, account_id: String },

    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: u64 },

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// System of record for balances and account ownership.
///
/// Implementations must re-validate on every call that `account` belongs
/// to `user` and that the user's secret token is current. The controller
/// never treats its own session state as a substitute for that check.
pub trait LedgerService: Send + Sync {
    /// Check a card and PIN, returning the card holder on success.
    fn validate_credentials(&self, card: &Card, pin: &str) -> Option<User>;

    /// Current balance of `account`.
    ///
    /// # Errors
    ///
    /// - `OwnershipMismatch` if `user` may not access `account`
    /// - `Unavailable` if the backend cannot answer
    fn balance(&self, user: &User, account: &Account) -> Result<i64, LedgerError>;

    /// Add `amount` to `account`. Either fully applied or not at all.
    fn credit(&self, user: &User, account: &Account, amount: u64) -> Result<(), LedgerError>;

    /// Remove `amount` from `account`. Either fully applied or not at all.
    fn debit(&self, user: &User, account: &Account, amount: u64) -> Result<(), LedgerError>;
}
