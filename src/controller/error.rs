//! Operation outcomes reported by the controller.

use crate::providers::{CashUnitError, LedgerError};
use crate::receipt::DiscrepancyReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Flat result code for every controller outcome.
///
/// Surfaces that cannot carry structured errors (exit codes, status
/// fields, screen messages) map these instead of [`AtmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultCode {
    Ok,
    AlreadyInUse,
    ReaderError,
    NoCard,
    AlreadyAuthenticated,
    InvalidPin,
    NoUser,
    AccountNotOwned,
    NoAccount,
    InvalidAmount,
    CashUnitCapacity,
    CashUnitMismatch,
    CashUnitInsufficient,
    LedgerRejected,
    OwnershipMismatch,
    CashUnitFailure,
}

impl ResultCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::AlreadyInUse => "ALREADY_IN_USE",
            Self::ReaderError => "READER_ERROR",
            Self::NoCard => "NO_CARD",
            Self::AlreadyAuthenticated => "ALREADY_AUTHENTICATED",
            Self::InvalidPin => "INVALID_PIN",
            Self::NoUser => "NO_USER",
            Self::AccountNotOwned => "ACCOUNT_NOT_OWNED",
            Self::NoAccount => "NO_ACCOUNT",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::CashUnitCapacity => "CASH_UNIT_CAPACITY",
            Self::CashUnitMismatch => "CASH_UNIT_MISMATCH",
            Self::CashUnitInsufficient => "CASH_UNIT_INSUFFICIENT",
            Self::LedgerRejected => "LEDGER_REJECTED",
            Self::OwnershipMismatch => "OWNERSHIP_MISMATCH",
            Self::CashUnitFailure => "CASH_UNIT_FAILURE",
        }
    }

    /// Code for any controller result.
    pub fn of<T>(result: &Result<T, AtmError>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(err) => err.code(),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to deposited cash after the ledger refused the credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashReturn {
    /// No cash had been taken in
    NotRequired,
    /// The accepted bills were handed back
    Returned,
    /// The unit could not hand the bills back
    Failed,
}

/// Expected, recoverable failures of controller operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AtmError {
    #[error("a card is already in use")]
    AlreadyInUse,

    #[error("card could not be read")]
    ReaderError,

    #[error("no card inserted")]
    NoCard,

    #[error("a user is already authenticated")]
    AlreadyAuthenticated,

    #[error("invalid PIN")]
    InvalidPin,

    #[error("no user authenticated")]
    NoUser,

    #[error("account {0} is not one of the user's accounts")]
    AccountNotOwned(String),

    #[error("no account selected")]
    NoAccount,

    #[error("amount must be positive (got {0})")]
    InvalidAmount(i64),

    #[error("cash unit has no room for {amount} bills")]
    CashUnitCapacity { amount: u64 },

    #[error("cash unit failed to take the deposit: {0}")]
    CashUnitMismatch(CashUnitError),

    #[error("cash unit holds too few bills for {amount}")]
    CashUnitInsufficient { amount: u64 },

    /// The ledger refused a balance query, credit or debit.
    #[error("ledger rejected the operation: {reason}")]
    LedgerRejected {
        reason: LedgerError,
        cash_return: CashReturn,
    },

    /// Dispense failed after the debit; the debit was reversed.
    #[error("cash unit failed to dispense {amount} bills ({reason}); debit reversed after {recredit_attempts} attempt(s)")]
    CashUnitFailure {
        amount: u64,
        reason: CashUnitError,
        recredit_attempts: usize,
    },

    /// Dispense failed after the debit and the debit could not be reversed.
    #[error("cash unit failed to dispense {} bills and the debit could not be reversed after {} attempt(s); reconciliation required (report {})", .0.amount, .0.attempts, .0.id)]
    UnresolvedDiscrepancy(Box<DiscrepancyReport>),
}

impl AtmError {
    pub fn code(&self) -> ResultCode {
        match self {
            Self::AlreadyInUse => ResultCode::AlreadyInUse,
            Self::ReaderError => ResultCode::ReaderError,
            Self::NoCard => ResultCode::NoCard,
            Self::AlreadyAuthenticated => ResultCode::AlreadyAuthenticated,
            Self::InvalidPin => ResultCode::InvalidPin,
            Self::NoUser => ResultCode::NoUser,
            Self::AccountNotOwned(_) => ResultCode::AccountNotOwned,
            Self::NoAccount => ResultCode::NoAccount,
            Self::InvalidAmount(_) => ResultCode::InvalidAmount,
            Self::CashUnitCapacity { .. } => ResultCode::CashUnitCapacity,
            Self::CashUnitMismatch(_) => ResultCode::CashUnitMismatch,
            Self::CashUnitInsufficient { .. } => ResultCode::CashUnitInsufficient,
            Self::LedgerRejected {
                reason: LedgerError::OwnershipMismatch { .. },
                ..
            } => ResultCode::OwnershipMismatch,
            Self::LedgerRejected { .. } => ResultCode::LedgerRejected,
            Self::CashUnitFailure { .. } | Self::UnresolvedDiscrepancy(_) => {
                ResultCode::CashUnitFailure
            }
        }
    }

    /// True only when money and ledger disagree and a person must step in.
    pub fn requires_reconciliation(&self) -> bool {
        matches!(self, Self::UnresolvedDiscrepancy(_))
    }

    /// The reconciliation report, if this error carries one.
    pub fn discrepancy(&self) -> Option<&DiscrepancyReport> {
        match self {
            Self::UnresolvedDiscrepancy(report) => Some(report.as_ref()),
            _ => None,
        }
    }
}
