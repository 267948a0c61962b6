//! Corrective actions after a cash step and a ledger step disagree.
//!
//! Neither action is a transaction. Returning deposited cash is tried
//! once; reversing a debit is retried up to a fixed bound and may still
//! fail, in which case the caller must escalate.

use super::error::CashReturn;
use crate::bank::{Account, User};
use crate::providers::{CashUnit, LedgerError, LedgerService};

/// Outcome of trying to reverse a debit.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Recredit {
    /// The ledger accepted the re-credit on attempt `attempts`
    Restored { attempts: usize },
    /// Every attempt was refused
    Exhausted {
        attempts: usize,
        last_error: Option<LedgerError>,
    },
}

/// Re-credit `amount` to undo a debit, trying at most `max_attempts` times.
pub(crate) fn recredit(
    ledger: &dyn LedgerService,
    user: &User,
    account: &Account,
    amount: u64,
    max_attempts: usize,
) -> Recredit {
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match ledger.credit(user, account, amount) {
            Ok(()) => {
                tracing::info!(
                    account = account.id(),
                    amount,
                    attempt,
                    "Debit reversed after failed dispense"
                );
                return Recredit::Restored { attempts: attempt };
            }
            Err(err) => {
                tracing::warn!(
                    account = account.id(),
                    amount,
                    attempt,
                    max_attempts,
                    error = %err,
                    "Re-credit attempt failed"
                );
                last_error = Some(err);
            }
        }
    }

    Recredit::Exhausted {
        attempts: max_attempts,
        last_error,
    }
}

/// Hand accepted deposit cash back to the customer. Single attempt.
pub(crate) fn return_cash(unit: &dyn CashUnit, amount: u64) -> CashReturn {
    match unit.dispense(amount) {
        Ok(()) => {
            tracing::info!(amount, "Deposited cash returned to customer");
            CashReturn::Returned
        }
        Err(err) => {
            tracing::error!(amount, error = %err, "Failed to return deposited cash");
            CashReturn::Failed
        }
    }
}
