//! Cash dispenser/acceptor trait.

use thiserror::Error;

/// Physical faults reported by a cash unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CashUnitError {
    #[error("cash unit is full: cannot take {requested} bills ({available} slots free)")]
    CapacityExceeded { requested: u64, available: u64 },

    #[error("cash unit holds {held} bills, {requested} requested")]
    InsufficientBills { requested: u64, held: u64 },

    #[error("cash unit mechanical fault: {0}")]
    Mechanical(String),
}

/// Cash storage that accepts deposits and dispenses withdrawals.
///
/// Amounts are whole-bill counts. Every call either fully succeeds or
/// fully fails; partial counts are not modeled.
pub trait CashUnit: Send + Sync {
    /// Whether `amount` more bills fit in the unit.
    fn can_deposit(&self, amount: u64) -> bool;

    /// Whether the unit holds at least `amount` bills.
    fn can_withdraw(&self, amount: u64) -> bool;

    /// Take `amount` bills from the customer into the unit.
    fn accept(&self, amount: u64) -> Result<(), CashUnitError>;

    /// Hand `amount` bills to the customer.
    fn dispense(&self, amount: u64) -> Result<(), CashUnitError>;
}
