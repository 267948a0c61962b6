//! ATM controller: a guarded session state machine for teller machines.
//!
//! The crate models the control logic of an automated teller machine. A
//! single [`Session`] tracks the inserted card, the authenticated user and
//! the selected account; the [`Controller`] checks every customer operation
//! against the session phase before it calls out to the bank or the cash
//! hardware.
//!
//! # Core Concepts
//!
//! - **Phase**: where the interaction stands, derived from the session ([`SessionPhase`])
//! - **Guards**: pure phase preconditions that reject out-of-order operations
//! - **History**: immutable audit trail of phase transitions
//! - **Collaborators**: [`CardSource`], [`LedgerService`] and [`CashUnit`] traits
//! - **Compensation**: bounded corrective actions when cash and ledger disagree
//!
//! # Example
//!
//! ```rust
//! use atm_controller::mocks::fixtures;
//! use atm_controller::{AtmError, Controller};
//!
//! let mut atm = Controller::builder(fixtures::card_source(), fixtures::ledger()).build();
//!
//! assert_eq!(atm.deposit(100), Err(AtmError::NoAccount));
//!
//! atm.insert_card().unwrap();
//! atm.validate_pin("1234").unwrap();
//! atm.select_account("0001").unwrap();
//! assert_eq!(atm.balance(), Ok(1000));
//!
//! let card = atm.release_card();
//! assert!(card.is_some());
//! assert_eq!(atm.card_number(), "");
//! ```

pub mod bank;
pub mod card;
pub mod controller;
pub mod core;
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;
pub mod providers;
pub mod receipt;
pub mod session;

// Re-export commonly used types
pub use bank::{Account, AccountType, User};
pub use card::{Card, CardError, CardViolation};
pub use controller::{
    AtmError, CashReturn, ConfigError, Controller, ControllerBuilder, ControllerConfig,
    ResultCode,
};
pub use crate::core::{Guard, SessionPhase, State, StateHistory, StateTransition};
pub use providers::{CardSource, CashUnit, CashUnitError, LedgerError, LedgerService};
pub use receipt::{DiscrepancyReport, Receipt, ReceiptError, TransactionKind};
pub use session::{AccountContext, Session};
