//! Collaborator traits consumed by the controller.
//!
//! The controller depends only on these traits. Hardware drivers and bank
//! backends live outside this crate; in-memory versions for tests are in
//! the `mocks` module.
//!
//! All methods take `&self`: collaborators front external systems and
//! manage their own interior state.

mod card_source;
mod cash_unit;
mod ledger;

pub use card_source::CardSource;
pub use cash_unit::{CashUnit, CashUnitError};
pub use ledger::{LedgerError, LedgerService};
