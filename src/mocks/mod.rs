//! In-memory collaborator implementations for testing.
//!
//! Each mock is a cheap `Clone` handle over shared state, so a test can
//! hand one copy to the controller and keep another to inspect balances
//! and cash holdings afterwards. Failure counters let tests inject
//! collaborator faults at precise points of a protocol.

mod card_source;
mod cash_unit;
pub mod fixtures;
mod ledger;

pub use card_source::FixedCardSource;
pub use cash_unit::InMemoryCashUnit;
pub use ledger::InMemoryLedger;
