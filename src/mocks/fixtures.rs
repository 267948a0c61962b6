//! Reference customer used across tests and demos.
//!
//! One user, Jane Doe, owns a checking account (`0001`, balance 1000) and
//! a savings account (`0002`, balance 500), reachable with card
//! `1234567890111213` and PIN `1234`.

use super::{FixedCardSource, InMemoryCashUnit, InMemoryLedger};
use crate::bank::{Account, AccountType, User};
use crate::card::Card;
use chrono::NaiveDate;

pub const CARD_NUMBER: &str = "1234567890111213";
pub const CVV: &str = "111";
pub const PIN: &str = "1234";
pub const USER_ID: &str = "001";
pub const USER_NAME: &str = "Jane Doe";
pub const SECRET_TOKEN: &str = "uasdhfua";
pub const CHECKING_ID: &str = "0001";
pub const SAVING_ID: &str = "0002";
pub const CHECKING_BALANCE: i64 = 1000;
pub const SAVING_BALANCE: i64 = 500;
pub const CASH_CAPACITY: u64 = 2000;
pub const CASH_HOLDING: u64 = 1000;

pub fn card() -> Card {
    let expiration = NaiveDate::from_ymd_opt(2100, 12, 1).expect("fixture date is valid");
    Card::new(CARD_NUMBER, CVV, expiration).expect("fixture card is valid")
}

pub fn checking() -> Account {
    Account::new(CHECKING_ID, AccountType::Checking)
}

pub fn savings() -> Account {
    Account::new(SAVING_ID, AccountType::Saving)
}

pub fn user() -> User {
    User::new(USER_NAME, USER_ID, vec![checking(), savings()], SECRET_TOKEN)
}

pub fn card_source() -> FixedCardSource {
    FixedCardSource::new(card())
}

/// Ledger holding the reference user, card and balances.
pub fn ledger() -> InMemoryLedger {
    let ledger = InMemoryLedger::new();
    ledger.add_user(user());
    ledger.issue_card(CARD_NUMBER, PIN, USER_ID);
    ledger.set_balance(CHECKING_ID, CHECKING_BALANCE);
    ledger.set_balance(SAVING_ID, SAVING_BALANCE);
    ledger
}

/// Half-full cash unit.
pub fn cash_unit() -> InMemoryCashUnit {
    InMemoryCashUnit::new(CASH_CAPACITY, CASH_HOLDING)
}
