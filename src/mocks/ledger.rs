//! Mock ledger service.

use crate::bank::{Account, User};
use crate::card::Card;
use crate::providers::{LedgerError, LedgerService};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct CardRecord {
    pin: String,
    user_id: String,
}

#[derive(Debug, Default)]
struct Book {
    cards: HashMap<String, CardRecord>,
    users: HashMap<String, User>,
    balances: HashMap<String, i64>,
    failing_credits: usize,
    failing_debits: usize,
    credit_calls: usize,
    debit_calls: usize,
}

impl Book {
    /// Re-check the user's token and account ownership on every call.
    fn authorize(&self, user: &User, account: &Account) -> Result<(), LedgerError> {
        let authorized = self
            .users
            .get(user.id())
            .filter(|known| known.secret_token() == user.secret_token())
            .is_some_and(|known| {
                self.balances.contains_key(account.id())
                    && known.accounts().iter().any(|a| a.id() == account.id())
            });

        if authorized {
            Ok(())
        } else {
            Err(LedgerError::OwnershipMismatch {
                user_id: user.id().to_string(),
                account_id: account.id().to_string(),
            })
        }
    }
}

/// Ledger keeping balances in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    book: Arc<Mutex<Book>>,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn book(&self) -> Result<MutexGuard<'_, Book>, LedgerError> {
        self.book
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger lock poisoned".to_string()))
    }

    /// Register a user; each of their accounts opens with a zero balance
    /// unless it already has one.
    pub fn add_user(&self, user: User) {
        if let Ok(mut book) = self.book() {
            for account in user.accounts() {
                book.balances.entry(account.id().to_string()).or_insert(0);
            }
            book.users.insert(user.id().to_string(), user);
        }
    }

    /// Bind a card number and PIN to a registered user.
    pub fn issue_card(&self, card_number: &str, pin: &str, user_id: &str) {
        if let Ok(mut book) = self.book() {
            book.cards.insert(
                card_number.to_string(),
                CardRecord {
                    pin: pin.to_string(),
                    user_id: user_id.to_string(),
                },
            );
        }
    }

    pub fn set_balance(&self, account_id: &str, balance: i64) {
        if let Ok(mut book) = self.book() {
            book.balances.insert(account_id.to_string(), balance);
        }
    }

    /// Balance as stored, bypassing authorization.
    pub fn balance_of(&self, account_id: &str) -> Option<i64> {
        self.book().ok()?.balances.get(account_id).copied()
    }

    /// Replace a user's secret token, invalidating users issued earlier.
    pub fn rotate_token(&self, user_id: &str, token: &str) {
        if let Ok(mut book) = self.book() {
            if let Some(user) = book.users.get(user_id) {
                let rotated = User::new(user.name(), user.id(), user.accounts().to_vec(), token);
                book.users.insert(user_id.to_string(), rotated);
            }
        }
    }

    /// Make the next `count` credits fail as unavailable.
    pub fn fail_next_credits(&self, count: usize) {
        if let Ok(mut book) = self.book() {
            book.failing_credits = count;
        }
    }

    /// Make the next `count` debits fail as unavailable.
    pub fn fail_next_debits(&self, count: usize) {
        if let Ok(mut book) = self.book() {
            book.failing_debits = count;
        }
    }

    /// Number of `credit` calls received, failed ones included.
    pub fn credit_calls(&self) -> usize {
        self.book().map(|b| b.credit_calls).unwrap_or_default()
    }

    /// Number of `debit` calls received, failed ones included.
    pub fn debit_calls(&self) -> usize {
        self.book().map(|b| b.debit_calls).unwrap_or_default()
    }
}

impl LedgerService for InMemoryLedger {
    fn validate_credentials(&self, card: &Card, pin: &str) -> Option<User> {
        let book = self.book().ok()?;
        let record = book.cards.get(card.number())?;
        if record.pin != pin {
            return None;
        }
        book.users.get(&record.user_id).cloned()
    }

    fn balance(&self, user: &User, account: &Account) -> Result<i64, LedgerError> {
        let book = self.book()?;
        book.authorize(user, account)?;
        Ok(book.balances.get(account.id()).copied().unwrap_or_default())
    }

    fn credit(&self, user: &User, account: &Account, amount: u64) -> Result<(), LedgerError> {
        let mut book = self.book()?;
        book.credit_calls += 1;
        if book.failing_credits > 0 {
            book.failing_credits -= 1;
            return Err(LedgerError::Unavailable("credit timed out".to_string()));
        }
        book.authorize(user, account)?;
        let amount = i64::try_from(amount)
            .map_err(|_| LedgerError::Unavailable(format!("amount {amount} out of range")))?;
        let balance = book.balances.entry(account.id().to_string()).or_insert(0);
        *balance = balance.checked_add(amount).ok_or_else(|| {
            LedgerError::Unavailable(format!("credit of {amount} overflows the balance"))
        })?;
        Ok(())
    }

    fn debit(&self, user: &User, account: &Account, amount: u64) -> Result<(), LedgerError> {
        let mut book = self.book()?;
        book.debit_calls += 1;
        if book.failing_debits > 0 {
            book.failing_debits -= 1;
            return Err(LedgerError::Unavailable("debit timed out".to_string()));
        }
        book.authorize(user, account)?;
        let balance = book.balances.get(account.id()).copied().unwrap_or_default();
        let requested = i64::try_from(amount).unwrap_or(i64::MAX);
        if balance < requested {
            return Err(LedgerError::InsufficientFunds {
                balance,
                requested: amount,
            });
        }
        book.balances.insert(account.id().to_string(), balance - requested);
        Ok(())
    }
}
