//! The in-memory record of one customer interaction.
//!
//! Fields are only set through the `pub(crate)` transition methods, each of
//! which is called by the controller after the collaborator step it guards
//! has succeeded. A session is never emptied in place; releasing the card
//! consumes the session and the controller starts a fresh one.

use crate::bank::{Account, User};
use crate::card::Card;
use crate::core::{SessionPhase, State, StateHistory, StateTransition};
use chrono::Utc;

/// Card, user and account of the current customer.
///
/// Invariants, checked by [`Session::validate`]:
/// - a selected account implies an authenticated user who owns it
/// - an authenticated user implies an inserted card
#[derive(Debug, Default)]
pub struct Session {
    card: Option<Card>,
    user: Option<User>,
    account: Option<Account>,
    history: StateHistory<SessionPhase>,
}

/// Borrowed view of a session that may move money.
#[derive(Debug, Clone, Copy)]
pub struct AccountContext<'a> {
    pub card: &'a Card,
    pub user: &'a User,
    pub account: &'a Account,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn card(&self) -> Option<&Card> {
        self.card.as_ref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    /// Phase transitions recorded since the session started.
    pub fn history(&self) -> &StateHistory<SessionPhase> {
        &self.history
    }

    /// Current phase, derived from which fields are set.
    pub fn phase(&self) -> SessionPhase {
        match (&self.card, &self.user, &self.account) {
            (_, _, Some(_)) => SessionPhase::AccountSelected,
            (_, Some(_), None) => SessionPhase::Authenticated,
            (Some(_), None, None) => SessionPhase::CardInserted,
            (None, None, None) => SessionPhase::Idle,
        }
    }

    /// Assert the session invariants.
    ///
    /// # Panics
    ///
    /// Panics if an account is set without an owning user, or a user is
    /// set without a card. Either means the controller itself is broken.
    pub fn validate(&self) {
        if let Some(account) = &self.account {
            let Some(user) = &self.user else {
                panic!(
                    "session invariant violated: account {} selected without a user",
                    account.id()
                );
            };
            assert!(
                user.owns(account),
                "session invariant violated: account {} not owned by user {}",
                account.id(),
                user.id()
            );
        }
        if let Some(user) = &self.user {
            assert!(
                self.card.is_some(),
                "session invariant violated: user {} authenticated without a card",
                user.id()
            );
        }
    }

    /// True when card, user and account are all present.
    pub fn is_account_operation_allowed(&self) -> bool {
        self.account_context().is_some()
    }

    pub fn account_context(&self) -> Option<AccountContext<'_>> {
        match (&self.card, &self.user, &self.account) {
            (Some(card), Some(user), Some(account)) => Some(AccountContext {
                card,
                user,
                account,
            }),
            _ => None,
        }
    }

    pub(crate) fn insert_card(&mut self, card: Card) {
        let from = self.phase();
        self.card = Some(card);
        self.record("insert_card", from);
    }

    pub(crate) fn authenticate(&mut self, user: User) {
        let from = self.phase();
        self.user = Some(user);
        self.record("validate_pin", from);
    }

    pub(crate) fn select_account(&mut self, account: Account) {
        let from = self.phase();
        self.account = Some(account);
        self.record("select_account", from);
    }

    /// End the session, handing back the card if one was inserted.
    pub(crate) fn into_card(self) -> Option<Card> {
        self.card
    }

    fn record(&mut self, operation: &str, from: SessionPhase) {
        let to = self.phase();
        self.history = self.history.record(StateTransition {
            from,
            to,
            timestamp: Utc::now(),
            operation: operation.to_string(),
        });
        tracing::debug!(operation, from = from.name(), to = to.name(), "Session phase changed");
    }
}
