//! The ATM controller: session lifecycle and customer operations.
//!
//! The controller owns the only [`Session`] and the collaborators. Each
//! operation runs to completion before the next one starts:
//!
//! 1. assert the session invariants
//! 2. check the operation's preconditions against the session phase
//! 3. call collaborators, one step at a time
//! 4. commit session changes only after the step they depend on succeeded
//!
//! Expected failures come back as [`AtmError`]. Only a broken session
//! invariant panics.
//!
//! # Example
//!
//! ```rust
//! use atm_controller::mocks::fixtures;
//! use atm_controller::{Controller, ResultCode};
//!
//! let mut atm = Controller::builder(fixtures::card_source(), fixtures::ledger())
//!     .cash_unit(fixtures::cash_unit())
//!     .build();
//!
//! atm.insert_card().unwrap();
//! assert_eq!(atm.validate_pin("8888").unwrap_err().code(), ResultCode::InvalidPin);
//! atm.validate_pin("1234").unwrap();
//! atm.select_account("0001").unwrap();
//! atm.deposit(500).unwrap();
//! assert_eq!(atm.balance().unwrap(), 1500);
//! ```

mod compensation;
mod config;
mod error;

pub use config::{ConfigError, ControllerBuilder, ControllerConfig, DEFAULT_COMPENSATION_ATTEMPTS};
pub use error::{AtmError, CashReturn, ResultCode};

use crate::bank::Account;
use crate::card::Card;
use crate::core::{Guard, SessionPhase, State, StateHistory};
use crate::providers::{CardSource, CashUnit, CashUnitError, LedgerService};
use crate::receipt::{DiscrepancyReport, Receipt, TransactionKind, RECEIPT_VERSION};
use crate::session::{AccountContext, Session};
use chrono::Utc;
use compensation::Recredit;
use std::mem;
use uuid::Uuid;

/// Phase preconditions shared by the operations.
struct Preconditions {
    no_card: Guard<SessionPhase, AtmError>,
    card: Guard<SessionPhase, AtmError>,
    no_user: Guard<SessionPhase, AtmError>,
    user: Guard<SessionPhase, AtmError>,
}

impl Preconditions {
    fn new() -> Self {
        Self {
            no_card: Guard::new(|p: &SessionPhase| !p.has_card(), AtmError::AlreadyInUse),
            card: Guard::new(|p: &SessionPhase| p.has_card(), AtmError::NoCard),
            no_user: Guard::new(|p: &SessionPhase| !p.has_user(), AtmError::AlreadyAuthenticated),
            user: Guard::new(|p: &SessionPhase| p.has_user(), AtmError::NoUser),
        }
    }
}

/// Mediates one customer at a time between card reader, bank and cash unit.
pub struct Controller {
    card_source: Box<dyn CardSource>,
    ledger: Box<dyn LedgerService>,
    cash_unit: Option<Box<dyn CashUnit>>,
    session: Session,
    config: ControllerConfig,
    preconditions: Preconditions,
}

impl Controller {
    /// Start building a controller around the required collaborators.
    pub fn builder(
        card_source: impl CardSource + 'static,
        ledger: impl LedgerService + 'static,
    ) -> ControllerBuilder {
        ControllerBuilder::new(card_source, ledger)
    }

    pub(crate) fn from_parts(
        card_source: Box<dyn CardSource>,
        ledger: Box<dyn LedgerService>,
        cash_unit: Option<Box<dyn CashUnit>>,
        config: ControllerConfig,
    ) -> Self {
        Self {
            card_source,
            ledger,
            cash_unit,
            session: Session::new(),
            config,
            preconditions: Preconditions::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Phase transitions of the current session.
    pub fn history(&self) -> &StateHistory<SessionPhase> {
        self.session.history()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn has_cash_unit(&self) -> bool {
        self.cash_unit.is_some()
    }

    /// Read a card into an empty session.
    pub fn insert_card(&mut self) -> Result<(), AtmError> {
        self.session.validate();
        self.require(&self.preconditions.no_card, "insert_card")?;

        let Some(card) = self.card_source.read_card() else {
            tracing::warn!("Card reader returned no card");
            return Err(AtmError::ReaderError);
        };

        tracing::info!(card = %card.masked_number(), "Card inserted");
        self.session.insert_card(card);
        Ok(())
    }

    /// Hand back the card and start a brand-new session.
    ///
    /// Returns `None` when no card was inserted; that is not an error.
    pub fn release_card(&mut self) -> Option<Card> {
        self.session.validate();

        let finished = mem::take(&mut self.session);
        let card = finished.into_card();
        match &card {
            Some(card) => tracing::info!(card = %card.masked_number(), "Card released"),
            None => tracing::debug!("Release requested with no card inserted"),
        }
        card
    }

    /// Number of the inserted card, or an empty string.
    pub fn card_number(&self) -> String {
        self.session.validate();
        self.session
            .card()
            .map(|c| c.number().to_string())
            .unwrap_or_default()
    }

    /// Authenticate the card holder with the ledger.
    pub fn validate_pin(&mut self, pin: &str) -> Result<(), AtmError> {
        self.session.validate();
        self.require(&self.preconditions.card, "validate_pin")?;
        self.require(&self.preconditions.no_user, "validate_pin")?;

        let card = self.session.card().ok_or(AtmError::NoCard)?;
        let Some(user) = self.ledger.validate_credentials(card, pin) else {
            tracing::warn!(card = %card.masked_number(), "PIN rejected");
            return Err(AtmError::InvalidPin);
        };

        tracing::info!(user_id = user.id(), "User authenticated");
        self.session.authenticate(user);
        Ok(())
    }

    /// Accounts of the authenticated user, or an empty list.
    pub fn accounts(&self) -> Vec<Account> {
        self.session.validate();
        self.session
            .user()
            .map(|u| u.accounts().to_vec())
            .unwrap_or_default()
    }

    /// Choose one of the authenticated user's accounts.
    pub fn select_account(&mut self, account_id: &str) -> Result<(), AtmError> {
        self.session.validate();
        self.require(&self.preconditions.user, "select_account")?;

        let account = self
            .session
            .user()
            .and_then(|u| u.account(account_id))
            .cloned()
            .ok_or_else(|| {
                tracing::warn!(account = account_id, "Account not owned by user");
                AtmError::AccountNotOwned(account_id.to_string())
            })?;

        tracing::info!(account = account.id(), kind = %account.account_type(), "Account selected");
        self.session.select_account(account);
        Ok(())
    }

    /// Id of the selected account, or an empty string.
    pub fn account_id(&self) -> String {
        self.session.validate();
        self.session
            .account()
            .map(|a| a.id().to_string())
            .unwrap_or_default()
    }

    /// Balance of the selected account as reported by the ledger.
    pub fn balance(&self) -> Result<i64, AtmError> {
        self.session.validate();
        let ctx = self.account_context("balance")?;

        self.ledger.balance(ctx.user, ctx.account).map_err(|reason| {
            tracing::warn!(account = ctx.account.id(), error = %reason, "Balance query rejected");
            AtmError::LedgerRejected {
                reason,
                cash_return: CashReturn::NotRequired,
            }
        })
    }

    /// Deposit `amount` bills into the selected account.
    ///
    /// With a cash unit: check capacity, take the cash, then credit the
    /// ledger. If the credit fails the cash is handed back once.
    pub fn deposit(&mut self, amount: i64) -> Result<Receipt, AtmError> {
        self.session.validate();
        let ctx = self.account_context("deposit")?;
        let amount = positive(amount, "deposit")?;

        if let Some(unit) = &self.cash_unit {
            if !unit.can_deposit(amount) {
                tracing::warn!(amount, "Cash unit cannot take deposit");
                return Err(AtmError::CashUnitCapacity { amount });
            }
            unit.accept(amount).map_err(|err| {
                tracing::warn!(amount, error = %err, "Cash unit failed to accept deposit");
                AtmError::CashUnitMismatch(err)
            })?;
        }

        if let Err(reason) = self.ledger.credit(ctx.user, ctx.account, amount) {
            tracing::warn!(account = ctx.account.id(), amount, error = %reason, "Credit rejected");
            let cash_return = match &self.cash_unit {
                Some(unit) => compensation::return_cash(unit.as_ref(), amount),
                None => CashReturn::NotRequired,
            };
            return Err(AtmError::LedgerRejected {
                reason,
                cash_return,
            });
        }

        tracing::info!(account = ctx.account.id(), amount, "Deposit completed");
        Ok(Receipt::new(
            ctx.card,
            ctx.account.id(),
            TransactionKind::Deposit,
            amount,
        ))
    }

    /// Withdraw `amount` bills from the selected account.
    ///
    /// Debit first, then dispense. If dispensing fails the debit is
    /// re-credited up to the configured number of attempts; if none
    /// succeeds the error carries a [`DiscrepancyReport`].
    pub fn withdraw(&mut self, amount: i64) -> Result<Receipt, AtmError> {
        self.session.validate();
        let ctx = self.account_context("withdraw")?;
        let amount = positive(amount, "withdraw")?;

        if let Some(unit) = &self.cash_unit {
            if !unit.can_withdraw(amount) {
                tracing::warn!(amount, "Cash unit holds too few bills");
                return Err(AtmError::CashUnitInsufficient { amount });
            }
        }

        self.ledger
            .debit(ctx.user, ctx.account, amount)
            .map_err(|reason| {
                tracing::warn!(account = ctx.account.id(), amount, error = %reason, "Debit rejected");
                AtmError::LedgerRejected {
                    reason,
                    cash_return: CashReturn::NotRequired,
                }
            })?;

        if let Some(unit) = &self.cash_unit {
            if let Err(fault) = unit.dispense(amount) {
                tracing::warn!(amount, error = %fault, "Dispense failed after debit");
                return Err(self.reverse_debit(ctx, amount, fault));
            }
        }

        tracing::info!(account = ctx.account.id(), amount, "Withdrawal completed");
        Ok(Receipt::new(
            ctx.card,
            ctx.account.id(),
            TransactionKind::Withdrawal,
            amount,
        ))
    }

    fn reverse_debit(
        &self,
        ctx: AccountContext<'_>,
        amount: u64,
        fault: CashUnitError,
    ) -> AtmError {
        let max_attempts = self.config.compensation_attempts();
        match compensation::recredit(self.ledger.as_ref(), ctx.user, ctx.account, amount, max_attempts) {
            Recredit::Restored { attempts } => AtmError::CashUnitFailure {
                amount,
                reason: fault,
                recredit_attempts: attempts,
            },
            Recredit::Exhausted {
                attempts,
                last_error,
            } => {
                let report = DiscrepancyReport {
                    version: RECEIPT_VERSION,
                    id: Uuid::new_v4(),
                    timestamp: Utc::now(),
                    card: ctx.card.masked_number(),
                    user_id: ctx.user.id().to_string(),
                    account_id: ctx.account.id().to_string(),
                    amount,
                    attempts,
                    dispense_error: fault.to_string(),
                    last_ledger_error: last_error.map(|e| e.to_string()),
                };
                tracing::error!(
                    report = %report.id,
                    account = ctx.account.id(),
                    amount,
                    attempts,
                    "Debit could not be reversed; ledger understates balance until reconciled"
                );
                AtmError::UnresolvedDiscrepancy(Box::new(report))
            }
        }
    }

    fn require(
        &self,
        guard: &Guard<SessionPhase, AtmError>,
        operation: &'static str,
    ) -> Result<(), AtmError> {
        let phase = self.session.phase();
        guard.check(&phase).inspect_err(|err| {
            tracing::warn!(operation, phase = phase.name(), code = %err.code(), "Operation rejected");
        })
    }

    fn account_context(&self, operation: &'static str) -> Result<AccountContext<'_>, AtmError> {
        self.session.account_context().ok_or_else(|| {
            tracing::warn!(operation, phase = self.session.phase().name(), "No account selected");
            AtmError::NoAccount
        })
    }
}

fn positive(amount: i64, operation: &'static str) -> Result<u64, AtmError> {
    match u64::try_from(amount) {
        Ok(bills) if bills > 0 => Ok(bills),
        _ => {
            tracing::warn!(operation, amount, "Rejected non-positive amount");
            Err(AtmError::InvalidAmount(amount))
        }
    }
}
