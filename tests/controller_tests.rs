//! End-to-end controller behaviour against the in-memory collaborators.

use atm_controller::mocks::{fixtures, FixedCardSource, InMemoryCashUnit, InMemoryLedger};
use atm_controller::{
    AtmError, CashReturn, CashUnitError, Controller, ControllerConfig, LedgerError, ResultCode,
    SessionPhase, TransactionKind,
};

struct Rig {
    atm: Controller,
    ledger: InMemoryLedger,
    cash: InMemoryCashUnit,
}

fn rig() -> Rig {
    let ledger = fixtures::ledger();
    let cash = fixtures::cash_unit();
    let atm = Controller::builder(fixtures::card_source(), ledger.clone())
        .cash_unit(cash.clone())
        .build();
    Rig { atm, ledger, cash }
}

fn selected_rig() -> Rig {
    let mut rig = rig();
    rig.atm.insert_card().unwrap();
    rig.atm.validate_pin(fixtures::PIN).unwrap();
    rig.atm.select_account(fixtures::CHECKING_ID).unwrap();
    rig
}

#[test]
fn reference_scenario() {
    let mut atm = Controller::builder(fixtures::card_source(), fixtures::ledger()).build();

    assert_eq!(ResultCode::of(&atm.insert_card()), ResultCode::Ok);
    assert_eq!(ResultCode::of(&atm.validate_pin("8888")), ResultCode::InvalidPin);
    assert_eq!(ResultCode::of(&atm.validate_pin("1234")), ResultCode::Ok);
    assert_eq!(
        ResultCode::of(&atm.validate_pin("1234")),
        ResultCode::AlreadyAuthenticated
    );
    assert_eq!(ResultCode::of(&atm.select_account("0001")), ResultCode::Ok);
    assert_eq!(atm.balance(), Ok(1000));
    assert_eq!(ResultCode::of(&atm.deposit(500)), ResultCode::Ok);
    assert_eq!(atm.balance(), Ok(1500));
    assert_eq!(ResultCode::of(&atm.deposit(-10)), ResultCode::InvalidAmount);
    assert_eq!(atm.balance(), Ok(1500));
}

#[test]
fn fresh_session_rejects_every_guarded_operation() {
    let mut atm = Controller::builder(fixtures::card_source(), fixtures::ledger()).build();

    assert_eq!(atm.validate_pin(fixtures::PIN), Err(AtmError::NoCard));
    assert_eq!(atm.select_account(fixtures::CHECKING_ID), Err(AtmError::NoUser));
    assert_eq!(atm.balance(), Err(AtmError::NoAccount));
    assert_eq!(atm.deposit(10), Err(AtmError::NoAccount));
    assert_eq!(atm.withdraw(10), Err(AtmError::NoAccount));
    assert_eq!(atm.deposit(-10), Err(AtmError::NoAccount));
    assert_eq!(atm.card_number(), "");
    assert_eq!(atm.account_id(), "");
    assert!(atm.accounts().is_empty());
    assert_eq!(atm.release_card(), None);
    assert_eq!(atm.phase(), SessionPhase::Idle);
}

#[test]
fn second_insert_keeps_original_card() {
    let mut atm = Controller::builder(fixtures::card_source(), fixtures::ledger()).build();

    atm.insert_card().unwrap();
    assert_eq!(atm.card_number(), fixtures::CARD_NUMBER);
    assert_eq!(atm.insert_card(), Err(AtmError::AlreadyInUse));
    assert_eq!(atm.card_number(), fixtures::CARD_NUMBER);
}

#[test]
fn unreadable_card_is_a_reader_error() {
    let mut atm = Controller::builder(FixedCardSource::unreadable(), fixtures::ledger()).build();

    assert_eq!(atm.insert_card().map_err(|e| e.code()), Err(ResultCode::ReaderError));
    assert_eq!(atm.card_number(), "");
}

#[test]
fn release_resets_the_whole_session() {
    let mut rig = selected_rig();

    let card = rig.atm.release_card().unwrap();
    assert_eq!(card.number(), fixtures::CARD_NUMBER);
    assert_eq!(rig.atm.card_number(), "");
    assert_eq!(rig.atm.account_id(), "");
    assert!(rig.atm.accounts().is_empty());
    assert_eq!(rig.atm.balance(), Err(AtmError::NoAccount));

    // A new customer starts from scratch.
    rig.atm.insert_card().unwrap();
    assert_eq!(rig.atm.phase(), SessionPhase::CardInserted);
}

#[test]
fn accounts_are_listed_after_authentication() {
    let mut atm = Controller::builder(fixtures::card_source(), fixtures::ledger()).build();
    atm.insert_card().unwrap();
    assert!(atm.accounts().is_empty());

    atm.validate_pin(fixtures::PIN).unwrap();
    let ids: Vec<_> = atm.accounts().iter().map(|a| a.id().to_string()).collect();
    assert_eq!(ids, vec![fixtures::CHECKING_ID, fixtures::SAVING_ID]);
}

#[test]
fn unknown_account_is_not_owned() {
    let mut atm = Controller::builder(fixtures::card_source(), fixtures::ledger()).build();
    atm.insert_card().unwrap();
    atm.validate_pin(fixtures::PIN).unwrap();

    assert_eq!(
        atm.select_account("0003"),
        Err(AtmError::AccountNotOwned("0003".to_string()))
    );
    assert_eq!(atm.account_id(), "");
    assert_eq!(atm.phase(), SessionPhase::Authenticated);
}

#[test]
fn read_accessors_are_idempotent() {
    let rig = selected_rig();

    assert_eq!(rig.atm.balance(), rig.atm.balance());
    assert_eq!(rig.atm.account_id(), rig.atm.account_id());
    assert_eq!(rig.atm.card_number(), rig.atm.card_number());
    assert_eq!(rig.atm.history().transitions().len(), 3);
}

#[test]
fn deposit_moves_cash_and_ledger_together() {
    let mut rig = selected_rig();

    let receipt = rig.atm.deposit(300).unwrap();
    assert_eq!(receipt.kind, TransactionKind::Deposit);
    assert_eq!(receipt.card, "************1213");
    assert_eq!(rig.atm.balance(), Ok(1300));
    assert_eq!(rig.cash.holding(), fixtures::CASH_HOLDING + 300);
}

#[test]
fn deposit_beyond_capacity_is_refused_before_touching_anything() {
    let mut rig = selected_rig();

    assert_eq!(
        rig.atm.deposit(1001),
        Err(AtmError::CashUnitCapacity { amount: 1001 })
    );
    assert_eq!(rig.cash.holding(), fixtures::CASH_HOLDING);
    assert_eq!(rig.ledger.credit_calls(), 0);
}

#[test]
fn failed_accept_is_a_cash_unit_mismatch() {
    let mut rig = selected_rig();
    rig.cash.fail_next_accepts(1);

    let err = rig.atm.deposit(100).unwrap_err();
    assert_eq!(err.code(), ResultCode::CashUnitMismatch);
    assert_eq!(rig.ledger.credit_calls(), 0);
    assert_eq!(rig.atm.balance(), Ok(fixtures::CHECKING_BALANCE));
}

#[test]
fn rejected_credit_hands_cash_back() {
    let mut rig = selected_rig();
    rig.ledger.fail_next_credits(1);

    let err = rig.atm.deposit(200).unwrap_err();
    assert_eq!(err.code(), ResultCode::LedgerRejected);
    assert!(matches!(
        err,
        AtmError::LedgerRejected {
            cash_return: CashReturn::Returned,
            ..
        }
    ));
    assert_eq!(rig.cash.holding(), fixtures::CASH_HOLDING);
    assert_eq!(rig.atm.balance(), Ok(fixtures::CHECKING_BALANCE));
}

#[test]
fn rejected_credit_without_cash_unit_returns_nothing() {
    let ledger = fixtures::ledger();
    let mut atm = Controller::builder(fixtures::card_source(), ledger.clone()).build();
    atm.insert_card().unwrap();
    atm.validate_pin(fixtures::PIN).unwrap();
    atm.select_account(fixtures::CHECKING_ID).unwrap();
    ledger.fail_next_credits(1);

    let err = atm.deposit(200).unwrap_err();
    assert_eq!(err.code(), ResultCode::LedgerRejected);
    assert!(matches!(
        err,
        AtmError::LedgerRejected {
            reason: LedgerError::Unavailable(_),
            cash_return: CashReturn::NotRequired,
        }
    ));
    assert_eq!(ledger.credit_calls(), 1);
    assert_eq!(atm.balance(), Ok(fixtures::CHECKING_BALANCE));
}

#[test]
fn overflowing_deposit_is_rejected_and_ledger_stays_usable() {
    let ledger = fixtures::ledger();
    let mut atm = Controller::builder(fixtures::card_source(), ledger.clone()).build();
    atm.insert_card().unwrap();
    atm.validate_pin(fixtures::PIN).unwrap();
    atm.select_account(fixtures::CHECKING_ID).unwrap();

    let err = atm.deposit(i64::MAX).unwrap_err();
    assert_eq!(err.code(), ResultCode::LedgerRejected);
    assert!(matches!(
        err,
        AtmError::LedgerRejected {
            cash_return: CashReturn::NotRequired,
            ..
        }
    ));
    assert_eq!(atm.balance(), Ok(fixtures::CHECKING_BALANCE));

    atm.deposit(10).unwrap();
    assert_eq!(atm.balance(), Ok(fixtures::CHECKING_BALANCE + 10));
}

#[test]
fn cash_return_failure_is_reported() {
    let mut rig = selected_rig();
    rig.ledger.fail_next_credits(1);
    rig.cash.fail_next_dispenses(1);

    let err = rig.atm.deposit(200).unwrap_err();
    assert!(matches!(
        err,
        AtmError::LedgerRejected {
            cash_return: CashReturn::Failed,
            ..
        }
    ));
    assert_eq!(rig.cash.holding(), fixtures::CASH_HOLDING + 200);
}

#[test]
fn withdraw_moves_cash_and_ledger_together() {
    let mut rig = selected_rig();

    let receipt = rig.atm.withdraw(400).unwrap();
    assert_eq!(receipt.kind, TransactionKind::Withdrawal);
    assert_eq!(receipt.amount, 400);
    assert_eq!(rig.atm.balance(), Ok(600));
    assert_eq!(rig.cash.holding(), fixtures::CASH_HOLDING - 400);
}

#[test]
fn withdraw_beyond_bills_is_refused_before_debit() {
    let ledger = fixtures::ledger();
    let cash = InMemoryCashUnit::new(2000, 50);
    let mut atm = Controller::builder(fixtures::card_source(), ledger.clone())
        .cash_unit(cash.clone())
        .build();
    atm.insert_card().unwrap();
    atm.validate_pin(fixtures::PIN).unwrap();
    atm.select_account(fixtures::CHECKING_ID).unwrap();

    assert_eq!(
        atm.withdraw(100),
        Err(AtmError::CashUnitInsufficient { amount: 100 })
    );
    assert_eq!(ledger.debit_calls(), 0);
    assert_eq!(cash.holding(), 50);
}

#[test]
fn overdraft_is_rejected_by_ledger() {
    let mut rig = rig();
    rig.atm.insert_card().unwrap();
    rig.atm.validate_pin(fixtures::PIN).unwrap();
    rig.atm.select_account(fixtures::SAVING_ID).unwrap();

    let err = rig.atm.withdraw(501).unwrap_err();
    assert_eq!(err.code(), ResultCode::LedgerRejected);
    assert!(matches!(
        err,
        AtmError::LedgerRejected {
            reason: LedgerError::InsufficientFunds {
                balance: 500,
                requested: 501
            },
            cash_return: CashReturn::NotRequired,
        }
    ));
    assert_eq!(rig.ledger.debit_calls(), 1);
    assert_eq!(rig.cash.holding(), fixtures::CASH_HOLDING);
    assert_eq!(rig.atm.balance(), Ok(fixtures::SAVING_BALANCE));
}

#[test]
fn failed_dispense_is_reversed_within_bound() {
    let mut rig = selected_rig();
    rig.cash.fail_next_dispenses(1);
    rig.ledger.fail_next_credits(2);

    let err = rig.atm.withdraw(200).unwrap_err();
    assert_eq!(err.code(), ResultCode::CashUnitFailure);
    assert!(!err.requires_reconciliation());
    assert!(matches!(
        err,
        AtmError::CashUnitFailure {
            amount: 200,
            reason: CashUnitError::Mechanical(_),
            recredit_attempts: 3,
        }
    ));
    assert_eq!(rig.atm.balance(), Ok(fixtures::CHECKING_BALANCE));
    assert_eq!(rig.cash.holding(), fixtures::CASH_HOLDING);
}

#[test]
fn exhausted_reversal_reports_discrepancy() {
    let mut rig = selected_rig();
    rig.cash.fail_next_dispenses(1);
    rig.ledger.fail_next_credits(5);

    let err = rig.atm.withdraw(200).unwrap_err();
    assert_eq!(err.code(), ResultCode::CashUnitFailure);
    assert!(err.requires_reconciliation());

    let report = err.discrepancy().unwrap();
    assert_eq!(report.amount, 200);
    assert_eq!(report.attempts, 5);
    assert_eq!(report.account_id, fixtures::CHECKING_ID);
    assert_eq!(report.user_id, fixtures::USER_ID);
    assert_eq!(report.card, "************1213");
    assert!(report.last_ledger_error.is_some());

    assert_eq!(rig.ledger.credit_calls(), 5);
    assert_eq!(rig.atm.balance(), Ok(fixtures::CHECKING_BALANCE - 200));
    assert_eq!(rig.cash.holding(), fixtures::CASH_HOLDING);
}

#[test]
fn compensation_bound_is_configurable() {
    let ledger = fixtures::ledger();
    let cash = fixtures::cash_unit();
    let config = ControllerConfig::from_json(r#"{ "compensation_attempts": 2 }"#).unwrap();
    let mut atm = Controller::builder(fixtures::card_source(), ledger.clone())
        .cash_unit(cash.clone())
        .config(config)
        .build();
    atm.insert_card().unwrap();
    atm.validate_pin(fixtures::PIN).unwrap();
    atm.select_account(fixtures::CHECKING_ID).unwrap();
    cash.fail_next_dispenses(1);
    ledger.fail_next_credits(2);

    let err = atm.withdraw(100).unwrap_err();
    assert_eq!(err.discrepancy().map(|r| r.attempts), Some(2));
    assert_eq!(ledger.credit_calls(), 2);
}

#[test]
fn stale_token_surfaces_ownership_mismatch() {
    let mut rig = selected_rig();
    rig.ledger.rotate_token(fixtures::USER_ID, "rotated");

    assert_eq!(
        rig.atm.balance().map_err(|e| e.code()),
        Err(ResultCode::OwnershipMismatch)
    );
    assert_eq!(
        rig.atm.withdraw(10).map_err(|e| e.code()),
        Err(ResultCode::OwnershipMismatch)
    );

    let err = rig.atm.deposit(10).unwrap_err();
    assert_eq!(err.code(), ResultCode::OwnershipMismatch);
    assert!(matches!(
        err,
        AtmError::LedgerRejected {
            cash_return: CashReturn::Returned,
            ..
        }
    ));
    assert_eq!(rig.cash.holding(), fixtures::CASH_HOLDING);
    assert_eq!(rig.ledger.balance_of(fixtures::CHECKING_ID), Some(fixtures::CHECKING_BALANCE));
}

#[test]
fn receipts_can_be_encoded() {
    let mut rig = selected_rig();

    let receipt = rig.atm.deposit(20).unwrap();
    let json = receipt.to_json().unwrap();
    assert_eq!(atm_controller::Receipt::from_json(&json).unwrap(), receipt);
}
