//! ATM Session
//!
//! Walks one customer through the reference scenario using the in-memory
//! collaborators, printing the result code of every step.
//!
//! Key concepts:
//! - Phase guards reject out-of-order operations
//! - Deposits and withdrawals go through the cash unit and the ledger
//! - A failed dispense is compensated by re-crediting the ledger
//!
//! Run with: cargo run --example atm_session
//! Set RUST_LOG=atm_controller=debug to see phase transitions.

use atm_controller::mocks::fixtures;
use atm_controller::{AtmError, Controller, ResultCode, State};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn report<T>(step: &str, result: &Result<T, AtmError>) {
    match result {
        Ok(_) => println!("  {step:<28} {}", ResultCode::Ok),
        Err(err) => println!("  {step:<28} {} ({err})", err.code()),
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atm_controller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== ATM Session Example ===\n");

    let ledger = fixtures::ledger();
    let cash = fixtures::cash_unit();
    let mut atm = Controller::builder(fixtures::card_source(), ledger.clone())
        .cash_unit(cash.clone())
        .build();

    report("insert card", &atm.insert_card());
    report("validate PIN 8888", &atm.validate_pin("8888"));
    report("validate PIN 1234", &atm.validate_pin(fixtures::PIN));
    report("validate PIN again", &atm.validate_pin(fixtures::PIN));

    println!("\n  Accounts:");
    for account in atm.accounts() {
        println!("    {} ({})", account.id(), account.account_type());
    }
    println!();

    report("select account 0001", &atm.select_account(fixtures::CHECKING_ID));
    println!("  balance: {:?}", atm.balance());

    let deposit = atm.deposit(500);
    report("deposit 500", &deposit);
    if let Ok(receipt) = &deposit {
        if let Ok(json) = receipt.to_json() {
            println!("  receipt:\n{json}");
        }
    }
    println!("  balance: {:?}", atm.balance());
    report("deposit -10", &atm.deposit(-10));
    println!("  balance: {:?}", atm.balance());

    println!("\n  Simulating a jammed dispenser with a flaky ledger...");
    cash.fail_next_dispenses(1);
    ledger.fail_next_credits(2);
    report("withdraw 200", &atm.withdraw(200));
    println!("  balance: {:?} (cash unit holds {})", atm.balance(), cash.holding());

    println!("\n  Session path:");
    let history = atm.history();
    for phase in history.get_path() {
        let marker = if phase.is_initial() { " (start)" } else { "" };
        println!("    {}{marker}", phase.name());
    }
    if let Some(last) = history.last() {
        println!("  last transition: {} -> {} via {}", last.from, last.to, last.operation);
    }
    if let Some(elapsed) = history.duration() {
        println!("  session length: {elapsed:?}");
    }

    match atm.release_card() {
        Some(card) => println!("\n  Released card {}", card.masked_number()),
        None => println!("\n  No card to release"),
    }
    println!("  card number after release: {:?}", atm.card_number());
}
