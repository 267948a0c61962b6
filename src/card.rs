//! Card values produced by the card source.
//!
//! A `Card` can only be built through validation, so holding one means the
//! number has the right length and the card had not expired when it was read.
//! Validation accumulates every violation instead of stopping at the first.

use chrono::{Datelike, NaiveDate, Utc};
use std::fmt;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Number of characters in a card number.
pub const CARD_NUMBER_LEN: usize = 16;

/// Digits left visible when a card number is masked.
const VISIBLE_DIGITS: usize = 4;

/// A single reason a card failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardViolation {
    #[error("card number must be {expected} characters (got {actual})")]
    NumberLength { expected: usize, actual: usize },

    #[error("card expired in {year}-{month:02}")]
    Expired { year: i32, month: u32 },
}

/// Errors produced when building a card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("card rejected with {} violation(s): {}", .0.len(), describe(.0))]
    Invalid(Vec<CardViolation>),
}

fn describe(violations: &[CardViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// An inserted bank card.
///
/// # Example
///
/// ```rust
/// use atm_controller::Card;
/// use chrono::NaiveDate;
///
/// let expiration = NaiveDate::from_ymd_opt(2100, 12, 1).unwrap();
/// let card = Card::new("1234567890111213", "111", expiration).unwrap();
///
/// assert_eq!(card.number(), "1234567890111213");
/// assert_eq!(card.masked_number(), "************1213");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Card {
    number: String,
    cvv: String,
    expiration: NaiveDate,
}

impl Card {
    /// Build a card, validating it against today's date.
    pub fn new(
        number: impl Into<String>,
        cvv: impl Into<String>,
        expiration: NaiveDate,
    ) -> Result<Self, CardError> {
        Self::validated_on(number, cvv, expiration, Utc::now().date_naive())
    }

    /// Build a card, validating it against the given date.
    ///
    /// Expiry has month granularity: a card expiring any day in the
    /// current month is still valid.
    pub fn validated_on(
        number: impl Into<String>,
        cvv: impl Into<String>,
        expiration: NaiveDate,
        today: NaiveDate,
    ) -> Result<Self, CardError> {
        let number = number.into();
        let checks = vec![
            check_number(&number),
            check_expiration(expiration, today),
        ];

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(Self {
                number,
                cvv: cvv.into(),
                expiration,
            }),
            Validation::Failure(violations) => Err(CardError::Invalid(
                violations.iter().cloned().collect(),
            )),
        }
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn cvv(&self) -> &str {
        &self.cvv
    }

    pub fn expiration(&self) -> NaiveDate {
        self.expiration
    }

    /// Card number with all but the last four characters hidden.
    pub fn masked_number(&self) -> String {
        let visible_from = self.number.chars().count().saturating_sub(VISIBLE_DIGITS);
        self.number
            .chars()
            .enumerate()
            .map(|(i, c)| if i < visible_from { '*' } else { c })
            .collect()
    }
}

impl fmt::Debug for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Card")
            .field("number", &self.masked_number())
            .field("cvv", &"***")
            .field("expiration", &self.expiration)
            .finish()
    }
}

fn check_number(number: &str) -> Validation<(), NonEmptyVec<CardViolation>> {
    let actual = number.chars().count();
    if actual == CARD_NUMBER_LEN {
        Validation::success(())
    } else {
        Validation::fail(CardViolation::NumberLength {
            expected: CARD_NUMBER_LEN,
            actual,
        })
    }
}

fn check_expiration(
    expiration: NaiveDate,
    today: NaiveDate,
) -> Validation<(), NonEmptyVec<CardViolation>> {
    if (expiration.year(), expiration.month()) < (today.year(), today.month()) {
        Validation::fail(CardViolation::Expired {
            year: expiration.year(),
            month: expiration.month(),
        })
    } else {
        Validation::success(())
    }
}
