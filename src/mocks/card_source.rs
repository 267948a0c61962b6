//! Mock card reader.

use crate::card::Card;
use crate::providers::CardSource;

/// Card reader that always reads the same card, or nothing.
#[derive(Debug, Clone)]
pub struct FixedCardSource {
    card: Option<Card>,
}

impl FixedCardSource {
    #[must_use]
    pub fn new(card: Card) -> Self {
        Self { card: Some(card) }
    }

    /// A reader that never produces a card.
    #[must_use]
    pub fn unreadable() -> Self {
        Self { card: None }
    }
}

impl CardSource for FixedCardSource {
    fn read_card(&self) -> Option<Card> {
        self.card.clone()
    }
}
