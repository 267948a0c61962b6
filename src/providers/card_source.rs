//! Card reader trait.

use crate::card::Card;

/// Physical card reader.
pub trait CardSource: Send + Sync {
    /// Read the card currently in the slot.
    ///
    /// Returns `None` when the card cannot be read or fails validation.
    /// An unreadable card is an expected outcome, never a panic.
    fn read_card(&self) -> Option<Card>;
}
