//! Session phases and the `State` trait they implement.
//!
//! A phase is a pure projection of which session fields are populated.
//! It is never stored on its own; the session derives it on demand, so
//! the phase can never drift from the data it describes.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Trait for values that label a position in a state machine.
///
/// All methods are pure. Implementors must be cheap to clone and
/// serializable so transitions between them can be recorded.
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Name used in logs and audit trails.
    fn name(&self) -> &str;

    /// Check if this is the state a machine starts in.
    ///
    /// Default implementation returns `false`.
    fn is_initial(&self) -> bool {
        false
    }
}

/// Where a customer interaction currently stands.
///
/// Phases are ordered: each one implies every earlier phase has been
/// passed through (a selected account implies an authenticated user,
/// which implies an inserted card).
///
/// # Example
///
/// ```rust
/// use atm_controller::core::{SessionPhase, State};
///
/// let phase = SessionPhase::Authenticated;
/// assert_eq!(phase.name(), "Authenticated");
/// assert!(phase.has_card());
/// assert!(phase.has_user());
/// assert!(!phase.has_account());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No card in the machine
    Idle,
    /// Card read, PIN not yet accepted
    CardInserted,
    /// PIN accepted, no account chosen
    Authenticated,
    /// Account chosen, money operations allowed
    AccountSelected,
}

impl SessionPhase {
    pub fn has_card(self) -> bool {
        self >= Self::CardInserted
    }

    pub fn has_user(self) -> bool {
        self >= Self::Authenticated
    }

    pub fn has_account(self) -> bool {
        self == Self::AccountSelected
    }
}

impl State for SessionPhase {
    fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::CardInserted => "CardInserted",
            Self::Authenticated => "Authenticated",
            Self::AccountSelected => "AccountSelected",
        }
    }

    fn is_initial(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_name_returns_correct_value() {
        assert_eq!(SessionPhase::Idle.name(), "Idle");
        assert_eq!(SessionPhase::CardInserted.name(), "CardInserted");
        assert_eq!(SessionPhase::Authenticated.name(), "Authenticated");
        assert_eq!(SessionPhase::AccountSelected.name(), "AccountSelected");
    }

    #[test]
    fn only_idle_is_initial() {
        assert!(SessionPhase::Idle.is_initial());
        assert!(!SessionPhase::CardInserted.is_initial());
        assert!(!SessionPhase::Authenticated.is_initial());
        assert!(!SessionPhase::AccountSelected.is_initial());
    }

    #[test]
    fn later_phases_imply_earlier_ones() {
        assert!(!SessionPhase::Idle.has_card());
        assert!(SessionPhase::CardInserted.has_card());
        assert!(!SessionPhase::CardInserted.has_user());
        assert!(SessionPhase::Authenticated.has_card());
        assert!(SessionPhase::Authenticated.has_user());
        assert!(!SessionPhase::Authenticated.has_account());
        assert!(SessionPhase::AccountSelected.has_card());
        assert!(SessionPhase::AccountSelected.has_user());
        assert!(SessionPhase::AccountSelected.has_account());
    }

    #[test]
    fn phase_serializes_correctly() {
        let phase = SessionPhase::CardInserted;
        let json = serde_json::to_string(&phase).unwrap();
        assert_eq!(json, "\"CardInserted\"");
        let deserialized: SessionPhase = serde_json::from_str(&json).unwrap();
        assert_eq!(phase, deserialized);
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(SessionPhase::AccountSelected.to_string(), "AccountSelected");
    }
}
