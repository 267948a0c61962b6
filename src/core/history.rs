//! Phase transition history.
//!
//! Provides immutable tracking of session phase changes over time. Each
//! record carries the operation that caused it so the trail can be read
//! back as an audit log of the customer interaction.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single phase transition.
///
/// # Example
///
/// ```rust
/// use atm_controller::core::{SessionPhase, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: SessionPhase::Idle,
///     to: SessionPhase::CardInserted,
///     timestamp: Utc::now(),
///     operation: "insert_card".to_string(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// When the transition occurred
    pub timestamp: DateTime<Utc>,
    /// Operation that caused the transition
    pub operation: String,
}

/// Ordered history of transitions.
///
/// History is immutable - `record` returns a new history with the
/// transition appended.
///
/// # Example
///
/// ```rust
/// use atm_controller::core::{SessionPhase, StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let history = StateHistory::new();
///
/// let history = history.record(StateTransition {
///     from: SessionPhase::Idle,
///     to: SessionPhase::CardInserted,
///     timestamp: Utc::now(),
///     operation: "insert_card".to_string(),
/// });
///
/// let history = history.record(StateTransition {
///     from: SessionPhase::CardInserted,
///     to: SessionPhase::Authenticated,
///     timestamp: Utc::now(),
///     operation: "validate_pin".to_string(),
/// });
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // Idle -> CardInserted -> Authenticated
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the first transition followed by the
    /// `to` state of every transition, in order.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Operations that caused each transition, in order.
    pub fn operations(&self) -> Vec<&str> {
        self.transitions
            .iter()
            .map(|t| t.operation.as_str())
            .collect()
    }

    /// Calculate total duration from first to last transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    /// Most recent transition, if any.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }

    /// Get all transitions in order.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionPhase;

    fn transition(
        from: SessionPhase,
        to: SessionPhase,
        operation: &str,
    ) -> StateTransition<SessionPhase> {
        StateTransition {
            from,
            to,
            timestamp: Utc::now(),
            operation: operation.to_string(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<SessionPhase> = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert!(history.last().is_none());
    }

    #[test]
    fn record_does_not_mutate_original() {
        let history = StateHistory::new();
        let updated = history.record(transition(
            SessionPhase::Idle,
            SessionPhase::CardInserted,
            "insert_card",
        ));

        assert_eq!(history.transitions().len(), 0);
        assert_eq!(updated.transitions().len(), 1);
    }

    #[test]
    fn path_follows_recorded_order() {
        let history = StateHistory::new()
            .record(transition(SessionPhase::Idle, SessionPhase::CardInserted, "insert_card"))
            .record(transition(
                SessionPhase::CardInserted,
                SessionPhase::Authenticated,
                "validate_pin",
            ))
            .record(transition(
                SessionPhase::Authenticated,
                SessionPhase::AccountSelected,
                "select_account",
            ));

        assert_eq!(
            history.get_path(),
            vec![
                &SessionPhase::Idle,
                &SessionPhase::CardInserted,
                &SessionPhase::Authenticated,
                &SessionPhase::AccountSelected,
            ]
        );
        assert_eq!(
            history.operations(),
            vec!["insert_card", "validate_pin", "select_account"]
        );
        assert_eq!(
            history.last().map(|t| t.to),
            Some(SessionPhase::AccountSelected)
        );
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let history = StateHistory::new()
            .record(StateTransition {
                from: SessionPhase::Idle,
                to: SessionPhase::CardInserted,
                timestamp: start,
                operation: "insert_card".to_string(),
            })
            .record(StateTransition {
                from: SessionPhase::CardInserted,
                to: SessionPhase::Authenticated,
                timestamp: start + chrono::Duration::seconds(3),
                operation: "validate_pin".to_string(),
            });

        assert_eq!(history.duration(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn history_serializes_correctly() {
        let history = StateHistory::new().record(transition(
            SessionPhase::Idle,
            SessionPhase::CardInserted,
            "insert_card",
        ));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<SessionPhase> = serde_json::from_str(&json).unwrap();
        assert_eq!(history, deserialized);
    }
}
