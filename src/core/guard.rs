//! Guard predicates for operation preconditions.
//!
//! A guard pairs a pure predicate over a state with the rejection it
//! reports when the predicate does not hold. Guards never mutate anything.

use super::state::State;
use std::fmt;

/// Pure precondition paired with the error it reports.
///
/// # Example
///
/// ```rust
/// use atm_controller::core::{Guard, SessionPhase};
///
/// let needs_card = Guard::new(|p: &SessionPhase| p.has_card(), "no card");
///
/// assert!(needs_card.allows(&SessionPhase::CardInserted));
/// assert_eq!(needs_card.check(&SessionPhase::Idle), Err("no card"));
/// ```
pub struct Guard<S: State, E> {
    predicate: Box<dyn Fn(&S) -> bool + Send + Sync>,
    rejection: E,
}

impl<S: State, E: Clone> Guard<S, E> {
    /// Create a guard from a pure predicate and the error reported when
    /// the predicate fails.
    pub fn new<F>(predicate: F, rejection: E) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
            rejection,
        }
    }

    /// Check if the guard admits this state.
    pub fn allows(&self, state: &S) -> bool {
        (self.predicate)(state)
    }

    /// Check the guard, returning its rejection when the state is not admitted.
    pub fn check(&self, state: &S) -> Result<(), E> {
        if self.allows(state) {
            Ok(())
        } else {
            Err(self.rejection.clone())
        }
    }
}

impl<S: State, E: fmt::Debug> fmt::Debug for Guard<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("rejection", &self.rejection)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionPhase;

    const ALL_PHASES: [SessionPhase; 4] = [
        SessionPhase::Idle,
        SessionPhase::CardInserted,
        SessionPhase::Authenticated,
        SessionPhase::AccountSelected,
    ];

    #[test]
    fn guard_allows_matching_phases() {
        let guard = Guard::new(|p: &SessionPhase| *p == SessionPhase::Idle, "busy");

        assert!(guard.allows(&SessionPhase::Idle));
        assert!(!guard.allows(&SessionPhase::CardInserted));
    }

    #[test]
    fn check_reports_rejection() {
        let guard = Guard::new(|p: &SessionPhase| p.has_user(), "no user");

        assert_eq!(guard.check(&SessionPhase::Authenticated), Ok(()));
        assert_eq!(guard.check(&SessionPhase::CardInserted), Err("no user"));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new(|p: &SessionPhase| !p.has_user(), 1u8);

        for phase in ALL_PHASES {
            assert_eq!(guard.check(&phase), guard.check(&phase));
        }
    }

    #[test]
    fn guard_can_use_complex_predicates() {
        let guard = Guard::new(
            |p: &SessionPhase| p.has_card() && !p.has_user(),
            "wrong phase",
        );

        let admitted: Vec<_> = ALL_PHASES.iter().filter(|p| guard.allows(p)).collect();
        assert_eq!(admitted, vec![&SessionPhase::CardInserted]);
    }
}
