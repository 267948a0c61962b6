//! Pure session state machine types.
//!
//! This module contains the side-effect-free part of the controller:
//! - Session phases via the `State` trait
//! - Guard predicates for operation preconditions
//! - Immutable history of phase transitions
//!
//! Nothing in here talks to a collaborator.

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::{SessionPhase, State};
