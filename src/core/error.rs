//=========================================================================
// State Machine Errors
//=========================================================================
//
// Failure kinds surfaced by lookups and transitions.
//
// A rejected transition (target leaf refused via `can_change_state`) is
// not an error: it is reported as `Ok(false)` by the transition calls.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::index::StateIndex;

//=== StateMachineError ===================================================

/// Errors returned by state machine lookups and transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateMachineError {
    /// An enum value was used that was never registered on this machine.
    #[error("State {0} is not registered")]
    UnknownState(String),

    /// A raw index was used that has no registered state behind it.
    #[error("State index {0} is not registered")]
    UnknownIndex(StateIndex),

    /// A typed query named an enum type that is not a layer of this machine.
    #[error("Layer {0} is not attached to this machine")]
    UnknownLayer(&'static str),

    /// A transition was requested before `begin_state` ran.
    #[error("State machine is not active. Call begin_state before changing state")]
    NotActive,

    /// `begin_state` was called on a machine that already started.
    #[error("State machine has already been started")]
    AlreadyStarted,

    /// A default-state transition was requested but no default is registered.
    #[error("No default state has been registered")]
    NoDefaultState,

    /// Leaves kept requesting transitions from inside transitions.
    #[error("Transition chain exceeded {limit} requests in a single dispatch")]
    TransitionOverflow { limit: usize },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, StateMachineError>;

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = StateMachineError::UnknownState("ActorState::Zoom".to_string());
        assert_eq!(err.to_string(), "State ActorState::Zoom is not registered");

        let err = StateMachineError::UnknownIndex(StateIndex::new(7));
        assert_eq!(err.to_string(), "State index 7 is not registered");

        let err = StateMachineError::TransitionOverflow { limit: 4 };
        assert!(err.to_string().contains('4'));
    }
}
