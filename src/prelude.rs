//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use layered_state_machine::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Errors
pub use crate::core::error::{Result, StateMachineError};

// Indices and layers
pub use crate::core::index::{StateIndex, StateKey};

// State contract
pub use crate::core::state::{State, StateContext, StateView};

// Step tracking
pub use crate::core::step::{StepTracker, SUB_STEP_FINISH, SUB_STEP_INIT};

// Machines
pub use crate::core::machine::{
    DoubleLayerMachine, MachineBuilder, MachineConfig, MachineHooks, SingleLayerMachine,
    StateMachine, StateMachineCore, TransitionRecord, TripleLayerMachine,
};
