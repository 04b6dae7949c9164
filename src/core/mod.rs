//=========================================================================
// Core Systems
//=========================================================================
//
// Building blocks of the layered state machine, bottom-up:
//
// - index:   StateIndex, per-enum IndexConverter, LayerTable
// - step:    StepCursor and StepTracker (step/sub-step with timers)
// - state:   the State trait, StateContext, TransitionQueue
// - machine: StateMachineCore and the typed StateMachine facade
// - error:   StateMachineError
//
//=========================================================================

pub mod error;
pub mod index;
pub mod machine;
pub mod state;
pub mod step;
