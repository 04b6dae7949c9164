//=========================================================================
// State Machine
//=========================================================================
//
// The engine that owns registered states and drives transitions, plus
// its configuration, hooks, history and the typed layered facade.
//
// Architecture:
//   MachineBuilder ──build::<L>()──> StateMachine<L, O>   (typed facade)
//                                      └─ StateMachineCore<O>
//                                           ├─ MachineConfig
//                                           ├─ MachineHooks<O>
//                                           └─ TransitionHistory
//
//=========================================================================

//=== Module Declarations =================================================

mod config;
mod engine;
mod history;
mod hooks;
mod layered;

//=== Public API ==========================================================

pub use config::{MachineBuilder, MachineConfig};
pub use engine::StateMachineCore;
pub use history::{TransitionHistory, TransitionRecord};
pub use hooks::MachineHooks;
pub use layered::{
    Contains, DoubleLayerMachine, Layer1, Layer2, Layer3, LayerSet, SingleLayerMachine,
    StateMachine, TripleLayerMachine,
};
