//=========================================================================
// Layered State Machine: Library Root
//
// A state machine whose states are keyed by one to three enum types
// sharing a single index space.
//
// Responsibilities:
// - Map enum values to dense StateIndex values (`core::index`)
// - Track the current step, sub-step and timers (`core::step`)
// - Define the state contract and its callback context (`core::state`)
// - Register states and orchestrate transitions (`core::machine`)
//
// Typical usage:
// ```
// use layered_state_machine::prelude::*;
//
// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
// enum Door { Open, Closed }
// impl StateKey for Door {}
//
// struct Shut;
// impl State<()> for Shut {}
//
// struct Ajar;
// impl State<()> for Ajar {}
//
// let mut machine: SingleLayerMachine<Door> = StateMachine::new();
// machine.register_state(Door::Closed, Shut, true);
// machine.register_state(Door::Open, Ajar, false);
// machine.begin_state(&mut (), Door::Closed).unwrap();
// machine.set_state(&mut (), Door::Open).unwrap();
// assert!(machine.is_current_state(Door::Open));
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds every subsystem. Most code only needs the prelude.
//
pub mod core;
pub mod prelude;

//--- Public Exports ------------------------------------------------------

pub use crate::core::error::{Result, StateMachineError};
pub use crate::core::machine::{MachineBuilder, StateMachine, StateMachineCore};
