//=========================================================================
// Machine Hooks
//=========================================================================
//
// Machine-level callbacks that run alongside the current state.
//
// Flow per tick:   hooks.on_update() → current.on_update()
// Flow per change: old.on_end() → hooks.on_change_state() → new.on_begin()
// Flow per run:    hooks.on_begin() ... hooks.on_end() on shutdown
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::index::StateIndex;
use crate::core::state::StateView;

//=== MachineHooks ========================================================

/// Callbacks for the machine as a whole rather than one state.
///
/// Every method defaults to doing nothing.
pub trait MachineHooks<O> {
    /// Called by `begin_state` before the initial state is entered.
    fn on_begin(&mut self, _owner: &mut O) {}

    /// Called every tick before the current state's `on_update`.
    fn on_update(&mut self, _owner: &mut O, _view: &StateView<'_>, _dt: f32) {}

    /// Called after every state change, before the new state's `on_begin`.
    ///
    /// `prev` is `None` when the machine enters its initial state.
    fn on_change_state(
        &mut self,
        _owner: &mut O,
        _view: &StateView<'_>,
        _prev: Option<StateIndex>,
    ) {
    }

    /// Called by `shutdown` on an active machine.
    fn on_end(&mut self, _owner: &mut O) {}
}
