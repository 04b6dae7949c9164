//=========================================================================
// State Context
//=========================================================================
//
// Handles passed to states during callbacks.
//
// - StateView: read-only position of the machine plus typed lookups.
//   Given to `can_change_state` and to machine hooks.
// - StateContext: the owner, the machine's timers and sub-step, and the
//   transition queue. Given to `on_begin`, `on_update` and `on_end`.
//
// Both resolve enum values through the machine's layer table, so a
// state can ask about any layer without knowing which one it lives on.
// While a state's own callback runs it is lent out of the registry, so
// the registry queries of its context do not see it.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt;

use log::warn;

//=== Internal Dependencies ===============================================

use super::{StateLookup, TransitionQueue, TransitionRequest};
use crate::core::error::Result;
use crate::core::index::{LayerTable, StateIndex, StateKey};
use crate::core::step::StepCursor;

//=== StateView ===========================================================

/// Read-only snapshot of a machine's position.
#[derive(Clone, Copy)]
pub struct StateView<'a> {
    layers: &'a LayerTable,
    states: &'a dyn StateLookup,
    current: Option<StateIndex>,
    previous: Option<StateIndex>,
    default: Option<StateIndex>,
}

impl<'a> StateView<'a> {
    pub(crate) fn new(
        layers: &'a LayerTable,
        states: &'a dyn StateLookup,
        current: Option<StateIndex>,
        previous: Option<StateIndex>,
        default: Option<StateIndex>,
    ) -> Self {
        Self {
            layers,
            states,
            current,
            previous,
            default,
        }
    }

    //--- Position ---------------------------------------------------------

    /// Current state index, `None` before the machine started.
    pub fn current_index(&self) -> Option<StateIndex> {
        self.current
    }

    pub fn previous_index(&self) -> Option<StateIndex> {
        self.previous
    }

    pub fn default_index(&self) -> Option<StateIndex> {
        self.default
    }

    pub fn is_current_index(&self, index: StateIndex) -> bool {
        self.current == Some(index)
    }

    //--- Typed Lookups ----------------------------------------------------

    /// True if `value` is registered and is the current state.
    pub fn is_current<E: StateKey>(&self, value: E) -> bool {
        self.try_index_of(value)
            .is_some_and(|index| self.is_current_index(index))
    }

    /// Strict lookup of `value`'s index.
    pub fn index_of<E: StateKey>(&self, value: E) -> Result<StateIndex> {
        self.layers.require::<E>()?.index_of(&value)
    }

    pub fn try_index_of<E: StateKey>(&self, value: E) -> Option<StateIndex> {
        self.layers.get::<E>()?.try_index_of(&value)
    }

    /// The value of layer `E` behind `index`, if that layer maps it.
    pub fn state_of<E: StateKey>(&self, index: StateIndex) -> Option<E> {
        self.layers.get::<E>()?.content_of(index)
    }

    /// True if `value` is registered under exactly `index`.
    pub fn is_state_equals_index<E: StateKey>(&self, value: E, index: StateIndex) -> bool {
        self.try_index_of(value) == Some(index)
    }

    /// Debug label of the value behind `index`, from any layer.
    pub fn label_of(&self, index: StateIndex) -> Option<String> {
        self.layers.label_of(index)
    }

    //--- Registry Queries -------------------------------------------------

    /// Whether the machine would accept a change to `value` right now.
    pub fn can_change_state<E: StateKey>(&self, value: E) -> bool {
        self.try_index_of(value)
            .is_some_and(|index| self.can_change_state_index(index))
    }

    pub fn can_change_state_index(&self, index: StateIndex) -> bool {
        self.states.accepts(index, self)
    }

    /// The state registered at `index` as its concrete type.
    pub fn state_as<T: Any>(&self, index: StateIndex) -> Option<&'a T> {
        self.states.state_any(index)?.downcast_ref::<T>()
    }

    /// The current state as its concrete type.
    pub fn current_state_as<T: Any>(&self) -> Option<&'a T> {
        self.state_as(self.current?)
    }
}

impl fmt::Debug for StateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateView")
            .field("layers", self.layers)
            .field("current", &self.current)
            .field("previous", &self.previous)
            .field("default", &self.default)
            .finish()
    }
}

//=== StateContext ========================================================

/// Mutable handle given to a state for the duration of one callback.
pub struct StateContext<'a, O> {
    /// The entity this machine drives.
    pub owner: &'a mut O,
    cursor: &'a mut StepCursor<StateIndex>,
    layers: &'a LayerTable,
    states: &'a dyn StateLookup,
    default: Option<StateIndex>,
    queue: &'a mut TransitionQueue,
}

impl<'a, O> StateContext<'a, O> {
    pub(crate) fn new(
        owner: &'a mut O,
        cursor: &'a mut StepCursor<StateIndex>,
        layers: &'a LayerTable,
        states: &'a dyn StateLookup,
        default: Option<StateIndex>,
        queue: &'a mut TransitionQueue,
    ) -> Self {
        Self {
            owner,
            cursor,
            layers,
            states,
            default,
            queue,
        }
    }

    /// Read-only view of the machine's position.
    pub fn view(&self) -> StateView<'_> {
        StateView::new(
            self.layers,
            self.states,
            Some(self.cursor.step()),
            Some(self.cursor.prev_step()),
            self.default,
        )
    }

    //--- Position ---------------------------------------------------------

    pub fn current_index(&self) -> StateIndex {
        self.cursor.step()
    }

    pub fn previous_index(&self) -> StateIndex {
        self.cursor.prev_step()
    }

    pub fn is_current<E: StateKey>(&self, value: E) -> bool {
        self.view().is_current(value)
    }

    pub fn index_of<E: StateKey>(&self, value: E) -> Result<StateIndex> {
        self.view().index_of(value)
    }

    pub fn state_of<E: StateKey>(&self, index: StateIndex) -> Option<E> {
        self.view().state_of(index)
    }

    /// Whether a request for `value` would currently be accepted.
    pub fn can_change_state<E: StateKey>(&self, value: E) -> bool {
        self.view().can_change_state(value)
    }

    //--- Timers -----------------------------------------------------------
    //
    // Timer is cleared on every state change, sub-timer on every
    // sub-step change.
    //

    pub fn timer(&self) -> f32 {
        self.cursor.timer()
    }

    pub fn add_timer(&mut self, dt: f32) {
        self.cursor.add_timer(dt);
    }

    pub fn clear_timer(&mut self) {
        self.cursor.clear_timer();
    }

    pub fn sub_timer(&self) -> f32 {
        self.cursor.sub_timer()
    }

    pub fn add_sub_timer(&mut self, dt: f32) {
        self.cursor.add_sub_timer(dt);
    }

    pub fn clear_sub_timer(&mut self) {
        self.cursor.clear_sub_timer();
    }

    pub fn sub_step(&self) -> i32 {
        self.cursor.sub_step()
    }

    /// Sets the sub-step and clears the sub-timer.
    pub fn set_sub_step(&mut self, sub_step: i32) {
        self.cursor.set_sub_step(sub_step);
    }

    //--- Transition Requests ----------------------------------------------

    /// Queues a change to `value`, applied after this callback returns.
    ///
    /// Fails if `value` is not registered on any layer of this machine.
    /// The target's `can_change_state` is checked when the request is
    /// applied, not now.
    pub fn request_state<E: StateKey>(&mut self, value: E) -> Result<()> {
        let index = self.view().index_of(value)?;
        self.queue.push(TransitionRequest::ToIndex(index));
        Ok(())
    }

    /// Queues a change to `index`, applied after this callback returns.
    pub fn request_state_index(&mut self, index: StateIndex) {
        self.queue.push(TransitionRequest::ToIndex(index));
    }

    /// Queues a change to the default state, applied after this callback
    /// returns. Logged and dropped if the machine has no default state.
    pub fn to_default_state(&mut self) {
        if self.default.is_none() {
            warn!("to_default_state requested but no default state is registered");
            return;
        }
        self.queue.push(TransitionRequest::ToDefault);
    }
}

//=========================================================================
// Tests
//=========================================================================
