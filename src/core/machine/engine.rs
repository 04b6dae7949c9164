//=========================================================================
// State Machine Core
//=========================================================================
//
// Index-keyed state registry and transition orchestrator.
//
// One core exists per machine no matter how many enum layers sit on top:
// every layer's values map into the same index space, the same registry,
// the same step tracker and the same default-state slot.
//
// Architecture:
//   StateMachineCore<O>
//     ├─ allocator: IndexAllocator        (shared by all layers)
//     ├─ layers:    LayerTable            (one converter per enum type)
//     ├─ states:    HashMap<StateIndex, Box<dyn State<O>>>
//     ├─ step:      StepTracker<StateIndex>
//     ├─ queue:     TransitionQueue       (requests made by states)
//     └─ history:   TransitionHistory
//
// Flow:
//   begin_state_index() → hooks.on_begin() → hooks.on_change_state()
//                       → first.on_begin() → drain queue
//   update() → hooks.on_update() → current.on_update() → drain queue
//   set_state_index() → old.on_end() → step.set_step_only()
//                     → hooks.on_change_state() → new.on_begin() → drain queue
//   shutdown() → hooks.on_end()
//
// While a state's callback runs, the state is lent out of the registry so
// its context can query the others.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use super::{MachineConfig, MachineHooks, TransitionHistory, TransitionRecord};
use crate::core::error::{Result, StateMachineError};
use crate::core::index::{IndexAllocator, LayerTable, StateIndex, StateKey};
use crate::core::state::{State, StateContext, StateView, TransitionQueue, TransitionRequest};
use crate::core::step::StepTracker;

//=== StateMachineCore ====================================================

/// The engine shared by every layer of a machine.
///
/// `O` is the owning entity. It is never stored: calls that run state
/// callbacks borrow it for their duration.
///
/// Most code uses the typed [`StateMachine`](super::StateMachine) facade.
/// The core is also usable directly, with layers attached on first
/// registration.
///
/// # Example
///
/// ```rust
/// use layered_state_machine::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Light { Red, Green }
/// impl StateKey for Light {}
///
/// struct Lamp;
/// impl State<()> for Lamp {}
///
/// let mut core: StateMachineCore<()> = StateMachineCore::new();
/// core.register_state(Light::Red, Lamp, true);
/// core.register_state(Light::Green, Lamp, false);
///
/// core.begin_state(&mut (), Light::Red).unwrap();
/// assert!(core.set_state(&mut (), Light::Green).unwrap());
/// assert!(core.is_current_state(Light::Green));
/// ```
pub struct StateMachineCore<O: 'static> {
    config: MachineConfig,
    allocator: IndexAllocator,
    layers: LayerTable,
    states: HashMap<StateIndex, Box<dyn State<O>>>,
    default_index: Option<StateIndex>,
    step: StepTracker<StateIndex>,
    is_active: bool,
    is_paused: bool,
    queue: TransitionQueue,
    history: TransitionHistory,
    hooks: Option<Box<dyn MachineHooks<O>>>,
}

impl<O: 'static> StateMachineCore<O> {
    //--- Construction -----------------------------------------------------

    /// Creates an empty core with the default configuration.
    pub fn new() -> Self {
        Self::with_parts(MachineConfig::default(), None)
    }

    /// Creates an empty core with the given configuration.
    pub fn with_config(config: MachineConfig) -> Self {
        Self::with_parts(config, None)
    }

    pub(crate) fn with_parts(
        config: MachineConfig,
        hooks: Option<Box<dyn MachineHooks<O>>>,
    ) -> Self {
        Self {
            allocator: IndexAllocator::new(),
            layers: LayerTable::new(),
            states: HashMap::with_capacity(config.capacity),
            default_index: None,
            step: StepTracker::new(),
            is_active: false,
            is_paused: false,
            queue: TransitionQueue::new(),
            history: TransitionHistory::new(config.history_capacity),
            hooks,
            config,
        }
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Installs machine-level callbacks, replacing any previous ones.
    pub fn set_hooks<H>(&mut self, hooks: H)
    where
        H: MachineHooks<O> + 'static,
    {
        self.hooks = Some(Box::new(hooks));
    }

    //--- Layers -----------------------------------------------------------

    pub fn layers(&self) -> &LayerTable {
        &self.layers
    }

    pub(crate) fn layers_mut(&mut self) -> &mut LayerTable {
        &mut self.layers
    }

    //--- Index Registration -----------------------------------------------

    /// Binds `state` to `index`.
    ///
    /// The first registration of an index wins; later ones are dropped
    /// and return false. With `is_default`, the index becomes the machine's
    /// single default state, displacing any earlier default.
    pub fn register_state_index(
        &mut self,
        index: StateIndex,
        state: Box<dyn State<O>>,
        is_default: bool,
    ) -> bool {
        if self.states.contains_key(&index) {
            debug!("State index {} already registered, keeping the first", index);
            return false;
        }

        if is_default {
            if let Some(previous) = self.default_index.filter(|&d| d != index) {
                warn!(
                    "Default state {} replaced by {}; a machine has one default across all layers",
                    previous, index
                );
            }
            self.default_index = Some(index);
        }

        debug!("Registered state index {} (default: {})", index, is_default);
        self.states.insert(index, state);
        true
    }

    /// Removes the state at `index`, clearing the default slot if it held it.
    ///
    /// Removing the current state is allowed: updates then dispatch to
    /// nothing until the machine changes state.
    pub fn remove_state_index(&mut self, index: StateIndex) -> Option<Box<dyn State<O>>> {
        let state = self.states.remove(&index)?;

        if self.default_index == Some(index) {
            debug!("Default state {} removed", index);
            self.default_index = None;
        }
        if self.step.step() == Some(index) {
            warn!("Removed state {} while it is current", index);
        }
        Some(state)
    }

    /// Drops every registered state and pending request.
    ///
    /// The default index, the layers and the index allocator are kept.
    pub fn clear_all_state(&mut self) {
        debug!("Clearing {} registered states", self.states.len());
        self.states.clear();
        self.queue.clear();
    }

    //--- Index Transitions ------------------------------------------------

    /// Enters the machine's first state and activates it.
    pub fn begin_state_index(&mut self, owner: &mut O, index: StateIndex) -> Result<()> {
        if self.is_active {
            warn!("begin_state called on a machine that is already active");
            return Err(StateMachineError::AlreadyStarted);
        }
        if !self.states.contains_key(&index) {
            warn!("begin_state called with unregistered index {}", index);
            return Err(StateMachineError::UnknownIndex(index));
        }

        debug!("Beginning state machine in state {}", self.describe(index));
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_begin(owner);
        }
        self.is_active = true;
        self.step.init_step(index);
        self.run_change_hook(owner, None);
        self.dispatch(owner, index, |state, ctx| state.on_begin(ctx, None));
        self.history.record(TransitionRecord {
            from: None,
            to: index,
            elapsed: 0.0,
        });

        self.drain_requests(owner)
    }

    /// Stops the machine so `begin_state` may run again.
    ///
    /// Runs the machine hook's `on_end`. The current state gets no
    /// callback. Registered states, layers and history are kept; pending
    /// requests, the current position and the timers are dropped.
    pub fn shutdown(&mut self, owner: &mut O) {
        if !self.is_active {
            debug!("shutdown called on an inactive machine");
            return;
        }

        debug!("Shutting down state machine");
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_end(owner);
        }
        self.is_active = false;
        self.queue.clear();
        self.step = StepTracker::new();
    }

    /// Changes to the state at `index`.
    ///
    /// Returns `Ok(false)` when the target refuses through
    /// `can_change_state` (or is unregistered); nothing is called in that
    /// case. Transitions to the default state skip the check. Changing to
    /// the current state restarts it.
    pub fn set_state_index(&mut self, owner: &mut O, index: StateIndex) -> Result<bool> {
        if !self.is_active {
            warn!("set_state called before begin_state");
            return Err(StateMachineError::NotActive);
        }

        let changed = self.change_state(owner, index);
        self.drain_requests(owner)?;
        Ok(changed)
    }

    /// Whether the state at `index` exists and currently accepts entry.
    pub fn can_change_state_index(&self, index: StateIndex) -> bool {
        self.view().can_change_state_index(index)
    }

    /// Changes to the default state, regardless of its `can_change_state`.
    pub fn to_default_state(&mut self, owner: &mut O) -> Result<bool> {
        let Some(index) = self.default_index else {
            warn!("to_default_state called but no default state is registered");
            return Err(StateMachineError::NoDefaultState);
        };
        self.set_state_index(owner, index)
    }

    //--- Update Loop ------------------------------------------------------

    /// Runs one tick: machine hook, then the current state's `on_update`,
    /// then any transitions the state requested.
    ///
    /// Does nothing while paused or before `begin_state`.
    pub fn update(&mut self, owner: &mut O, dt: f32) -> Result<()> {
        if self.is_paused || !self.is_active {
            return Ok(());
        }

        if let Some(hooks) = self.hooks.as_mut() {
            let view = StateView::new(
                &self.layers,
                &self.states,
                self.step.step(),
                self.step.prev_step(),
                self.default_index,
            );
            hooks.on_update(owner, &view, dt);
        }

        let Some(current) = self.step.step() else {
            return Ok(());
        };
        if self
            .dispatch(owner, current, |state, ctx| state.on_update(ctx, dt))
            .is_none()
        {
            trace!("No state registered at current index {}", current);
        }

        self.drain_requests(owner)
    }

    //--- Typed Registration -----------------------------------------------
    //
    // Enum-keyed operations. The value is resolved through its layer's
    // converter; the layer is attached on first registration.
    //

    /// Registers `state` under `value` and returns its index.
    ///
    /// Registering a value twice returns the same index and keeps the
    /// first state.
    pub fn register_state<E, S>(&mut self, value: E, state: S, is_default: bool) -> StateIndex
    where
        E: StateKey,
        S: State<O>,
    {
        let index = self
            .layers
            .get_or_attach::<E>()
            .register_and_return_index(&mut self.allocator, value);
        self.register_state_index(index, Box::new(state), is_default);
        index
    }

    /// Removes `value` from its layer and its state from the registry.
    ///
    /// Returns false if `value` was not registered.
    pub fn remove_state<E: StateKey>(&mut self, value: E) -> bool {
        let Some(index) = self.try_index_of(value) else {
            return false;
        };

        self.remove_state_index(index);
        self.layers.remove_index(index);
        true
    }

    //--- Typed Transitions ------------------------------------------------

    pub fn begin_state<E: StateKey>(&mut self, owner: &mut O, value: E) -> Result<()> {
        let index = self.index_of(value)?;
        self.begin_state_index(owner, index)
    }

    pub fn set_state<E: StateKey>(&mut self, owner: &mut O, value: E) -> Result<bool> {
        let index = self.index_of(value)?;
        self.set_state_index(owner, index)
    }

    //--- Typed Queries ----------------------------------------------------

    /// Strict lookup: an unregistered value is an error.
    pub fn index_of<E: StateKey>(&self, value: E) -> Result<StateIndex> {
        match self.layers.get::<E>() {
            Some(layer) => layer.index_of(&value),
            None => {
                warn!("State {:?} is not registered", value);
                Err(StateMachineError::UnknownState(format!("{:?}", value)))
            }
        }
    }

    pub fn try_index_of<E: StateKey>(&self, value: E) -> Option<StateIndex> {
        self.layers.get::<E>()?.try_index_of(&value)
    }

    /// The value of layer `E` behind `index`, if that layer maps it.
    pub fn state_of<E: StateKey>(&self, index: StateIndex) -> Option<E> {
        self.layers.get::<E>()?.content_of(index)
    }

    pub fn is_current_state<E: StateKey>(&self, value: E) -> bool {
        self.try_index_of(value)
            .is_some_and(|index| self.step.step() == Some(index))
    }

    pub fn can_change_state<E: StateKey>(&self, value: E) -> bool {
        self.try_index_of(value)
            .is_some_and(|index| self.can_change_state_index(index))
    }

    pub fn is_state_equals_index<E: StateKey>(&self, value: E, index: StateIndex) -> bool {
        self.try_index_of(value) == Some(index)
    }

    /// The state registered under `value`.
    pub fn state_class<E: StateKey>(&self, value: E) -> Option<&dyn State<O>> {
        self.state_at(self.try_index_of(value)?)
    }

    //--- State Access -----------------------------------------------------

    pub fn state_at(&self, index: StateIndex) -> Option<&dyn State<O>> {
        self.states.get(&index).map(|state| &**state)
    }

    pub fn current_state(&self) -> Option<&dyn State<O>> {
        self.state_at(self.step.step()?)
    }

    /// The state at `index` as its concrete type.
    pub fn state_at_as<T: State<O>>(&self, index: StateIndex) -> Option<&T> {
        self.states
            .get(&index)
            .and_then(|state| (**state).as_any().downcast_ref::<T>())
    }

    /// The state at `index` as its concrete type, mutably.
    pub fn state_at_as_mut<T: State<O>>(&mut self, index: StateIndex) -> Option<&mut T> {
        self.states
            .get_mut(&index)
            .and_then(|state| (**state).as_any_mut().downcast_mut::<T>())
    }

    pub fn contains_index(&self, index: StateIndex) -> bool {
        self.states.contains_key(&index)
    }

    /// Number of registered states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Debug label of the current state's enum value, searching layers in
    /// attach order.
    pub fn current_state_label(&self) -> Option<String> {
        self.layers.label_of(self.step.step()?)
    }

    //--- Machine State ----------------------------------------------------

    /// Current state index, `None` before `begin_state`.
    pub fn current_index(&self) -> Option<StateIndex> {
        self.step.step()
    }

    pub fn previous_index(&self) -> Option<StateIndex> {
        self.step.prev_step()
    }

    pub fn default_index(&self) -> Option<StateIndex> {
        self.default_index
    }

    pub fn is_current_index(&self, index: StateIndex) -> bool {
        self.step.step() == Some(index)
    }

    /// True once `begin_state` has entered the initial state.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// Pausing suppresses `update`; direct transitions still apply.
    pub fn set_paused(&mut self, paused: bool) {
        self.is_paused = paused;
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    /// Read-only view of the machine's position.
    pub fn view(&self) -> StateView<'_> {
        StateView::new(
            &self.layers,
            &self.states,
            self.step.step(),
            self.step.prev_step(),
            self.default_index,
        )
    }

    //--- Timers -----------------------------------------------------------
    //
    // Timer clears on every state change, sub-timer on every sub-step
    // change. Before begin_state reads return zero and writes are dropped.
    //

    pub fn timer(&self) -> f32 {
        self.step.timer()
    }

    pub fn add_timer(&mut self, dt: f32) {
        self.step.add_timer(dt);
    }

    pub fn clear_timer(&mut self) {
        self.step.clear_timer();
    }

    pub fn sub_timer(&self) -> f32 {
        self.step.sub_timer()
    }

    pub fn add_sub_timer(&mut self, dt: f32) {
        self.step.add_sub_timer(dt);
    }

    pub fn clear_sub_timer(&mut self) {
        self.step.clear_sub_timer();
    }

    pub fn sub_step(&self) -> i32 {
        self.step.sub_step()
    }

    pub fn set_sub_step(&mut self, sub_step: i32) {
        self.step.set_sub_step(sub_step);
    }

    //--- Internal Helpers -------------------------------------------------

    /// Performs one transition. The machine must be active.
    fn change_state(&mut self, owner: &mut O, index: StateIndex) -> bool {
        if self.default_index != Some(index) && !self.can_change_state_index(index) {
            debug!("Transition to {} rejected", self.describe(index));
            return false;
        }
        let Some(prev) = self.step.step() else {
            return false;
        };

        debug!("Changing state {} -> {}", self.describe(prev), self.describe(index));
        let elapsed = self.step.timer();

        self.dispatch(owner, prev, |state, ctx| state.on_end(ctx, index));
        self.step.set_step_only(index);
        self.run_change_hook(owner, Some(prev));
        self.dispatch(owner, index, |state, ctx| state.on_begin(ctx, Some(prev)));

        self.history.record(TransitionRecord {
            from: Some(prev),
            to: index,
            elapsed,
        });
        true
    }

    /// Applies queued requests in FIFO order, including requests queued by
    /// the transitions they trigger, up to the configured chain limit.
    fn drain_requests(&mut self, owner: &mut O) -> Result<()> {
        let limit = self.config.max_chained_transitions;
        let mut applied = 0;

        while !self.queue.is_empty() {
            for request in self.queue.take() {
                if applied == limit {
                    warn!("Transition chain exceeded {} requests, dropping the rest", limit);
                    self.queue.clear();
                    return Err(StateMachineError::TransitionOverflow { limit });
                }
                applied += 1;

                let target = match request {
                    TransitionRequest::ToIndex(index) => index,
                    TransitionRequest::ToDefault => match self.default_index {
                        Some(index) => index,
                        None => {
                            warn!("Queued default transition dropped: no default state");
                            continue;
                        }
                    },
                };
                if !self.change_state(owner, target) {
                    debug!("Queued transition to {} dropped", self.describe(target));
                }
            }
        }
        Ok(())
    }

    /// Runs `f` on the state at `index` with a fresh context.
    ///
    /// The state is taken out of the registry for the call and put back
    /// afterwards. Returns `None` if no state is registered there.
    fn dispatch<R>(
        &mut self,
        owner: &mut O,
        index: StateIndex,
        f: impl FnOnce(&mut Box<dyn State<O>>, &mut StateContext<'_, O>) -> R,
    ) -> Option<R> {
        let cursor = self.step.cursor_mut()?;
        let mut state = self.states.remove(&index)?;
        let result = {
            let mut ctx = StateContext::new(
                owner,
                cursor,
                &self.layers,
                &self.states,
                self.default_index,
                &mut self.queue,
            );
            f(&mut state, &mut ctx)
        };
        self.states.insert(index, state);
        Some(result)
    }

    fn run_change_hook(&mut self, owner: &mut O, prev: Option<StateIndex>) {
        if let Some(hooks) = self.hooks.as_mut() {
            let view = StateView::new(
                &self.layers,
                &self.states,
                self.step.step(),
                self.step.prev_step(),
                self.default_index,
            );
            hooks.on_change_state(owner, &view, prev);
        }
    }

    /// `index` with its enum label, for log lines.
    fn describe(&self, index: StateIndex) -> String {
        match self.layers.label_of(index) {
            Some(label) => format!("{} ({})", label, index),
            None => index.to_string(),
        }
    }
}

impl<O: 'static> Default for StateMachineCore<O> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
