//=========================================================================
// Layered State Machine
//=========================================================================
//
// Typed facade over StateMachineCore for one, two or three enum layers.
//
// The layer set is a tuple of enum types. Every typed operation is gated
// on `L: Contains<E, P>`, so using an enum that is not a layer of the
// machine fails to compile. `P` is a position marker the compiler infers
// from the argument; callers never name it.
//
// Architecture:
//   StateMachine<(General, ActorState), Actor>
//     └─ core: StateMachineCore<Actor>
//          ├─ layer 0: IndexConverter<General>
//          └─ layer 1: IndexConverter<ActorState>
//
// All layers share one index space, one registry and one default slot.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::marker::PhantomData;

//=== Internal Dependencies ===============================================

use super::{MachineBuilder, StateMachineCore, TransitionHistory};
use crate::core::error::Result;
use crate::core::index::{LayerTable, StateIndex, StateKey};
use crate::core::state::{State, StateView};

//=== Layer Sets ==========================================================

/// A tuple of enum types usable as a machine's layers.
pub trait LayerSet: 'static {
    /// Number of layers in the set.
    const DEPTH: usize;

    /// Attaches one converter per layer, in tuple order.
    fn attach_layers(table: &mut LayerTable);
}

impl<A: StateKey> LayerSet for (A,) {
    const DEPTH: usize = 1;

    fn attach_layers(table: &mut LayerTable) {
        table.attach::<A>();
    }
}

impl<A: StateKey, B: StateKey> LayerSet for (A, B) {
    const DEPTH: usize = 2;

    fn attach_layers(table: &mut LayerTable) {
        table.attach::<A>();
        table.attach::<B>();
    }
}

impl<A: StateKey, B: StateKey, C: StateKey> LayerSet for (A, B, C) {
    const DEPTH: usize = 3;

    fn attach_layers(table: &mut LayerTable) {
        table.attach::<A>();
        table.attach::<B>();
        table.attach::<C>();
    }
}

//--- Layer Membership ----------------------------------------------------

/// Position marker for the first layer.
pub struct Layer1;
/// Position marker for the second layer.
pub struct Layer2;
/// Position marker for the third layer.
pub struct Layer3;

/// `Self` has `E` as the layer at position `P`.
pub trait Contains<E, P> {}

impl<A: StateKey> Contains<A, Layer1> for (A,) {}

impl<A: StateKey, B: StateKey> Contains<A, Layer1> for (A, B) {}
impl<A: StateKey, B: StateKey> Contains<B, Layer2> for (A, B) {}

impl<A: StateKey, B: StateKey, C: StateKey> Contains<A, Layer1> for (A, B, C) {}
impl<A: StateKey, B: StateKey, C: StateKey> Contains<B, Layer2> for (A, B, C) {}
impl<A: StateKey, B: StateKey, C: StateKey> Contains<C, Layer3> for (A, B, C) {}

//=== StateMachine ========================================================

/// State machine keyed by the enum types in `L`, driving an owner `O`.
///
/// # Example
///
/// ```rust
/// use layered_state_machine::prelude::*;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum General { Idle }
/// impl StateKey for General {}
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// enum Motion { Walk }
/// impl StateKey for Motion {}
///
/// struct Still;
/// impl State<u32> for Still {}
///
/// struct Walk;
/// impl State<u32> for Walk {
///     fn on_update(&mut self, ctx: &mut StateContext<'_, u32>, _dt: f32) {
///         *ctx.owner += 1;
///     }
/// }
///
/// let mut steps = 0u32;
/// let mut machine: DoubleLayerMachine<General, Motion, u32> = StateMachine::new();
/// machine.register_state(General::Idle, Still, true);
/// machine.register_state(Motion::Walk, Walk, false);
///
/// machine.begin_state(&mut steps, General::Idle).unwrap();
/// machine.set_state(&mut steps, Motion::Walk).unwrap();
/// machine.update(&mut steps, 0.016).unwrap();
///
/// assert_eq!(steps, 1);
/// assert_eq!(machine.current_state_label().as_deref(), Some("Walk"));
/// ```
pub struct StateMachine<L: LayerSet, O: 'static = ()> {
    core: StateMachineCore<O>,
    _layers: PhantomData<fn() -> L>,
}

/// Machine with a single enum layer.
pub type SingleLayerMachine<A, O = ()> = StateMachine<(A,), O>;

/// Machine with two enum layers sharing one index space.
pub type DoubleLayerMachine<A, B, O = ()> = StateMachine<(A, B), O>;

/// Machine with three enum layers sharing one index space.
pub type TripleLayerMachine<A, B, C, O = ()> = StateMachine<(A, B, C), O>;

impl<L: LayerSet, O: 'static> StateMachine<L, O> {
    //--- Construction -----------------------------------------------------

    /// Creates a machine with the default configuration.
    pub fn new() -> Self {
        MachineBuilder::new().build()
    }

    pub(crate) fn from_core(mut core: StateMachineCore<O>) -> Self {
        L::attach_layers(core.layers_mut());
        Self {
            core,
            _layers: PhantomData,
        }
    }

    /// The shared engine, for index-level operations.
    pub fn core(&self) -> &StateMachineCore<O> {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut StateMachineCore<O> {
        &mut self.core
    }

    //--- Registration -----------------------------------------------------

    /// Registers `state` under `value`, returning its index.
    ///
    /// The first registration of a value wins. With `is_default`, the
    /// state becomes the machine's single default across all layers.
    pub fn register_state<E, P, S>(&mut self, value: E, state: S, is_default: bool) -> StateIndex
    where
        L: Contains<E, P>,
        E: StateKey,
        S: State<O>,
    {
        self.core.register_state(value, state, is_default)
    }

    /// Unregisters `value`. Returns false if it was not registered.
    pub fn remove_state<E, P>(&mut self, value: E) -> bool
    where
        L: Contains<E, P>,
        E: StateKey,
    {
        self.core.remove_state(value)
    }

    /// Drops every registered state. Layers and the default index survive.
    pub fn clear_all_state(&mut self) {
        self.core.clear_all_state();
    }

    //--- Transitions ------------------------------------------------------

    /// Enters `value` as the machine's first state.
    pub fn begin_state<E, P>(&mut self, owner: &mut O, value: E) -> Result<()>
    where
        L: Contains<E, P>,
        E: StateKey,
    {
        self.core.begin_state(owner, value)
    }

    /// Changes to `value`. `Ok(false)` means the target refused.
    pub fn set_state<E, P>(&mut self, owner: &mut O, value: E) -> Result<bool>
    where
        L: Contains<E, P>,
        E: StateKey,
    {
        self.core.set_state(owner, value)
    }

    pub fn set_state_index(&mut self, owner: &mut O, index: StateIndex) -> Result<bool> {
        self.core.set_state_index(owner, index)
    }

    /// Changes to the default state, bypassing its `can_change_state`.
    pub fn to_default_state(&mut self, owner: &mut O) -> Result<bool> {
        self.core.to_default_state(owner)
    }

    /// Runs one tick of the current state.
    pub fn update(&mut self, owner: &mut O, dt: f32) -> Result<()> {
        self.core.update(owner, dt)
    }

    /// Stops the machine; `begin_state` may be called again afterwards.
    pub fn shutdown(&mut self, owner: &mut O) {
        self.core.shutdown(owner);
    }

    //--- Typed Queries ----------------------------------------------------

    pub fn is_current_state<E, P>(&self, value: E) -> bool
    where
        L: Contains<E, P>,
        E: StateKey,
    {
        self.core.is_current_state(value)
    }

    pub fn can_change_state<E, P>(&self, value: E) -> bool
    where
        L: Contains<E, P>,
        E: StateKey,
    {
        self.core.can_change_state(value)
    }

    pub fn is_state_equals_index<E, P>(&self, value: E, index: StateIndex) -> bool
    where
        L: Contains<E, P>,
        E: StateKey,
    {
        self.core.is_state_equals_index(value, index)
    }

    /// The state registered under `value`.
    ///
    /// Use `downcast_ref` on the result for its concrete type.
    pub fn state_class<E, P>(&self, value: E) -> Option<&dyn State<O>>
    where
        L: Contains<E, P>,
        E: StateKey,
    {
        self.core.state_class(value)
    }

    /// Strict lookup of `value`'s index.
    pub fn state_index<E, P>(&self, value: E) -> Result<StateIndex>
    where
        L: Contains<E, P>,
        E: StateKey,
    {
        self.core.index_of(value)
    }

    pub fn try_state_index<E, P>(&self, value: E) -> Option<StateIndex>
    where
        L: Contains<E, P>,
        E: StateKey,
    {
        self.core.try_index_of(value)
    }

    /// The value of layer `E` behind `index`.
    ///
    /// `None` if `index` belongs to another layer or to nothing.
    pub fn state_of<E, P>(&self, index: StateIndex) -> Option<E>
    where
        L: Contains<E, P>,
        E: StateKey,
    {
        self.core.state_of(index)
    }

    /// The current state's enum value of layer `E`, if it lives there.
    ///
    /// `E` cannot be inferred, so call it as `current_state_of::<E, _>()`.
    pub fn current_state_of<E, P>(&self) -> Option<E>
    where
        L: Contains<E, P>,
        E: StateKey,
    {
        self.core.state_of(self.core.current_index()?)
    }

    /// Debug label of the current state, whichever layer it lives on.
    pub fn current_state_label(&self) -> Option<String> {
        self.core.current_state_label()
    }

    //--- Machine State ----------------------------------------------------

    pub fn current_state(&self) -> Option<&dyn State<O>> {
        self.core.current_state()
    }

    pub fn current_index(&self) -> Option<StateIndex> {
        self.core.current_index()
    }

    pub fn previous_index(&self) -> Option<StateIndex> {
        self.core.previous_index()
    }

    pub fn default_index(&self) -> Option<StateIndex> {
        self.core.default_index()
    }

    pub fn is_active(&self) -> bool {
        self.core.is_active()
    }

    pub fn is_paused(&self) -> bool {
        self.core.is_paused()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.core.set_paused(paused);
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    pub fn history(&self) -> &TransitionHistory {
        self.core.history()
    }

    pub fn view(&self) -> StateView<'_> {
        self.core.view()
    }

    //--- Timers -----------------------------------------------------------

    pub fn timer(&self) -> f32 {
        self.core.timer()
    }

    pub fn add_timer(&mut self, dt: f32) {
        self.core.add_timer(dt);
    }

    pub fn clear_timer(&mut self) {
        self.core.clear_timer();
    }

    pub fn sub_timer(&self) -> f32 {
        self.core.sub_timer()
    }

    pub fn add_sub_timer(&mut self, dt: f32) {
        self.core.add_sub_timer(dt);
    }

    pub fn clear_sub_timer(&mut self) {
        self.core.clear_sub_timer();
    }

    pub fn sub_step(&self) -> i32 {
        self.core.sub_step()
    }

    pub fn set_sub_step(&mut self, sub_step: i32) {
        self.core.set_sub_step(sub_step);
    }
}

impl<L: LayerSet, O: 'static> Default for StateMachine<L, O> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::StateContext;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum General {
        Idle,
    }

    impl StateKey for General {}

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Motion {
        Walk,
        Run,
    }

    impl StateKey for Motion {}

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Mood {
        Calm,
    }

    impl StateKey for Mood {}

    struct Plain;

    impl State<u32> for Plain {}

    struct Counting;

    impl State<u32> for Counting {
        fn on_update(&mut self, ctx: &mut StateContext<'_, u32>, _dt: f32) {
            *ctx.owner += 1;
        }
    }

    #[test]
    fn layers_are_attached_in_tuple_order() {
        let machine: TripleLayerMachine<General, Motion, Mood, u32> = StateMachine::new();
        let names = machine.core().layers().type_names();

        assert_eq!(<(General, Motion, Mood) as LayerSet>::DEPTH, 3);
        assert_eq!(names.len(), 3);
        assert!(names[0].ends_with("General"));
        assert!(names[2].ends_with("Mood"));
    }

    #[test]
    fn layers_share_one_index_space() {
        let mut machine: TripleLayerMachine<General, Motion, Mood, u32> = StateMachine::new();
        let idle = machine.register_state(General::Idle, Plain, true);
        let walk = machine.register_state(Motion::Walk, Plain, false);
        let run = machine.register_state(Motion::Run, Plain, false);
        let calm = machine.register_state(Mood::Calm, Plain, false);

        assert_eq!(
            [idle, walk, run, calm].map(StateIndex::get),
            [0, 1, 2, 3]
        );
        assert_eq!(machine.state_of::<Motion, _>(run), Some(Motion::Run));
        assert_eq!(machine.state_of::<Motion, _>(calm), None);
        assert_eq!(machine.default_index(), Some(idle));
        assert_eq!(machine.len(), 4);
    }

    #[test]
    fn typed_operations_reach_every_layer() {
        let mut owner = 0u32;
        let mut machine: DoubleLayerMachine<General, Motion, u32> = StateMachine::new();
        machine.register_state(General::Idle, Plain, true);
        let walk = machine.register_state(Motion::Walk, Counting, false);

        machine.begin_state(&mut owner, General::Idle).unwrap();
        assert!(machine.is_current_state(General::Idle));
        assert!(machine.set_state(&mut owner, Motion::Walk).unwrap());
        machine.update(&mut owner, 0.1).unwrap();

        assert_eq!(owner, 1);
        assert!(machine.is_current_state(Motion::Walk));
        assert!(machine.is_state_equals_index(Motion::Walk, walk));
        assert_eq!(machine.current_state_of::<Motion, _>(), Some(Motion::Walk));
        assert_eq!(machine.current_state_of::<General, _>(), None);
        assert_eq!(machine.current_state_label().as_deref(), Some("Walk"));
    }

    #[test]
    fn state_class_downcasts_to_the_registered_type() {
        let mut machine: SingleLayerMachine<Motion, u32> = StateMachine::new();
        machine.register_state(Motion::Walk, Counting, false);

        let state = machine.state_class(Motion::Walk).unwrap();
        assert!(state.downcast_ref::<Counting>().is_some());
        assert!(state.downcast_ref::<Plain>().is_none());
        assert!(machine.state_class(Motion::Run).is_none());
    }

    #[test]
    fn unregistered_values_fail_strict_lookup_only() {
        let mut owner = 0u32;
        let mut machine: SingleLayerMachine<Motion, u32> = StateMachine::new();
        machine.register_state(Motion::Walk, Plain, true);

        assert!(machine.state_index(Motion::Run).is_err());
        assert_eq!(machine.try_state_index(Motion::Run), None);
        assert!(!machine.can_change_state(Motion::Run));
        assert!(machine.begin_state(&mut owner, Motion::Run).is_err());
        assert!(!machine.is_active());
    }

    #[test]
    fn removed_values_are_forgotten() {
        let mut machine: SingleLayerMachine<Motion, u32> = StateMachine::new();
        let walk = machine.register_state(Motion::Walk, Plain, true);

        assert!(machine.remove_state(Motion::Walk));
        assert!(!machine.remove_state(Motion::Walk));
        assert_eq!(machine.try_state_index(Motion::Walk), None);
        assert_eq!(machine.state_of::<Motion, _>(walk), None);
        assert_eq!(machine.default_index(), None);

        let again = machine.register_state(Motion::Walk, Plain, false);
        assert_ne!(again, walk);
    }

    #[test]
    fn shutdown_allows_a_fresh_begin() {
        let mut owner = 0u32;
        let mut machine: DoubleLayerMachine<General, Motion, u32> = StateMachine::new();
        machine.register_state(General::Idle, Plain, true);
        machine.register_state(Motion::Walk, Counting, false);
        machine.begin_state(&mut owner, Motion::Walk).unwrap();

        machine.shutdown(&mut owner);
        machine.update(&mut owner, 0.1).unwrap();
        assert_eq!(owner, 0);
        assert!(!machine.is_active());
        assert_eq!(machine.current_state_of::<Motion, _>(), None);

        machine.begin_state(&mut owner, General::Idle).unwrap();
        assert!(machine.is_current_state(General::Idle));
    }
}
