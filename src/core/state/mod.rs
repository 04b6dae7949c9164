//=========================================================================
// State Leaves
//=========================================================================
//
// The contract every concrete state implements.
//
// Architecture:
//   StateMachineCore
//     └─ states: HashMap<StateIndex, Box<dyn State<O>>>
//
// Flow:
//   begin  → on_begin(None)
//   change → old.on_end(next) → new.on_begin(Some(prev))
//   tick   → current.on_update(dt)
//
// States never hold a reference to their machine. Each callback gets a
// StateContext borrowed for the duration of the call; transitions asked
// for through it are queued and applied after the callback returns.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use crate::core::index::StateIndex;

//=== Module Declarations =================================================

mod context;
mod transition_queue;

//=== Public API ==========================================================

pub use context::{StateContext, StateView};
pub use transition_queue::{TransitionQueue, TransitionRequest};

//=== AsAny ===============================================================

/// Upcast to `Any`, implemented for every `'static` type.
///
/// Lets the machine hand out registered states as their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

//=== State Trait =========================================================

/// Defines the behavior of one state with lifecycle hooks.
///
/// `O` is the owning entity the machine drives. It is handed to every
/// callback through [`StateContext::owner`].
///
/// # Minimal Implementation
///
/// Every method has a default, so an empty impl is a valid (inert) state:
///
/// ```rust
/// # use layered_state_machine::prelude::*;
/// struct Idle;
///
/// impl State<()> for Idle {}
/// ```
///
/// A state that returns to the default state after two seconds:
///
/// ```rust
/// # use layered_state_machine::prelude::*;
/// struct Flash;
///
/// impl State<()> for Flash {
///     fn on_update(&mut self, ctx: &mut StateContext<'_, ()>, dt: f32) {
///         ctx.add_timer(dt);
///         if ctx.timer() >= 2.0 {
///             ctx.to_default_state();
///         }
///     }
/// }
/// ```
pub trait State<O>: AsAny {
    /// Called once when the state is entered.
    ///
    /// `prev` is `None` for the machine's initial state.
    fn on_begin(&mut self, _ctx: &mut StateContext<'_, O>, _prev: Option<StateIndex>) {}

    /// Called every tick while the state is current.
    fn on_update(&mut self, _ctx: &mut StateContext<'_, O>, _dt: f32) {}

    /// Called once when the state is left. `next` may be this state's own
    /// index when the state is restarted.
    fn on_end(&mut self, _ctx: &mut StateContext<'_, O>, _next: StateIndex) {}

    /// Whether the machine may change into this state right now.
    ///
    /// Not consulted for transitions to the default state.
    fn can_change_state(&self, _view: &StateView<'_>) -> bool {
        true
    }
}

impl<'a, O: 'static> dyn State<O> + 'a {
    /// Returns the state as `T` if that is its concrete type.
    pub fn downcast_ref<T: State<O>>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: State<O>>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    pub fn is<T: State<O>>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

//=== StateLookup =========================================================

/// Owner-erased access to a machine's registered states.
///
/// Lets a `StateView` ask other states questions without carrying the
/// owner type.
pub(crate) trait StateLookup {
    /// Whether the state at `index` exists and accepts entry under `view`.
    fn accepts(&self, index: StateIndex, view: &StateView<'_>) -> bool;

    /// The state at `index` as `Any`, for downcasting.
    fn state_any(&self, index: StateIndex) -> Option<&dyn Any>;
}

impl<O: 'static> StateLookup for HashMap<StateIndex, Box<dyn State<O>>> {
    fn accepts(&self, index: StateIndex, view: &StateView<'_>) -> bool {
        self.get(&index)
            .is_some_and(|state| state.can_change_state(view))
    }

    fn state_any(&self, index: StateIndex) -> Option<&dyn Any> {
        self.get(&index).map(|state| (**state).as_any())
    }
}
