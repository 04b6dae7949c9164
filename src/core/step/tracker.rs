//=========================================================================
// Step Tracker
//=========================================================================
//
// Drives a StepCursor and dispatches per-step update callbacks.
//
// Flow:
//   init_step(s)  → INIT callback on s → sub-step 0 → ready
//   update(dt)    → callback registered for the current step
//   set_step(n)   → FINISH on old → advance → INIT on new → sub-step 0
//   set_step_only → advance, no callbacks
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{StepCursor, SUB_STEP_FINISH, SUB_STEP_INIT};

//=== UpdateDelegate ======================================================

/// Per-step callback. Receives the tracker's cursor and the frame delta.
pub type UpdateDelegate<T> = Box<dyn FnMut(&mut StepCursor<T>, f32)>;

//=== StepTracker =========================================================

/// Step machine keyed by an enum or integer step type.
///
/// # Example
///
/// ```rust
/// use layered_state_machine::core::step::{StepTracker, SUB_STEP_INIT};
///
/// let mut tracker = StepTracker::new();
/// tracker.add_update_delegate(0u32, Box::new(|cursor, dt| {
///     if cursor.sub_step() != SUB_STEP_INIT {
///         cursor.add_timer(dt);
///     }
/// }));
///
/// tracker.init_step(0);
/// tracker.update(0.5);
/// assert_eq!(tracker.timer(), 0.5);
/// ```
pub struct StepTracker<T> {
    cursor: Option<StepCursor<T>>,
    delegates: HashMap<T, UpdateDelegate<T>>,
}

impl<T: Copy + Eq + Hash + Debug> StepTracker<T> {
    /// Creates a tracker that is not yet initialized.
    pub fn new() -> Self {
        Self {
            cursor: None,
            delegates: HashMap::new(),
        }
    }

    //--- Step Control -----------------------------------------------------

    /// Enters the first step, running its INIT phase.
    ///
    /// Only the first call has an effect. Returns false if the tracker was
    /// already initialized.
    pub fn init_step(&mut self, initial: T) -> bool {
        if self.cursor.is_some() {
            warn!("Step tracker already initialized, ignoring init_step({:?})", initial);
            return false;
        }

        self.cursor = Some(StepCursor::new(initial));
        self.run_phase(SUB_STEP_INIT);
        self.set_sub_step(0);
        true
    }

    /// Changes step with full FINISH/INIT bracketing.
    ///
    /// No-op if `next` is already the current step or the tracker is not
    /// initialized.
    pub fn set_step(&mut self, next: T) {
        let Some(current) = self.step() else {
            return;
        };
        if current == next {
            return;
        }

        self.run_phase(SUB_STEP_FINISH);
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.advance(next);
        }
        self.run_phase(SUB_STEP_INIT);
        self.set_sub_step(0);
    }

    /// Changes step without invoking any callback.
    ///
    /// Unlike `set_step`, a transition to the current step still resets
    /// the timers.
    pub fn set_step_only(&mut self, next: T) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.advance(next);
        }
    }

    //--- Update -----------------------------------------------------------

    /// Invokes the callback of the current step. No-op before `init_step`.
    pub fn update(&mut self, dt: f32) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };

        let step = cursor.step();
        if let Some(delegate) = self.delegates.get_mut(&step) {
            delegate(cursor, dt);
        }
    }

    //--- Delegate Registry ------------------------------------------------

    /// Registers the callback for `step`.
    ///
    /// The first registration wins: returns false and drops `delegate` if
    /// `step` already has one.
    pub fn add_update_delegate(&mut self, step: T, delegate: UpdateDelegate<T>) -> bool {
        if self.delegates.contains_key(&step) {
            debug!("Step {:?} already has an update delegate, keeping the first", step);
            return false;
        }
        self.delegates.insert(step, delegate);
        true
    }

    /// Removes the callback for `step`. Returns true if one existed.
    pub fn remove_update_delegate(&mut self, step: T) -> bool {
        self.delegates.remove(&step).is_some()
    }

    pub fn clear_update_delegates(&mut self) {
        self.delegates.clear();
    }

    pub fn has_update_delegate(&self, step: T) -> bool {
        self.delegates.contains_key(&step)
    }

    //--- Queries ----------------------------------------------------------

    pub fn is_initialized(&self) -> bool {
        self.cursor.is_some()
    }

    /// Current step, or `None` before `init_step`.
    pub fn step(&self) -> Option<T> {
        self.cursor.as_ref().map(StepCursor::step)
    }

    /// Previous step, or `None` before `init_step`.
    pub fn prev_step(&self) -> Option<T> {
        self.cursor.as_ref().map(StepCursor::prev_step)
    }

    pub fn cursor(&self) -> Option<&StepCursor<T>> {
        self.cursor.as_ref()
    }

    pub fn cursor_mut(&mut self) -> Option<&mut StepCursor<T>> {
        self.cursor.as_mut()
    }

    //--- Timer Forwarding -------------------------------------------------
    //
    // Before init_step there is no cursor: reads return zero and writes
    // are dropped.
    //

    pub fn sub_step(&self) -> i32 {
        self.cursor.as_ref().map_or(0, StepCursor::sub_step)
    }

    pub fn set_sub_step(&mut self, sub_step: i32) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.set_sub_step(sub_step);
        }
    }

    pub fn timer(&self) -> f32 {
        self.cursor.as_ref().map_or(0.0, StepCursor::timer)
    }

    pub fn add_timer(&mut self, dt: f32) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.add_timer(dt);
        }
    }

    pub fn set_timer(&mut self, time: f32) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.set_timer(time);
        }
    }

    pub fn clear_timer(&mut self) {
        self.set_timer(0.0);
    }

    pub fn sub_timer(&self) -> f32 {
        self.cursor.as_ref().map_or(0.0, StepCursor::sub_timer)
    }

    pub fn add_sub_timer(&mut self, dt: f32) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.add_sub_timer(dt);
        }
    }

    pub fn set_sub_timer(&mut self, time: f32) {
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.set_sub_timer(time);
        }
    }

    pub fn clear_sub_timer(&mut self) {
        self.set_sub_timer(0.0);
    }

    //--- Internal Helpers -------------------------------------------------

    fn run_phase(&mut self, sub_step: i32) {
        self.set_sub_step(sub_step);
        self.update(0.0);
    }
}

impl<T: Copy + Eq + Hash + Debug> Default for StepTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
