//=========================================================================
// Step Cursor
//=========================================================================
//
// The position and timers of a step tracker: current and previous step,
// sub-step, timer and sub-timer.
//
// Timer is cleared whenever the step changes; sub-timer whenever the
// sub-step changes. Neither is advanced automatically: owners add `dt`
// themselves when they want a clock.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{SUB_STEP_FINISH, SUB_STEP_INIT};

//=== StepCursor ==========================================================

/// Current position and timers of a [`StepTracker`](super::StepTracker).
#[derive(Debug, Clone, PartialEq)]
pub struct StepCursor<T> {
    step: T,
    prev_step: T,
    sub_step: i32,
    timer: f32,
    sub_timer: f32,
}

impl<T: Copy + PartialEq> StepCursor<T> {
    /// Creates a cursor at `initial`, with previous step equal to it.
    pub fn new(initial: T) -> Self {
        Self {
            step: initial,
            prev_step: initial,
            sub_step: 0,
            timer: 0.0,
            sub_timer: 0.0,
        }
    }

    //--- Steps ------------------------------------------------------------

    pub fn step(&self) -> T {
        self.step
    }

    pub fn prev_step(&self) -> T {
        self.prev_step
    }

    /// Moves to `next` without running any callback.
    ///
    /// Previous step takes the current value, the timer is cleared and the
    /// sub-step returns to 0. Applies even when `next` equals the current
    /// step.
    pub(crate) fn advance(&mut self, next: T) {
        self.prev_step = self.step;
        self.step = next;
        self.clear_timer();
        self.set_sub_step(0);
    }

    //--- Sub-steps --------------------------------------------------------

    pub fn sub_step(&self) -> i32 {
        self.sub_step
    }

    /// Sets the sub-step and clears the sub-timer.
    pub fn set_sub_step(&mut self, sub_step: i32) {
        self.sub_step = sub_step;
        self.clear_sub_timer();
    }

    /// True while the step's setup callback runs.
    pub fn is_init(&self) -> bool {
        self.sub_step == SUB_STEP_INIT
    }

    /// True while the step's teardown callback runs.
    pub fn is_finish(&self) -> bool {
        self.sub_step == SUB_STEP_FINISH
    }

    //--- Timers -----------------------------------------------------------

    /// Seconds accumulated since the last step change.
    pub fn timer(&self) -> f32 {
        self.timer
    }

    pub fn add_timer(&mut self, dt: f32) {
        self.timer += dt;
    }

    pub fn set_timer(&mut self, time: f32) {
        self.timer = time;
    }

    pub fn clear_timer(&mut self) {
        self.timer = 0.0;
    }

    /// Seconds accumulated since the last sub-step change.
    pub fn sub_timer(&self) -> f32 {
        self.sub_timer
    }

    pub fn add_sub_timer(&mut self, dt: f32) {
        self.sub_timer += dt;
    }

    pub fn set_sub_timer(&mut self, time: f32) {
        self.sub_timer = time;
    }

    pub fn clear_sub_timer(&mut self) {
        self.sub_timer = 0.0;
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cursor_starts_at_rest() {
        let cursor = StepCursor::new(3u8);
        assert_eq!(cursor.step(), 3);
        assert_eq!(cursor.prev_step(), 3);
        assert_eq!(cursor.sub_step(), 0);
        assert_eq!(cursor.timer(), 0.0);
        assert_eq!(cursor.sub_timer(), 0.0);
    }

    #[test]
    fn sub_step_change_clears_only_sub_timer() {
        let mut cursor = StepCursor::new(0u8);
        cursor.add_timer(1.5);
        cursor.add_sub_timer(0.75);

        cursor.set_sub_step(2);

        assert_eq!(cursor.sub_step(), 2);
        assert_eq!(cursor.sub_timer(), 0.0);
        assert_eq!(cursor.timer(), 1.5);
    }

    #[test]
    fn advance_resets_timers_and_records_previous() {
        let mut cursor = StepCursor::new(0u8);
        cursor.add_timer(2.0);
        cursor.set_sub_step(4);
        cursor.add_sub_timer(1.0);

        cursor.advance(1);

        assert_eq!(cursor.step(), 1);
        assert_eq!(cursor.prev_step(), 0);
        assert_eq!(cursor.sub_step(), 0);
        assert_eq!(cursor.timer(), 0.0);
        assert_eq!(cursor.sub_timer(), 0.0);
    }

    #[test]
    fn advance_to_same_step_still_restarts() {
        let mut cursor = StepCursor::new(5u8);
        cursor.add_timer(1.0);

        cursor.advance(5);

        assert_eq!(cursor.step(), 5);
        assert_eq!(cursor.prev_step(), 5);
        assert_eq!(cursor.timer(), 0.0);
    }

    #[test]
    fn sentinel_phases_are_detected() {
        let mut cursor = StepCursor::new(0u8);
        cursor.set_sub_step(SUB_STEP_INIT);
        assert!(cursor.is_init());
        cursor.set_sub_step(SUB_STEP_FINISH);
        assert!(cursor.is_finish());
        cursor.set_timer(0.25);
        cursor.set_sub_timer(0.5);
        assert_eq!(cursor.timer(), 0.25);
        assert_eq!(cursor.sub_timer(), 0.5);
    }
}
