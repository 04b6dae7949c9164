//=========================================================================
// Step Tracking
//=========================================================================
//
// Step / sub-step bookkeeping with per-step timers.
//
// Architecture:
//   StepTracker<T>
//     ├─ cursor: Option<StepCursor<T>>   (None until init_step)
//     └─ delegates: HashMap<T, UpdateDelegate<T>>
//
// Sub-step protocol around a step change:
//
//   old step: FINISH → callback
//   new step: INIT   → callback → 0 → callback every update ...
//
// A callback typically switches on the sub-step:
//
// ```rust
// # use layered_state_machine::core::step::{StepCursor, SUB_STEP_INIT, SUB_STEP_FINISH};
// fn tick(cursor: &mut StepCursor<u8>, dt: f32) {
//     match cursor.sub_step() {
//         SUB_STEP_INIT => { /* setup */ }
//         0 => {
//             cursor.add_sub_timer(dt);
//             if cursor.sub_timer() >= 0.5 {
//                 cursor.set_sub_step(1);
//             }
//         }
//         SUB_STEP_FINISH => { /* teardown */ }
//         _ => {}
//     }
// }
// ```
//
//=========================================================================

//=== Module Declarations =================================================

mod cursor;
mod tracker;

//=== Public API ==========================================================

pub use cursor::StepCursor;
pub use tracker::{StepTracker, UpdateDelegate};

//=== Sub-step Sentinels ==================================================

/// Sub-step value while a step's setup callback runs.
pub const SUB_STEP_INIT: i32 = -1;

/// Sub-step value while a step's teardown callback runs.
///
/// Kept far above ordinary sub-step numbers so it never collides with them.
pub const SUB_STEP_FINISH: i32 = 128;
