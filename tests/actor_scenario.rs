//=========================================================================
// Actor Scenario
//=========================================================================
//
// Headless actor driven by a two-layer machine: a shared General layer
// holding the default Idle state and an ActorState layer with three
// behaviors that fall back to Idle after a fixed time.
//
//=========================================================================

use layered_state_machine::prelude::*;

//=== Actor ===============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum General {
    Idle,
}

impl StateKey for General {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ActorState {
    Move,
    Color,
    Zoom,
}

impl StateKey for ActorState {}

struct Actor {
    x: f32,
    hue: f32,
    scale: f32,
    /// Seconds before a behavior returns to Idle. 0 disables it.
    auto_back: f32,
}

impl Actor {
    fn new(auto_back: f32) -> Self {
        Self {
            x: 0.0,
            hue: 0.0,
            scale: 1.0,
            auto_back,
        }
    }
}

type ActorMachine = DoubleLayerMachine<General, ActorState, Actor>;

//--- States --------------------------------------------------------------

fn back_to_default_after(ctx: &mut StateContext<'_, Actor>, dt: f32) {
    if ctx.owner.auto_back > 0.0 {
        ctx.add_timer(dt);
        if ctx.timer() >= ctx.owner.auto_back {
            ctx.to_default_state();
        }
    }
}

struct Idle;

impl State<Actor> for Idle {
    fn can_change_state(&self, view: &StateView<'_>) -> bool {
        !view.is_current(General::Idle)
    }
}

/// Sweeps between two points, one sweep per second.
struct Move {
    from: f32,
    to: f32,
}

impl Move {
    const LEFT: f32 = -300.0;
    const RIGHT: f32 = 300.0;
    const SWEEP_TIME: f32 = 1.0;

    fn new() -> Self {
        Self {
            from: Self::LEFT,
            to: Self::RIGHT,
        }
    }
}

impl State<Actor> for Move {
    fn on_begin(&mut self, _ctx: &mut StateContext<'_, Actor>, _prev: Option<StateIndex>) {
        self.from = Self::LEFT;
        self.to = Self::RIGHT;
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_, Actor>, dt: f32) {
        match ctx.sub_step() {
            0 => {
                ctx.add_sub_timer(dt);
                let t = (ctx.sub_timer() / Self::SWEEP_TIME).min(1.0);
                ctx.owner.x = self.from + (self.to - self.from) * t;
                if t >= 1.0 {
                    ctx.set_sub_step(1);
                }
            }
            1 => {
                std::mem::swap(&mut self.from, &mut self.to);
                ctx.set_sub_step(0);
            }
            _ => {}
        }
        back_to_default_after(ctx, dt);
    }

    fn on_end(&mut self, ctx: &mut StateContext<'_, Actor>, _next: StateIndex) {
        ctx.owner.x = 0.0;
    }

    fn can_change_state(&self, view: &StateView<'_>) -> bool {
        !view.is_current(ActorState::Move)
    }
}

struct Color;

impl State<Actor> for Color {
    fn on_update(&mut self, ctx: &mut StateContext<'_, Actor>, dt: f32) {
        ctx.owner.hue = (ctx.owner.hue + dt * 0.5).fract();
        back_to_default_after(ctx, dt);
    }

    fn on_end(&mut self, ctx: &mut StateContext<'_, Actor>, _next: StateIndex) {
        ctx.owner.hue = 0.0;
    }

    fn can_change_state(&self, view: &StateView<'_>) -> bool {
        !view.is_current(ActorState::Color)
    }
}

struct Zoom;

impl State<Actor> for Zoom {
    fn on_begin(&mut self, ctx: &mut StateContext<'_, Actor>, _prev: Option<StateIndex>) {
        ctx.owner.scale = 2.0;
    }

    fn on_update(&mut self, ctx: &mut StateContext<'_, Actor>, dt: f32) {
        back_to_default_after(ctx, dt);
    }

    fn on_end(&mut self, ctx: &mut StateContext<'_, Actor>, _next: StateIndex) {
        ctx.owner.scale = 1.0;
    }

    fn can_change_state(&self, view: &StateView<'_>) -> bool {
        !view.is_current(ActorState::Zoom)
    }
}

fn actor_machine(actor: &mut Actor) -> ActorMachine {
    let mut machine = ActorMachine::new();
    machine.register_state(General::Idle, Idle, true);
    machine.register_state(ActorState::Move, Move::new(), false);
    machine.register_state(ActorState::Color, Color, false);
    machine.register_state(ActorState::Zoom, Zoom, false);
    machine
        .begin_state(actor, General::Idle)
        .expect("Idle is registered");
    machine
}

fn tick(machine: &mut ActorMachine, actor: &mut Actor, frames: usize, dt: f32) {
    for _ in 0..frames {
        machine.update(actor, dt).expect("no runaway transitions");
    }
}

//=== Tests ===============================================================

#[test]
fn layers_share_indices_in_registration_order() {
    let mut actor = Actor::new(0.0);
    let machine = actor_machine(&mut actor);

    assert_eq!(machine.state_index(General::Idle).unwrap(), StateIndex::new(0));
    assert_eq!(machine.state_index(ActorState::Move).unwrap(), StateIndex::new(1));
    assert_eq!(machine.state_index(ActorState::Zoom).unwrap(), StateIndex::new(3));
    assert_eq!(machine.default_index(), Some(StateIndex::new(0)));
    assert_eq!(machine.current_state_label().as_deref(), Some("Idle"));
}

#[test]
fn move_sweeps_and_reverses() {
    let mut actor = Actor::new(0.0);
    let mut machine = actor_machine(&mut actor);
    assert!(machine.set_state(&mut actor, ActorState::Move).unwrap());

    tick(&mut machine, &mut actor, 2, 0.25);
    assert!((actor.x - 0.0).abs() < 1e-3);

    // Reach the right end, then flip direction on the next frame.
    tick(&mut machine, &mut actor, 2, 0.25);
    assert!((actor.x - 300.0).abs() < 1e-3);
    tick(&mut machine, &mut actor, 1, 0.25);
    assert_eq!(machine.sub_step(), 0);

    tick(&mut machine, &mut actor, 1, 0.25);
    assert!((actor.x - 150.0).abs() < 1e-3);
}

#[test]
fn behaviors_refuse_to_restart_themselves() {
    let mut actor = Actor::new(0.0);
    let mut machine = actor_machine(&mut actor);

    // Idle refuses too, but as the default it is entered regardless.
    assert!(!machine.can_change_state(General::Idle));
    assert!(machine.set_state(&mut actor, General::Idle).unwrap());

    assert!(machine.set_state(&mut actor, ActorState::Zoom).unwrap());
    assert!(!machine.set_state(&mut actor, ActorState::Zoom).unwrap());
    assert!(machine.set_state(&mut actor, ActorState::Color).unwrap());
    assert_eq!(actor.scale, 1.0);
}

#[test]
fn behaviors_fall_back_to_idle_after_auto_back_time() {
    let mut actor = Actor::new(1.0);
    let mut machine = actor_machine(&mut actor);

    machine.set_state(&mut actor, ActorState::Zoom).unwrap();
    assert_eq!(actor.scale, 2.0);

    tick(&mut machine, &mut actor, 3, 0.25);
    assert!(machine.is_current_state(ActorState::Zoom));

    tick(&mut machine, &mut actor, 1, 0.25);
    assert!(machine.is_current_state(General::Idle));
    assert_eq!(actor.scale, 1.0);
    assert_eq!(machine.current_state_label().as_deref(), Some("Idle"));

    let last = machine.history().last().copied().unwrap();
    assert_eq!(last.from, machine.try_state_index(ActorState::Zoom));
    assert!((last.elapsed - 1.0).abs() < 1e-3);
}

#[test]
fn switching_behaviors_resets_the_previous_one() {
    let mut actor = Actor::new(0.0);
    let mut machine = actor_machine(&mut actor);

    machine.set_state(&mut actor, ActorState::Move).unwrap();
    tick(&mut machine, &mut actor, 3, 0.25);
    assert!(actor.x > 0.0);

    machine.set_state(&mut actor, ActorState::Color).unwrap();
    assert_eq!(actor.x, 0.0);
    assert_eq!(machine.timer(), 0.0);

    tick(&mut machine, &mut actor, 2, 0.5);
    assert!(actor.hue > 0.0);
    assert_eq!(machine.current_state_of::<ActorState, _>(), Some(ActorState::Color));
    assert_eq!(machine.current_state_of::<General, _>(), None);

    let visited: Vec<Option<String>> = machine
        .history()
        .path()
        .into_iter()
        .map(|index| machine.core().layers().label_of(index))
        .collect();
    assert_eq!(
        visited,
        vec![Some("Idle".to_string()), Some("Move".to_string()), Some("Color".to_string())]
    );
}

#[test]
fn paused_actor_freezes_in_place() {
    let mut actor = Actor::new(0.0);
    let mut machine = actor_machine(&mut actor);
    machine.set_state(&mut actor, ActorState::Move).unwrap();
    tick(&mut machine, &mut actor, 1, 0.25);
    let frozen = actor.x;

    machine.set_paused(true);
    tick(&mut machine, &mut actor, 10, 0.25);

    assert_eq!(actor.x, frozen);
    assert!(machine.is_paused());
}
