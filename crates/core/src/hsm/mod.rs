//! Hierarchical state chart engine
//!
//! Each machine implements [`Chart`]: a state enum, accessors for the
//! current state, and one `dispatch` that matches `(state, event.kind)` and
//! returns a [`Verdict`]. Two free functions drive every chart identically:
//!
//! - [`init_chart`] resets to the initial pseudo-state and runs the chart
//!   once with `Init`; success means the chart consumed it.
//! - [`run_chart`] dispatches one event. When the verdict is a transition,
//!   the engine synchronously delivers `Exit` to the old state, switches,
//!   and delivers `Entry` to the new one, looping while entry handlers keep
//!   transitioning so chains run without recursion.
//!
//! The returned event is decided solely by the verdict on the *triggering*
//! event: `Stay` hands the event back unchanged (not consumed, the layer
//! above sees it), `Consume` swallows it, `Rewrite`/`TransitionWith`
//! substitute a new one. Verdicts returned by `Entry`/`Exit` deliveries
//! affect only chaining, never the propagated event.
//!
//! Unrecognized `(state, kind)` pairs fall to each chart's default arm and
//! return `Stay`; an unhandled event is ordinary, not an error.

pub mod ammo_load;
pub mod ammo_search;
pub mod first_target_search;
pub mod mission;
pub mod second_target_approach;
pub mod second_target_search;
pub mod target_unload;

pub use mission::{MissionChart, Phase};

use crate::drive::DriveInterface;
use crate::events::{Event, EventKind};
use crate::parameters::Tuning;
use crate::runtime::TimerBank;
use crate::servo::ServoInterface;
use crate::services::SensorSnapshot;

/// Turn/maneuver direction used by the charts' private memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// What a state handler decided about one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<S> {
    /// Not consumed; the event propagates to the layer above unchanged.
    Stay,
    /// Consumed in place.
    Consume,
    /// Consumed and replaced; the new event propagates upward.
    Rewrite(Event),
    /// Consumed; leave this state for `next`.
    Transition(S),
    /// Leave this state for `next` and propagate `event` upward.
    TransitionWith(S, Event),
}

/// Everything a handler may touch: actuators, timers, the debounced sensor
/// snapshot (read-only), and the tunable parameters.
pub struct Context<'a> {
    pub drive: &'a mut dyn DriveInterface,
    pub servos: &'a mut dyn ServoInterface,
    pub timers: &'a mut TimerBank,
    pub snapshot: SensorSnapshot,
    pub tuning: &'a Tuning,
}

/// Tank-turn toward `side`.
pub(crate) fn tank_turn(ctx: &mut Context<'_>, side: Side) {
    match side {
        Side::Left => ctx.drive.tank_turn_left(),
        Side::Right => ctx.drive.tank_turn_right(),
    }
}

/// Forward pivot toward `side`.
pub(crate) fn pivot_turn(ctx: &mut Context<'_>, side: Side) {
    match side {
        Side::Left => ctx.drive.pivot_turn_left(),
        Side::Right => ctx.drive.pivot_turn_right(),
    }
}

/// Backward pivot rotating toward `side`.
pub(crate) fn pivot_turn_backward(ctx: &mut Context<'_>, side: Side) {
    match side {
        Side::Left => ctx.drive.pivot_turn_left_backward(),
        Side::Right => ctx.drive.pivot_turn_right_backward(),
    }
}

/// Gradual turn toward `side` with the given wheel differential.
pub(crate) fn gradual_turn(ctx: &mut Context<'_>, side: Side, difference: u8) {
    match side {
        Side::Left => ctx.drive.gradual_turn_left(difference),
        Side::Right => ctx.drive.gradual_turn_right(difference),
    }
}

/// One state chart.
pub trait Chart {
    type State: Copy + PartialEq;

    /// Initial pseudo-state the chart resets to before `Init`.
    const INITIAL: Self::State;

    fn state(&self) -> Self::State;
    fn set_state(&mut self, state: Self::State);

    /// Handle one event in one state.
    fn dispatch(
        &mut self,
        state: Self::State,
        event: Event,
        ctx: &mut Context<'_>,
    ) -> Verdict<Self::State>;
}

/// Reset a chart and run it once with `Init`; true when the chart consumed
/// the event (its initial transition happened).
pub fn init_chart<C: Chart>(chart: &mut C, ctx: &mut Context<'_>) -> bool {
    chart.set_state(C::INITIAL);
    run_chart(chart, Event::init(), ctx).kind == EventKind::NoEvent
}

/// Dispatch one event through a chart, resolving any resulting transition
/// chain, and return the event the chart hands back upward.
pub fn run_chart<C: Chart>(chart: &mut C, event: Event, ctx: &mut Context<'_>) -> Event {
    match chart.dispatch(chart.state(), event, ctx) {
        Verdict::Stay => event,
        Verdict::Consume => Event::none(),
        Verdict::Rewrite(ev) => ev,
        Verdict::Transition(next) => {
            take_transition(chart, next, ctx);
            Event::none()
        }
        Verdict::TransitionWith(next, ev) => {
            take_transition(chart, next, ctx);
            ev
        }
    }
}

/// Deliver `Exit` to the current state, switch, deliver `Entry` to the new
/// one; repeat while entry handlers keep transitioning.
fn take_transition<C: Chart>(chart: &mut C, next: C::State, ctx: &mut Context<'_>) {
    let mut next = next;
    loop {
        let old = chart.state();
        let _ = chart.dispatch(old, Event::exit(), ctx);
        chart.set_state(next);
        match chart.dispatch(next, Event::entry(), ctx) {
            Verdict::Transition(n) | Verdict::TransitionWith(n, _) => next = n,
            _ => break,
        }
    }
}
