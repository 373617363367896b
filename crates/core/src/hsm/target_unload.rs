//! Target unload behavior
//!
//! Shared by both unload phases; the mission owns one instance per target.
//! The rover arrives here having just clipped the target's tape marking.
//! The chart backs off, re-approaches until the center sensor is on the
//! mark (nudging itself square via the corner sensors), then runs the
//! servo choreography: bridge out, sweep the hopper high, dwell, sweep it
//! low, dwell, recenter and retract. A retreat and a 90 degree turn later
//! it emits `Unloaded` for the mission layer.
//!
//! The sweep moves one parameterized step per servo timer tick, so the
//! pulse stays inside the configured band and the horn speed is tunable.

use crate::events::{Event, EventKind, TapeFlags};
use crate::hsm::{pivot_turn, tank_turn, Chart, Context, Side, Verdict};
use crate::runtime::timer;
use crate::servo::step_toward;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetUnloadState {
    InitPseudo,
    Backward,
    Forward,
    AlignToTape,
    PivotTurn,
    UnloadTwo,
    UnloadOne,
    TankTurn,
}

/// Tape-mark docking and hopper-emptying chart.
#[derive(Debug)]
pub struct TargetUnloadChart {
    state: TargetUnloadState,
    /// Corner the rover is currently steering back toward
    side: Side,
    /// Last commanded sweep pulse (us)
    pulse: u16,
}

impl TargetUnloadChart {
    pub const fn new() -> Self {
        Self {
            state: TargetUnloadState::InitPseudo,
            side: Side::Right,
            pulse: 0,
        }
    }

    fn opposite_corner(&self) -> TapeFlags {
        match self.side {
            Side::Left => TapeFlags::FRONT_RIGHT,
            Side::Right => TapeFlags::FRONT_LEFT,
        }
    }
}

impl Default for TargetUnloadChart {
    fn default() -> Self {
        Self::new()
    }
}

impl Chart for TargetUnloadChart {
    type State = TargetUnloadState;
    const INITIAL: TargetUnloadState = TargetUnloadState::InitPseudo;

    fn state(&self) -> TargetUnloadState {
        self.state
    }

    fn set_state(&mut self, state: TargetUnloadState) {
        self.state = state;
    }

    fn dispatch(
        &mut self,
        state: TargetUnloadState,
        event: Event,
        ctx: &mut Context<'_>,
    ) -> Verdict<TargetUnloadState> {
        use TargetUnloadState as S;
        match state {
            S::InitPseudo => match event.kind {
                EventKind::Init => {
                    self.side = Side::Right;
                    self.pulse = ctx.tuning.unload.sweep_mid;
                    Verdict::Transition(S::Backward)
                }
                _ => Verdict::Stay,
            },

            S::Backward => match event.kind {
                EventKind::Entry => {
                    ctx.drive.move_backward();
                    ctx.timers.arm(timer::LONG, ctx.tuning.unload.retreat_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::LONG => {
                    Verdict::Transition(S::Forward)
                }
                // Armed by the post-unload path; beats the retreat timer on
                // a same-tick expiry because its id is lower
                EventKind::Timeout if event.param == timer::MEDIUM => {
                    Verdict::Transition(S::TankTurn)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::LONG);
                    ctx.timers.stop(timer::MEDIUM);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::Forward => match event.kind {
                EventKind::Entry => {
                    ctx.drive.move_forward();
                    Verdict::Consume
                }
                EventKind::TapeTriggered => {
                    let mask = TapeFlags::from_bits_truncate(event.param);
                    if mask.contains(TapeFlags::FRONT_MIDDLE) {
                        Verdict::Transition(S::UnloadTwo)
                    } else if mask.contains(TapeFlags::FRONT_LEFT) {
                        self.side = Side::Left;
                        Verdict::Transition(S::AlignToTape)
                    } else if mask.contains(TapeFlags::FRONT_RIGHT) {
                        self.side = Side::Right;
                        Verdict::Transition(S::AlignToTape)
                    } else {
                        Verdict::Stay
                    }
                }
                _ => Verdict::Stay,
            },

            S::AlignToTape => match event.kind {
                EventKind::Entry => {
                    tank_turn(ctx, self.side);
                    Verdict::Consume
                }
                EventKind::TapeTriggered => {
                    let mask = TapeFlags::from_bits_truncate(event.param);
                    if mask.contains(TapeFlags::FRONT_MIDDLE) {
                        Verdict::Transition(S::UnloadTwo)
                    } else if mask.contains(self.opposite_corner()) {
                        // Turned past the mark, pivot back onto it
                        Verdict::Transition(S::PivotTurn)
                    } else {
                        Verdict::Stay
                    }
                }
                _ => Verdict::Stay,
            },

            S::PivotTurn => match event.kind {
                EventKind::Entry => {
                    pivot_turn(ctx, self.side.opposite());
                    Verdict::Consume
                }
                EventKind::TapeTriggered => {
                    let mask = TapeFlags::from_bits_truncate(event.param);
                    if mask.contains(self.opposite_corner()) {
                        Verdict::Transition(S::Forward)
                    } else {
                        Verdict::Stay
                    }
                }
                _ => Verdict::Stay,
            },

            S::UnloadTwo => match event.kind {
                EventKind::Entry => {
                    ctx.drive.stop_moving();
                    let _ = ctx.servos.set_bridge_pulse(ctx.tuning.unload.bridge_out);
                    ctx.timers.arm(timer::SERVO, ctx.tuning.timing.servo_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::SERVO => {
                    self.pulse = step_toward(
                        self.pulse,
                        ctx.tuning.unload.sweep_high,
                        ctx.tuning.unload.sweep_step,
                    );
                    let _ = ctx.servos.set_unloading_pulse(self.pulse);
                    if self.pulse == ctx.tuning.unload.sweep_high {
                        ctx.timers.arm(timer::LONG, ctx.tuning.unload.dwell_ticks);
                    } else {
                        ctx.timers.arm(timer::SERVO, ctx.tuning.timing.servo_ticks);
                    }
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::LONG => {
                    self.pulse = ctx.tuning.unload.sweep_mid;
                    let _ = ctx.servos.set_unloading_pulse(self.pulse);
                    Verdict::Transition(S::UnloadOne)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::SERVO);
                    ctx.timers.stop(timer::LONG);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::UnloadOne => match event.kind {
                EventKind::Entry => {
                    ctx.timers.arm(timer::SERVO, ctx.tuning.timing.servo_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::SERVO => {
                    self.pulse = step_toward(
                        self.pulse,
                        ctx.tuning.unload.sweep_low,
                        ctx.tuning.unload.sweep_step,
                    );
                    let _ = ctx.servos.set_unloading_pulse(self.pulse);
                    if self.pulse == ctx.tuning.unload.sweep_low {
                        ctx.timers.arm(timer::LONG, ctx.tuning.unload.dwell_ticks);
                    } else {
                        ctx.timers.arm(timer::SERVO, ctx.tuning.timing.servo_ticks);
                    }
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::LONG => {
                    self.pulse = ctx.tuning.unload.sweep_mid;
                    let _ = ctx.servos.set_unloading_pulse(self.pulse);
                    let _ = ctx.servos.set_bridge_pulse(ctx.tuning.unload.bridge_in);
                    ctx.timers.arm(timer::MEDIUM, ctx.tuning.timing.medium_ticks);
                    Verdict::Transition(S::Backward)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::SERVO);
                    ctx.timers.stop(timer::LONG);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::TankTurn => match event.kind {
                EventKind::Entry => {
                    ctx.drive.tank_turn_left();
                    ctx.timers.arm(timer::TURN_90, ctx.tuning.timing.turn_90_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::TURN_90 => {
                    Verdict::TransitionWith(S::Backward, Event::of(EventKind::Unloaded))
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::TURN_90);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },
        }
    }
}
