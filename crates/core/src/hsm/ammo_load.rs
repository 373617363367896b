//! Ammo loading behavior
//!
//! Runs while the rover sits at the loading station. The chart backs onto
//! the station (pivoting around the side the tape was last followed on),
//! drives in until the back track wire confirms the chute is overhead,
//! squares up with a timed turn, then reverses slowly under the dispenser
//! and shimmies to settle the balls. The sixth shimmy flip emits
//! `Unloaded`, which the mission layer treats as "loading done".

use crate::events::{Event, EventKind, TapeFlags, WireFlags};
use crate::hsm::{pivot_turn_backward, tank_turn, Chart, Context, Side, Verdict};
use crate::runtime::timer;
use crate::services::TapeSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmoLoadState {
    InitPseudo,
    PivotTurn,
    Forward,
    TankTurn,
    Backward,
    Shimmy,
}

/// Loading station docking and ball-settling chart.
#[derive(Debug)]
pub struct AmmoLoadChart {
    state: AmmoLoadState,
    /// Side the docking pivot rotates toward, from the last followed tape
    side: Side,
    shimmy_count: u8,
    shimmy_dir: Side,
}

impl AmmoLoadChart {
    pub const fn new() -> Self {
        Self {
            state: AmmoLoadState::InitPseudo,
            side: Side::Right,
            shimmy_count: 0,
            shimmy_dir: Side::Left,
        }
    }
}

impl Default for AmmoLoadChart {
    fn default() -> Self {
        Self::new()
    }
}

impl Chart for AmmoLoadChart {
    type State = AmmoLoadState;
    const INITIAL: AmmoLoadState = AmmoLoadState::InitPseudo;

    fn state(&self) -> AmmoLoadState {
        self.state
    }

    fn set_state(&mut self, state: AmmoLoadState) {
        self.state = state;
    }

    fn dispatch(
        &mut self,
        state: AmmoLoadState,
        event: Event,
        ctx: &mut Context<'_>,
    ) -> Verdict<AmmoLoadState> {
        use AmmoLoadState as S;
        match state {
            S::InitPseudo => match event.kind {
                EventKind::Init => Verdict::Transition(S::PivotTurn),
                _ => Verdict::Stay,
            },

            S::PivotTurn => match event.kind {
                EventKind::Entry => {
                    self.side = if ctx.snapshot.last_tape == TapeSide::Left {
                        Side::Left
                    } else {
                        Side::Right
                    };
                    pivot_turn_backward(ctx, self.side);
                    Verdict::Consume
                }
                EventKind::TapeTriggered => {
                    let mask = TapeFlags::from_bits_truncate(event.param);
                    let back_bit = match self.side {
                        Side::Left => TapeFlags::BACK_LEFT,
                        Side::Right => TapeFlags::BACK_RIGHT,
                    };
                    if mask.contains(back_bit) {
                        // Rear corner over the station line: square enough
                        Verdict::Transition(S::Forward)
                    } else {
                        Verdict::Stay
                    }
                }
                _ => Verdict::Stay,
            },

            S::Forward => match event.kind {
                EventKind::Entry => {
                    ctx.drive.move_forward();
                    Verdict::Consume
                }
                EventKind::TwTriggered => {
                    let mask = WireFlags::from_bits_truncate(event.param);
                    if mask.contains(WireFlags::BACK) {
                        Verdict::Transition(S::TankTurn)
                    } else {
                        Verdict::Stay
                    }
                }
                _ => Verdict::Stay,
            },

            S::TankTurn => match event.kind {
                EventKind::Entry => {
                    tank_turn(ctx, self.side);
                    ctx.timers.arm(timer::TURN_45, ctx.tuning.timing.turn_45_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::TURN_45 => {
                    Verdict::Transition(S::Backward)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::TURN_45);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::Backward => match event.kind {
                EventKind::Entry => {
                    ctx.drive.move_backward();
                    ctx.drive.set_move_speed(ctx.tuning.unload.backup_speed);
                    ctx.timers.arm(timer::LONG, ctx.tuning.unload.backup_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::LONG => {
                    Verdict::Transition(S::Shimmy)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::LONG);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::Shimmy => match event.kind {
                EventKind::Entry => {
                    self.shimmy_count = 0;
                    self.shimmy_dir = Side::Left;
                    tank_turn(ctx, self.shimmy_dir);
                    // First flip comes early, later ones a full period apart
                    ctx.timers.arm(timer::SHIMMY, ctx.tuning.timing.shimmy_ticks / 2);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::SHIMMY => {
                    self.shimmy_count = self.shimmy_count.saturating_add(1);
                    if self.shimmy_count >= ctx.tuning.unload.shimmy_max {
                        Verdict::TransitionWith(S::PivotTurn, Event::of(EventKind::Unloaded))
                    } else {
                        self.shimmy_dir = self.shimmy_dir.opposite();
                        tank_turn(ctx, self.shimmy_dir);
                        ctx.timers.arm(timer::SHIMMY, ctx.tuning.timing.shimmy_ticks);
                        Verdict::Consume
                    }
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::SHIMMY);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },
        }
    }
}
