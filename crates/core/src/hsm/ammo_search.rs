//! Ammo search behavior
//!
//! Opening phase of the mission loop: wander until the loading station's
//! tape line is found, then follow it until the station's track wire
//! confirms arrival. The chart reports nothing itself. The mission layer
//! watches for the `TwTriggered` front-wire event this chart deliberately
//! leaves unconsumed once the rover is tape-following.
//!
//! Obstacle handling carries a per-side stuck counter. A trigger normally
//! picks the dodge turn away from the triggering side; once one side has
//! triggered more times in a row than the configured threshold, the turn is
//! forced into that side to break the oscillation. Triggering the other
//! side clears its rival's count.

use crate::events::{BumperFlags, Event, EventKind, TapeFlags, WireFlags};
use crate::hsm::{gradual_turn, pivot_turn, tank_turn, Chart, Context, Side, Verdict};
use crate::runtime::timer;
use crate::services::TapeSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmmoSearchState {
    InitPseudo,
    Forward,
    TankTurn,
    AlignToTape,
    FollowTape,
    Backward,
}

/// Field wandering and tape acquisition chart.
#[derive(Debug)]
pub struct AmmoSearchChart {
    state: AmmoSearchState,
    /// Direction the next recovery turn will take
    turn: Side,
    /// Consecutive same-side trigger counts, indexed by [`Side::index`]
    stuck: [u8; 2],
}

impl AmmoSearchChart {
    pub const fn new() -> Self {
        Self {
            state: AmmoSearchState::InitPseudo,
            turn: Side::Left,
            stuck: [0; 2],
        }
    }

    /// Stuck rule: count the trigger, zero the rival, dodge away unless
    /// this side has exceeded the threshold.
    fn choose_turn(&mut self, trigger: Side, threshold: u8) {
        let count = self.stuck[trigger.index()].saturating_add(1);
        self.stuck[trigger.index()] = count;
        self.stuck[trigger.opposite().index()] = 0;
        self.turn = if count > threshold {
            trigger
        } else {
            trigger.opposite()
        };
    }
}

impl Default for AmmoSearchChart {
    fn default() -> Self {
        Self::new()
    }
}

/// A hit on exactly one front bumper, and which side it was.
fn bump_side(param: u16) -> Option<Side> {
    let mask = BumperFlags::from_bits_truncate(param);
    if mask == BumperFlags::FRONT_RIGHT {
        Some(Side::Right)
    } else if mask == BumperFlags::FRONT_LEFT {
        Some(Side::Left)
    } else {
        None
    }
}

const FRONT_CORNERS: TapeFlags = TapeFlags::FRONT_RIGHT.union(TapeFlags::FRONT_LEFT);

impl Chart for AmmoSearchChart {
    type State = AmmoSearchState;
    const INITIAL: AmmoSearchState = AmmoSearchState::InitPseudo;

    fn state(&self) -> AmmoSearchState {
        self.state
    }

    fn set_state(&mut self, state: AmmoSearchState) {
        self.state = state;
    }

    fn dispatch(
        &mut self,
        state: AmmoSearchState,
        event: Event,
        ctx: &mut Context<'_>,
    ) -> Verdict<AmmoSearchState> {
        use AmmoSearchState as S;
        match state {
            S::InitPseudo => match event.kind {
                EventKind::Init => {
                    self.turn = Side::Left;
                    self.stuck = [0; 2];
                    Verdict::Transition(S::Forward)
                }
                _ => Verdict::Stay,
            },

            S::Forward => match event.kind {
                EventKind::Entry => {
                    ctx.drive.move_forward();
                    Verdict::Consume
                }
                EventKind::TapeTriggered => {
                    let wired = ctx.snapshot.wire_front && ctx.snapshot.wire_back;
                    if !wired && ctx.snapshot.last_tape == TapeSide::NotFollowing {
                        // Stray reflection far from any station
                        return Verdict::Stay;
                    }
                    let mask = TapeFlags::from_bits_truncate(event.param);
                    if mask.contains(TapeFlags::FRONT_RIGHT) {
                        self.choose_turn(Side::Right, ctx.tuning.search.stuck_threshold);
                        Verdict::Transition(S::AlignToTape)
                    } else if mask.contains(TapeFlags::FRONT_LEFT) {
                        self.choose_turn(Side::Left, ctx.tuning.search.stuck_threshold);
                        Verdict::Transition(S::AlignToTape)
                    } else {
                        Verdict::Stay
                    }
                }
                EventKind::Bumped => match bump_side(event.param) {
                    Some(side) => {
                        self.choose_turn(side, ctx.tuning.search.stuck_threshold);
                        ctx.timers.arm(timer::MEDIUM, ctx.tuning.timing.medium_ticks);
                        Verdict::Transition(S::Backward)
                    }
                    None => Verdict::Stay,
                },
                EventKind::TwTriggered => {
                    let mask = WireFlags::from_bits_truncate(event.param);
                    if mask.contains(WireFlags::FRONT)
                        && ctx.snapshot.last_tape == TapeSide::NotFollowing
                    {
                        // Wire without tape history means a blind approach,
                        // back out and come at the station again
                        ctx.timers.arm(timer::LONG, ctx.tuning.timing.long_ticks);
                        Verdict::Transition(S::Backward)
                    } else {
                        Verdict::Stay
                    }
                }
                _ => Verdict::Stay,
            },

            S::TankTurn => match event.kind {
                EventKind::Entry => {
                    pivot_turn(ctx, self.turn);
                    Verdict::Consume
                }
                EventKind::Timeout
                    if event.param == timer::TURN_45 || event.param == timer::TURN_22 =>
                {
                    Verdict::Transition(S::Forward)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::TURN_45);
                    ctx.timers.stop(timer::TURN_22);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::AlignToTape => match event.kind {
                EventKind::Entry => {
                    tank_turn(ctx, self.turn);
                    Verdict::Consume
                }
                EventKind::TapeTriggered => {
                    let mask = TapeFlags::from_bits_truncate(event.param);
                    if mask.intersects(FRONT_CORNERS) {
                        return Verdict::Stay;
                    }
                    // Both front corners clear of the line: aligned along it
                    self.turn = self.turn.opposite();
                    gradual_turn(ctx, self.turn, ctx.tuning.search.align_diff);
                    Verdict::Transition(S::FollowTape)
                }
                _ => Verdict::Stay,
            },

            S::FollowTape => match event.kind {
                EventKind::Entry => Verdict::Consume,
                EventKind::TapeTriggered => {
                    let mask = TapeFlags::from_bits_truncate(event.param);
                    if mask.intersects(FRONT_CORNERS) {
                        return Verdict::Stay;
                    }
                    // Drifting off the line again, correct harder this time
                    gradual_turn(ctx, self.turn, ctx.tuning.search.follow_diff);
                    Verdict::Consume
                }
                EventKind::Bumped => match bump_side(event.param) {
                    Some(side) => {
                        self.choose_turn(side, ctx.tuning.search.stuck_threshold);
                        ctx.timers.arm(timer::MEDIUM, ctx.tuning.timing.medium_ticks);
                        Verdict::Transition(S::Backward)
                    }
                    None => Verdict::Stay,
                },
                _ => Verdict::Stay,
            },

            S::Backward => match event.kind {
                EventKind::Entry => {
                    ctx.drive.move_backward();
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::MEDIUM => {
                    ctx.timers.arm(timer::TURN_45, ctx.tuning.timing.turn_45_ticks);
                    Verdict::Transition(S::TankTurn)
                }
                EventKind::Timeout if event.param == timer::LONG => {
                    ctx.timers.arm(timer::TURN_22, ctx.tuning.timing.turn_22_ticks);
                    Verdict::Transition(S::TankTurn)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::MEDIUM);
                    ctx.timers.stop(timer::LONG);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },
        }
    }
}
