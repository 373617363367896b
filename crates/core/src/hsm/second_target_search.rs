//! Second target search behavior
//!
//! The second target sits away from the tape network, so the rover leaves
//! the first target behind and spirals outward: back off the mark, turn to
//! face out, then circle with a wheel differential that shrinks by a fixed
//! step each half-revolution. Shrinking the differential straightens the
//! arc, so every leg sweeps new ground. Hitting tape or an obstacle
//! restarts the spiral from the new position.
//!
//! `BeaconTriggered` is left for the mission layer; seeing the second
//! beacon is this phase's completion condition.

use crate::events::{BumperFlags, Event, EventKind, TapeFlags};
use crate::hsm::{gradual_turn, Chart, Context, Side, Verdict};
use crate::runtime::timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondTargetSearchState {
    InitPseudo,
    Backward,
    TankTurn,
    GradualTurn,
}

/// Outward spiral chart hunting the second beacon.
#[derive(Debug)]
pub struct SecondTargetSearchChart {
    state: SecondTargetSearchState,
    /// Wheel differential of the current spiral leg
    difference: u8,
    dir: Side,
}

impl SecondTargetSearchChart {
    pub const fn new() -> Self {
        Self {
            state: SecondTargetSearchState::InitPseudo,
            difference: 0,
            dir: Side::Right,
        }
    }
}

impl Default for SecondTargetSearchChart {
    fn default() -> Self {
        Self::new()
    }
}

const FRONT_TAPE: TapeFlags = TapeFlags::FRONT_RIGHT
    .union(TapeFlags::FRONT_LEFT)
    .union(TapeFlags::FRONT_MIDDLE);

const FRONT_BUMPERS: BumperFlags = BumperFlags::FRONT_RIGHT.union(BumperFlags::FRONT_LEFT);

impl Chart for SecondTargetSearchChart {
    type State = SecondTargetSearchState;
    const INITIAL: SecondTargetSearchState = SecondTargetSearchState::InitPseudo;

    fn state(&self) -> SecondTargetSearchState {
        self.state
    }

    fn set_state(&mut self, state: SecondTargetSearchState) {
        self.state = state;
    }

    fn dispatch(
        &mut self,
        state: SecondTargetSearchState,
        event: Event,
        ctx: &mut Context<'_>,
    ) -> Verdict<SecondTargetSearchState> {
        use SecondTargetSearchState as S;
        match state {
            S::InitPseudo => match event.kind {
                EventKind::Init => Verdict::Transition(S::Backward),
                _ => Verdict::Stay,
            },

            S::Backward => match event.kind {
                EventKind::Entry => {
                    // A fresh spiral from wherever the rover ended up
                    self.difference = ctx.tuning.search.spiral_diff;
                    self.dir = Side::Right;
                    ctx.drive.move_backward();
                    ctx.timers.arm(timer::SHORT, ctx.tuning.timing.short_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::SHORT => {
                    Verdict::Transition(S::TankTurn)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::SHORT);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::TankTurn => match event.kind {
                EventKind::Entry => {
                    ctx.drive.tank_turn_right();
                    ctx.timers.arm(timer::TURN_90, ctx.tuning.timing.turn_90_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::TURN_90 => {
                    Verdict::Transition(S::GradualTurn)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::TURN_90);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::GradualTurn => match event.kind {
                EventKind::Entry => {
                    gradual_turn(ctx, self.dir, self.difference);
                    ctx.timers.arm(timer::TURN_180, ctx.tuning.timing.turn_180_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::TURN_180 => {
                    // Next leg: straighter arc, other direction
                    self.difference = ctx.tuning.search.widen(self.difference);
                    self.dir = self.dir.opposite();
                    Verdict::Transition(S::GradualTurn)
                }
                EventKind::TapeTriggered
                    if TapeFlags::from_bits_truncate(event.param).intersects(FRONT_TAPE) =>
                {
                    Verdict::Transition(S::Backward)
                }
                EventKind::Bumped
                    if BumperFlags::from_bits_truncate(event.param)
                        .intersects(FRONT_BUMPERS) =>
                {
                    Verdict::Transition(S::Backward)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::TURN_180);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{DriveCommand, MockDrive};
    use crate::hsm::tests::test_context;
    use crate::hsm::{init_chart, run_chart};
    use crate::parameters::Tuning;
    use crate::runtime::TimerBank;
    use crate::servo::MockServos;
    use crate::services::SensorSnapshot;

    fn parts() -> (MockDrive, MockServos, TimerBank, Tuning) {
        (
            MockDrive::new(),
            MockServos::new(),
            TimerBank::new(),
            Tuning::default(),
        )
    }

    fn timeout(id: u16) -> Event {
        Event::new(EventKind::Timeout, id)
    }

    /// Drive the chart from reset to the first spiral leg.
    fn enter_spiral(
        chart: &mut SecondTargetSearchChart,
        d: &mut MockDrive,
        s: &mut MockServos,
        t: &mut TimerBank,
        tuning: &Tuning,
    ) {
        init_chart(chart, &mut test_context(d, s, t, tuning, SensorSnapshot::new()));
        run_chart(
            chart,
            timeout(timer::SHORT),
            &mut test_context(d, s, t, tuning, SensorSnapshot::new()),
        );
        run_chart(
            chart,
            timeout(timer::TURN_90),
            &mut test_context(d, s, t, tuning, SensorSnapshot::new()),
        );
    }

    #[test]
    fn test_backs_off_turns_out_then_spirals() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = SecondTargetSearchChart::new();

        init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, SecondTargetSearchState::Backward);
        assert_eq!(d.last(), Some(DriveCommand::Backward));
        assert_eq!(t.remaining(timer::SHORT), Some(50));

        run_chart(
            &mut chart,
            timeout(timer::SHORT),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, SecondTargetSearchState::TankTurn);
        assert_eq!(d.last(), Some(DriveCommand::TankRight));
        assert!(t.is_running(timer::TURN_90));

        run_chart(
            &mut chart,
            timeout(timer::TURN_90),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, SecondTargetSearchState::GradualTurn);
        assert_eq!(d.last(), Some(DriveCommand::GradualRight(10)));
        assert_eq!(t.remaining(timer::TURN_180), Some(2740));
    }

    #[test]
    fn test_legs_shrink_by_step_and_alternate_to_the_floor() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = SecondTargetSearchChart::new();
        enter_spiral(&mut chart, &mut d, &mut s, &mut t, &tuning);

        d.clear();
        for _ in 0..5 {
            run_chart(
                &mut chart,
                timeout(timer::TURN_180),
                &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
            );
        }
        assert_eq!(
            d.commands.as_slice(),
            &[
                DriveCommand::GradualLeft(7),
                DriveCommand::GradualRight(4),
                DriveCommand::GradualLeft(1),
                DriveCommand::GradualRight(1),
                DriveCommand::GradualLeft(1),
            ]
        );
    }

    #[test]
    fn test_tape_or_front_bump_restarts_the_spiral() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = SecondTargetSearchChart::new();
        enter_spiral(&mut chart, &mut d, &mut s, &mut t, &tuning);
        run_chart(
            &mut chart,
            timeout(timer::TURN_180),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.difference, 7);

        run_chart(
            &mut chart,
            Event::new(EventKind::TapeTriggered, TapeFlags::FRONT_MIDDLE.bits()),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, SecondTargetSearchState::Backward);
        assert!(!t.is_running(timer::TURN_180));
        assert_eq!(chart.difference, 10);

        // Work back to the spiral and interrupt with a front bump
        run_chart(
            &mut chart,
            timeout(timer::SHORT),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        run_chart(
            &mut chart,
            timeout(timer::TURN_90),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(d.last(), Some(DriveCommand::GradualRight(10)));
        run_chart(
            &mut chart,
            Event::new(EventKind::Bumped, BumperFlags::FRONT_LEFT.bits()),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, SecondTargetSearchState::Backward);

        // A plunger-only press is not an obstacle
        run_chart(
            &mut chart,
            timeout(timer::SHORT),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        run_chart(
            &mut chart,
            timeout(timer::TURN_90),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        let plunger = Event::new(EventKind::Bumped, BumperFlags::PLUNGER.bits());
        let ret = run_chart(
            &mut chart,
            plunger,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(ret, plunger);
        assert_eq!(chart.state, SecondTargetSearchState::GradualTurn);
    }

    #[test]
    fn test_beacon_passes_through_for_the_mission() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = SecondTargetSearchChart::new();
        enter_spiral(&mut chart, &mut d, &mut s, &mut t, &tuning);

        let ev = Event::new(EventKind::BeaconTriggered, 1);
        let ret = run_chart(
            &mut chart,
            ev,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(ret, ev);
        assert_eq!(chart.state, SecondTargetSearchState::GradualTurn);
    }
}
