//! Second target approach behavior
//!
//! Once the spiral search has the beacon in view the rover simply drives
//! at it: forward until something is hit, back off on the medium timer,
//! turn away from the bumped side, and push forward again. A watchdog on
//! the long timer catches runs that reach nothing and drops into `Scan`,
//! which rotates back toward the last obstacle until the beacon shows up
//! again.
//!
//! `TapeTriggered` on a front corner is left for the mission layer;
//! reaching the target's tape ring is this phase's completion condition.

use crate::events::{BumperFlags, Event, EventKind};
use crate::hsm::{tank_turn, Chart, Context, Side, Verdict};
use crate::runtime::timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondTargetApproachState {
    InitPseudo,
    Forward,
    Backward,
    TankTurn,
    Scan,
}

/// Drive-at-the-beacon chart with bump detours.
#[derive(Debug)]
pub struct SecondTargetApproachChart {
    state: SecondTargetApproachState,
    bump_side: Side,
}

impl SecondTargetApproachChart {
    pub const fn new() -> Self {
        Self {
            state: SecondTargetApproachState::InitPseudo,
            bump_side: Side::Right,
        }
    }
}

impl Default for SecondTargetApproachChart {
    fn default() -> Self {
        Self::new()
    }
}

impl Chart for SecondTargetApproachChart {
    type State = SecondTargetApproachState;
    const INITIAL: SecondTargetApproachState = SecondTargetApproachState::InitPseudo;

    fn state(&self) -> SecondTargetApproachState {
        self.state
    }

    fn set_state(&mut self, state: SecondTargetApproachState) {
        self.state = state;
    }

    fn dispatch(
        &mut self,
        state: SecondTargetApproachState,
        event: Event,
        ctx: &mut Context<'_>,
    ) -> Verdict<SecondTargetApproachState> {
        use SecondTargetApproachState as S;
        match state {
            S::InitPseudo => match event.kind {
                EventKind::Init => Verdict::Transition(S::Forward),
                _ => Verdict::Stay,
            },

            S::Forward => match event.kind {
                EventKind::Entry => {
                    ctx.drive.move_forward();
                    ctx.timers.arm(timer::LONG, ctx.tuning.timing.long_ticks);
                    Verdict::Consume
                }
                EventKind::Bumped => {
                    let mask = BumperFlags::from_bits_truncate(event.param);
                    if mask.contains(BumperFlags::FRONT_RIGHT) {
                        self.bump_side = Side::Right;
                    } else if mask.contains(BumperFlags::FRONT_LEFT) {
                        self.bump_side = Side::Left;
                    } else {
                        return Verdict::Stay;
                    }
                    Verdict::Transition(S::Backward)
                }
                EventKind::Timeout if event.param == timer::LONG => {
                    // Watchdog: reached nothing, look around for the beacon
                    Verdict::Transition(S::Scan)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::LONG);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::Backward => match event.kind {
                EventKind::Entry => {
                    ctx.drive.move_backward();
                    ctx.timers.arm(timer::MEDIUM, ctx.tuning.timing.medium_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::MEDIUM => {
                    Verdict::Transition(S::TankTurn)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::MEDIUM);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::TankTurn => match event.kind {
                EventKind::Entry => {
                    tank_turn(ctx, self.bump_side.opposite());
                    ctx.timers.arm(timer::MEDIUM, ctx.tuning.timing.medium_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::MEDIUM => {
                    Verdict::Transition(S::Forward)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::MEDIUM);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::Scan => match event.kind {
                EventKind::Entry => {
                    tank_turn(ctx, self.bump_side);
                    Verdict::Consume
                }
                EventKind::BeaconTriggered => {
                    // Reacquired: hold position, the event still goes up
                    ctx.drive.stop_moving();
                    Verdict::Stay
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
    use crate::events::TapeFlags;
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

    #[test]
    fn test_bump_detours_and_resumes_forward() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = SecondTargetApproachChart::new();

        init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, SecondTargetApproachState::Forward);
        assert_eq!(d.last(), Some(DriveCommand::Forward));
        assert_eq!(t.remaining(timer::LONG), Some(1000));

        run_chart(
            &mut chart,
            Event::new(EventKind::Bumped, BumperFlags::FRONT_RIGHT.bits()),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, SecondTargetApproachState::Backward);
        assert_eq!(d.last(), Some(DriveCommand::Backward));
        assert!(!t.is_running(timer::LONG));
        assert!(t.is_running(timer::MEDIUM));

        run_chart(
            &mut chart,
            timeout(timer::MEDIUM),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, SecondTargetApproachState::TankTurn);
        assert_eq!(d.last(), Some(DriveCommand::TankLeft));

        run_chart(
            &mut chart,
            timeout(timer::MEDIUM),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, SecondTargetApproachState::Forward);
        assert_eq!(d.last(), Some(DriveCommand::Forward));
        assert!(t.is_running(timer::LONG));
    }

    #[test]
    fn test_plunger_press_is_not_an_obstacle() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = SecondTargetApproachChart::new();
        init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );

        let ev = Event::new(EventKind::Bumped, BumperFlags::PLUNGER.bits());
        let ret = run_chart(
            &mut chart,
            ev,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(ret, ev);
        assert_eq!(chart.state, SecondTargetApproachState::Forward);
    }

    #[test]
    fn test_watchdog_scans_toward_last_bump() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = SecondTargetApproachChart::new();
        init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );

        // Record a left bump, then ride the detour back to Forward
        run_chart(
            &mut chart,
            Event::new(EventKind::Bumped, BumperFlags::FRONT_LEFT.bits()),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        run_chart(
            &mut chart,
            timeout(timer::MEDIUM),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        run_chart(
            &mut chart,
            timeout(timer::MEDIUM),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, SecondTargetApproachState::Forward);

        run_chart(
            &mut chart,
            timeout(timer::LONG),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, SecondTargetApproachState::Scan);
        assert_eq!(d.last(), Some(DriveCommand::TankLeft));
        assert!(!t.is_running(timer::LONG));

        let ev = Event::new(EventKind::BeaconTriggered, 1);
        let ret = run_chart(
            &mut chart,
            ev,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(ret, ev);
        assert_eq!(chart.state, SecondTargetApproachState::Scan);
        assert_eq!(d.last(), Some(DriveCommand::Stop));
    }

    #[test]
    fn test_front_tape_passes_through_for_the_mission() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = SecondTargetApproachChart::new();
        init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );

        let ev = Event::new(EventKind::TapeTriggered, TapeFlags::FRONT_LEFT.bits());
        let ret = run_chart(
            &mut chart,
            ev,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(ret, ev);
        assert_eq!(chart.state, SecondTargetApproachState::Forward);
    }
}
