//! First target search behavior
//!
//! After loading, find the first target by its beacon. The chart sweeps in
//! place with a growing dwell per direction so early sweeps are quick and
//! later ones cover more arc, then drives at the beacon once it is seen.
//! Losing the beacon or driving too long without progress drops back to
//! sweeping; front bumps trigger a retreat-and-dodge detour.
//!
//! The chart never touches `TapeTriggered` front-corner events. Hitting
//! the target's tape marking is this phase's completion condition and the
//! mission layer consumes it.

use crate::events::{BumperFlags, Event, EventKind};
use crate::hsm::{tank_turn, Chart, Context, Side, Verdict};
use crate::runtime::timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstTargetSearchState {
    InitPseudo,
    ForwardScan,
    Forward,
    Backward,
    TankTurn,
}

/// Beacon hunt chart for the first target.
#[derive(Debug)]
pub struct FirstTargetSearchChart {
    state: FirstTargetSearchState,
    /// Current sweep dwell, grows every direction flip
    sweep_ticks: u16,
    sweep_dir: Side,
    bump_side: Side,
}

impl FirstTargetSearchChart {
    pub const fn new() -> Self {
        Self {
            state: FirstTargetSearchState::InitPseudo,
            sweep_ticks: 0,
            sweep_dir: Side::Right,
            bump_side: Side::Right,
        }
    }
}

impl Default for FirstTargetSearchChart {
    fn default() -> Self {
        Self::new()
    }
}

impl Chart for FirstTargetSearchChart {
    type State = FirstTargetSearchState;
    const INITIAL: FirstTargetSearchState = FirstTargetSearchState::InitPseudo;

    fn state(&self) -> FirstTargetSearchState {
        self.state
    }

    fn set_state(&mut self, state: FirstTargetSearchState) {
        self.state = state;
    }

    fn dispatch(
        &mut self,
        state: FirstTargetSearchState,
        event: Event,
        ctx: &mut Context<'_>,
    ) -> Verdict<FirstTargetSearchState> {
        use FirstTargetSearchState as S;
        match state {
            S::InitPseudo => match event.kind {
                EventKind::Init => {
                    self.sweep_dir = Side::Right;
                    self.sweep_ticks = ctx.tuning.timing.turn_45_ticks;
                    Verdict::Transition(S::ForwardScan)
                }
                _ => Verdict::Stay,
            },

            S::ForwardScan => match event.kind {
                EventKind::Entry => {
                    tank_turn(ctx, self.sweep_dir);
                    ctx.timers.arm(timer::SCAN, self.sweep_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::SCAN => {
                    // Swing back the other way, a little further each time
                    self.sweep_dir = self.sweep_dir.opposite();
                    self.sweep_ticks = self
                        .sweep_ticks
                        .saturating_add(ctx.tuning.timing.turn_22_ticks);
                    tank_turn(ctx, self.sweep_dir);
                    ctx.timers.arm(timer::SCAN, self.sweep_ticks);
                    Verdict::Consume
                }
                EventKind::BeaconTriggered if event.param != 0 => {
                    self.sweep_ticks = ctx.tuning.timing.turn_45_ticks;
                    Verdict::Transition(S::Forward)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::SCAN);
                    Verdict::Consume
                }
                _ => Verdict::Stay,
            },

            S::Forward => match event.kind {
                EventKind::Entry => {
                    ctx.drive.move_forward();
                    ctx.timers.arm(timer::SCAN, ctx.tuning.timing.scan_ticks);
                    Verdict::Consume
                }
                EventKind::BeaconTriggered if event.param == 0 => {
                    Verdict::Transition(S::ForwardScan)
                }
                EventKind::Timeout if event.param == timer::SCAN => {
                    // Watchdog: too long without reaching anything
                    Verdict::Transition(S::ForwardScan)
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
                EventKind::Exit => {
                    ctx.timers.stop(timer::SCAN);
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
                    ctx.timers.arm(timer::TURN_45, ctx.tuning.timing.turn_45_ticks);
                    Verdict::Consume
                }
                EventKind::Timeout if event.param == timer::TURN_45 => {
                    Verdict::Transition(S::Forward)
                }
                EventKind::Exit => {
                    ctx.timers.stop(timer::TURN_45);
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

    #[test]
    fn test_init_starts_sweeping_right() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = FirstTargetSearchChart::new();
        assert!(init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        ));
        assert_eq!(chart.state, FirstTargetSearchState::ForwardScan);
        assert_eq!(d.last(), Some(DriveCommand::TankRight));
        assert_eq!(t.remaining(timer::SCAN), Some(685));
    }

    #[test]
    fn test_sweep_alternates_and_grows() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = FirstTargetSearchChart::new();
        init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );

        run_chart(
            &mut chart,
            Event::new(EventKind::Timeout, timer::SCAN),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(d.last(), Some(DriveCommand::TankLeft));
        assert_eq!(t.remaining(timer::SCAN), Some(685 + 342));

        run_chart(
            &mut chart,
            Event::new(EventKind::Timeout, timer::SCAN),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(d.last(), Some(DriveCommand::TankRight));
        assert_eq!(t.remaining(timer::SCAN), Some(685 + 2 * 342));
    }

    #[test]
    fn test_beacon_sighting_drives_forward_with_watchdog() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = FirstTargetSearchChart::new();
        init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        run_chart(
            &mut chart,
            Event::new(EventKind::Timeout, timer::SCAN),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );

        let ret = run_chart(
            &mut chart,
            Event::new(EventKind::BeaconTriggered, 1),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert!(ret.is_none());
        assert_eq!(chart.state, FirstTargetSearchState::Forward);
        assert_eq!(d.last(), Some(DriveCommand::Forward));
        // Watchdog replaces the sweep dwell, and the dwell resets to base
        assert_eq!(t.remaining(timer::SCAN), Some(4000));
        assert_eq!(chart.sweep_ticks, 685);
    }

    #[test]
    fn test_beacon_loss_resumes_sweep() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = FirstTargetSearchChart::new();
        init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        run_chart(
            &mut chart,
            Event::new(EventKind::BeaconTriggered, 1),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );

        run_chart(
            &mut chart,
            Event::new(EventKind::BeaconTriggered, 0),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, FirstTargetSearchState::ForwardScan);
        assert_eq!(t.remaining(timer::SCAN), Some(685));
    }

    #[test]
    fn test_watchdog_timeout_resumes_sweep() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = FirstTargetSearchChart::new();
        init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        run_chart(
            &mut chart,
            Event::new(EventKind::BeaconTriggered, 1),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );

        run_chart(
            &mut chart,
            Event::new(EventKind::Timeout, timer::SCAN),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, FirstTargetSearchState::ForwardScan);
        assert_eq!(d.last(), Some(DriveCommand::TankRight));
    }

    #[test]
    fn test_bump_detour_and_resume() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = FirstTargetSearchChart::new();
        init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        run_chart(
            &mut chart,
            Event::new(EventKind::BeaconTriggered, 1),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );

        run_chart(
            &mut chart,
            Event::new(EventKind::Bumped, BumperFlags::FRONT_LEFT.bits()),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, FirstTargetSearchState::Backward);
        assert_eq!(d.last(), Some(DriveCommand::Backward));
        assert!(t.is_running(timer::MEDIUM));
        assert!(!t.is_running(timer::SCAN));

        run_chart(
            &mut chart,
            Event::new(EventKind::Timeout, timer::MEDIUM),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, FirstTargetSearchState::TankTurn);
        // Left bump dodges right
        assert_eq!(d.last(), Some(DriveCommand::TankRight));

        run_chart(
            &mut chart,
            Event::new(EventKind::Timeout, timer::TURN_45),
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(chart.state, FirstTargetSearchState::Forward);
        assert_eq!(t.remaining(timer::SCAN), Some(4000));
    }

    #[test]
    fn test_front_tape_passes_through() {
        let (mut d, mut s, mut t, tuning) = parts();
        let mut chart = FirstTargetSearchChart::new();
        init_chart(
            &mut chart,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );

        let ev = Event::new(EventKind::TapeTriggered, TapeFlags::FRONT_RIGHT.bits());
        let ret = run_chart(
            &mut chart,
            ev,
            &mut test_context(&mut d, &mut s, &mut t, &tuning, SensorSnapshot::new()),
        );
        assert_eq!(ret, ev);
        assert_eq!(chart.state, FirstTargetSearchState::ForwardScan);
    }
}
