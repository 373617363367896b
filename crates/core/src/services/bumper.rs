//! Bumper press detection
//!
//! Each switch feeds an eight-bit shift register sampled on the debounce
//! timer. A register value of `0x7F`, seven closed samples right after an
//! open one, is the debounced press edge. Edges from all switches in one
//! sample are collected into a single `Bumped` event so a square hit on two
//! bumpers arrives as one mask instead of two racing events.
//!
//! Releases post nothing; the debounced held mask stays readable on the
//! service for anything that wants level rather than edge.

use crate::events::{BumperFlags, Event, EventKind};
use crate::parameters::DebounceParams;
use crate::runtime::{timer, Runtime, ServiceId, TimerBank};
use crate::sensors::{BumperSensors, BUMPER_COUNT};

/// Shift-register debouncer for the bumper switches.
#[derive(Debug)]
pub struct BumperService {
    shift: [u8; BUMPER_COUNT],
    held: BumperFlags,
}

impl BumperService {
    pub const fn new() -> Self {
        Self {
            shift: [0; BUMPER_COUNT],
            held: BumperFlags::empty(),
        }
    }

    /// Start the sampling timer.
    pub fn init(&mut self, timers: &mut TimerBank, params: &DebounceParams) {
        timers.arm(timer::BUMPER_DEBOUNCE, params.bumper_ticks);
    }

    /// Handle one event from this service's queue.
    pub fn run(
        &mut self,
        event: Event,
        sensor: &mut dyn BumperSensors,
        runtime: &mut Runtime,
        params: &DebounceParams,
    ) {
        if event.kind != EventKind::Timeout || event.param != timer::BUMPER_DEBOUNCE {
            return;
        }
        runtime.timers.arm(timer::BUMPER_DEBOUNCE, params.bumper_ticks);

        let raw = sensor.read_raw();
        let mut pressed = BumperFlags::empty();
        for (i, reg) in self.shift.iter_mut().enumerate() {
            let bit = BumperFlags::from_bits_truncate(1 << i);
            *reg = (*reg << 1) | ((raw >> i) & 1);
            if *reg == 0x7F {
                pressed.insert(bit);
            }
            self.held.set(bit, (*reg & 0x7F) == 0x7F);
        }

        if !pressed.is_empty() {
            runtime.post(
                ServiceId::Mission,
                Event::new(EventKind::Bumped, pressed.bits()),
            );
        }
    }

    /// Currently held (debounced closed) switches.
    #[inline]
    pub fn held(&self) -> BumperFlags {
        self.held
    }
}

impl Default for BumperService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::MockBumpers;

    fn tick(svc: &mut BumperService, bumpers: &mut MockBumpers, rt: &mut Runtime) {
        let params = DebounceParams::default();
        svc.run(
            Event::new(EventKind::Timeout, timer::BUMPER_DEBOUNCE),
            bumpers,
            rt,
            &params,
        );
    }

    fn setup() -> (BumperService, MockBumpers, Runtime) {
        let mut svc = BumperService::new();
        let mut rt = Runtime::new();
        let params = DebounceParams::default();
        svc.init(&mut rt.timers, &params);
        (svc, MockBumpers::new(), rt)
    }

    #[test]
    fn test_press_edge_after_seven_samples() {
        let (mut svc, mut bumpers, mut rt) = setup();
        bumpers.pressed = BumperFlags::FRONT_RIGHT.bits() as u8;

        for _ in 0..6 {
            tick(&mut svc, &mut bumpers, &mut rt);
            assert_eq!(rt.pending(ServiceId::Mission), 0);
        }
        tick(&mut svc, &mut bumpers, &mut rt);
        let ev = rt.take_event_for(ServiceId::Mission).unwrap();
        assert_eq!(ev.kind, EventKind::Bumped);
        assert_eq!(ev.param, BumperFlags::FRONT_RIGHT.bits());
        assert!(svc.held().contains(BumperFlags::FRONT_RIGHT));

        // Saturated register is a held press, not a fresh edge
        tick(&mut svc, &mut bumpers, &mut rt);
        assert_eq!(rt.pending(ServiceId::Mission), 0);
    }

    #[test]
    fn test_release_then_repress_posts_again() {
        let (mut svc, mut bumpers, mut rt) = setup();
        bumpers.pressed = BumperFlags::PLUNGER.bits() as u8;
        for _ in 0..8 {
            tick(&mut svc, &mut bumpers, &mut rt);
        }
        rt.take_event_for(ServiceId::Mission);

        bumpers.pressed = 0;
        tick(&mut svc, &mut bumpers, &mut rt);
        assert!(!svc.held().contains(BumperFlags::PLUNGER));
        for _ in 0..7 {
            tick(&mut svc, &mut bumpers, &mut rt);
        }

        bumpers.pressed = BumperFlags::PLUNGER.bits() as u8;
        for _ in 0..7 {
            tick(&mut svc, &mut bumpers, &mut rt);
        }
        let ev = rt.take_event_for(ServiceId::Mission).unwrap();
        assert_eq!(ev.param, BumperFlags::PLUNGER.bits());
    }

    #[test]
    fn test_simultaneous_presses_post_one_event() {
        let (mut svc, mut bumpers, mut rt) = setup();
        bumpers.pressed = (BumperFlags::FRONT_RIGHT | BumperFlags::FRONT_LEFT).bits() as u8;

        for _ in 0..7 {
            tick(&mut svc, &mut bumpers, &mut rt);
        }
        assert_eq!(rt.pending(ServiceId::Mission), 1);
        let ev = rt.take_event_for(ServiceId::Mission).unwrap();
        assert_eq!(
            ev.param,
            (BumperFlags::FRONT_RIGHT | BumperFlags::FRONT_LEFT).bits()
        );
    }

    #[test]
    fn test_bounce_restarts_the_register() {
        let (mut svc, mut bumpers, mut rt) = setup();
        bumpers.pressed = BumperFlags::FRONT_LEFT.bits() as u8;
        for _ in 0..5 {
            tick(&mut svc, &mut bumpers, &mut rt);
        }
        bumpers.pressed = 0;
        tick(&mut svc, &mut bumpers, &mut rt);
        bumpers.pressed = BumperFlags::FRONT_LEFT.bits() as u8;
        for _ in 0..6 {
            tick(&mut svc, &mut bumpers, &mut rt);
        }
        assert_eq!(rt.pending(ServiceId::Mission), 0);
        tick(&mut svc, &mut bumpers, &mut rt);
        assert_eq!(rt.pending(ServiceId::Mission), 1);
    }
}
