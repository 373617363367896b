//! Beacon detector debounce
//!
//! A pair of mutually resetting hold counters filters the demodulated
//! beacon line: every sample bumps the counter matching the raw reading and
//! zeroes the other, and the debounced state flips only after a full hold
//! count of agreement. `BeaconTriggered` carries 1 on acquisition and 0 on
//! loss.
//!
//! The debounced state starts out *seen* so the boot sequence, which faces
//! away from the target, begins with a clean loss instead of a spurious
//! acquisition.

use crate::events::{Event, EventKind};
use crate::parameters::DebounceParams;
use crate::runtime::{timer, Runtime, ServiceId, TimerBank};
use crate::sensors::BeaconSensor;

/// Hold-count debouncer for the 2-kHz beacon detector.
#[derive(Debug)]
pub struct BeaconService {
    seen: bool,
    on_count: u8,
    off_count: u8,
}

impl BeaconService {
    pub const fn new() -> Self {
        Self {
            seen: true,
            on_count: 0,
            off_count: 0,
        }
    }

    /// Start the sampling timer.
    pub fn init(&mut self, timers: &mut TimerBank, params: &DebounceParams) {
        timers.arm(timer::BEACON_DEBOUNCE, params.beacon_ticks);
    }

    /// Handle one event from this service's queue.
    pub fn run(
        &mut self,
        event: Event,
        sensor: &mut dyn BeaconSensor,
        runtime: &mut Runtime,
        params: &DebounceParams,
    ) {
        if event.kind != EventKind::Timeout || event.param != timer::BEACON_DEBOUNCE {
            return;
        }
        runtime.timers.arm(timer::BEACON_DEBOUNCE, params.beacon_ticks);

        if sensor.read_detected() {
            self.on_count = self.on_count.saturating_add(1);
            self.off_count = 0;
            if !self.seen && self.on_count >= params.beacon_hold {
                self.seen = true;
                runtime.post(ServiceId::Mission, Event::new(EventKind::BeaconTriggered, 1));
            }
        } else {
            self.off_count = self.off_count.saturating_add(1);
            self.on_count = 0;
            if self.seen && self.off_count >= params.beacon_hold {
                self.seen = false;
                runtime.post(ServiceId::Mission, Event::new(EventKind::BeaconTriggered, 0));
            }
        }
    }

    /// Current debounced detection state.
    #[inline]
    pub fn seen(&self) -> bool {
        self.seen
    }
}

impl Default for BeaconService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::MockBeacon;

    fn tick(svc: &mut BeaconService, beacon: &mut MockBeacon, rt: &mut Runtime) {
        let params = DebounceParams::default();
        svc.run(
            Event::new(EventKind::Timeout, timer::BEACON_DEBOUNCE),
            beacon,
            rt,
            &params,
        );
    }

    fn setup() -> (BeaconService, MockBeacon, Runtime) {
        let mut svc = BeaconService::new();
        let mut rt = Runtime::new();
        let params = DebounceParams::default();
        svc.init(&mut rt.timers, &params);
        (svc, MockBeacon::new(), rt)
    }

    #[test]
    fn test_starts_seen_so_presence_posts_nothing() {
        let (mut svc, mut beacon, mut rt) = setup();
        beacon.detected = true;
        for _ in 0..10 {
            tick(&mut svc, &mut beacon, &mut rt);
        }
        assert!(svc.seen());
        assert_eq!(rt.pending(ServiceId::Mission), 0);
    }

    #[test]
    fn test_loss_then_reacquisition() {
        let (mut svc, mut beacon, mut rt) = setup();

        // Five agreeing off samples flip the state to lost
        for _ in 0..5 {
            tick(&mut svc, &mut beacon, &mut rt);
        }
        assert!(!svc.seen());
        let ev = rt.take_event_for(ServiceId::Mission).unwrap();
        assert_eq!(ev.kind, EventKind::BeaconTriggered);
        assert_eq!(ev.param, 0);

        beacon.detected = true;
        for _ in 0..5 {
            tick(&mut svc, &mut beacon, &mut rt);
        }
        assert!(svc.seen());
        let ev = rt.take_event_for(ServiceId::Mission).unwrap();
        assert_eq!(ev.param, 1);
    }

    #[test]
    fn test_flicker_resets_hold_count() {
        let (mut svc, mut beacon, mut rt) = setup();

        // Four off samples, one on, four off: never five in a row
        for _ in 0..4 {
            tick(&mut svc, &mut beacon, &mut rt);
        }
        beacon.detected = true;
        tick(&mut svc, &mut beacon, &mut rt);
        beacon.detected = false;
        for _ in 0..4 {
            tick(&mut svc, &mut beacon, &mut rt);
        }
        assert!(svc.seen());
        assert_eq!(rt.pending(ServiceId::Mission), 0);

        tick(&mut svc, &mut beacon, &mut rt);
        assert!(!svc.seen());
        assert_eq!(rt.pending(ServiceId::Mission), 1);
    }
}
