//! Track-wire polling
//!
//! The two pickup coils share one analog input through a mux, so the
//! service alternates: each period it reads the coil selected last time,
//! updates that coil's consecutive-detection counter, then switches the mux
//! and lets the input settle until the next period.
//!
//! A coil is debounced on once its counter exceeds the threshold and falls
//! back off on the first clean sample. Posting happens only on the back-coil
//! phase, when both counters are fresh: if either debounced bit changed, a
//! `TwTriggered` is posted whose parameter names the back coil when it is
//! detected and the front coil otherwise.

use crate::events::{Event, EventKind, WireFlags};
use crate::parameters::DebounceParams;
use crate::runtime::{timer, Runtime, ServiceId, TimerBank};
use crate::sensors::{TrackWireSensor, WireProbe};

/// Consecutive-sample debouncer for the front/back wire coils.
#[derive(Debug)]
pub struct TrackWireService {
    probe: WireProbe,
    counts: [u8; 2],
    mask: WireFlags,
    posted: WireFlags,
}

impl TrackWireService {
    pub const fn new() -> Self {
        Self {
            probe: WireProbe::Front,
            counts: [0; 2],
            mask: WireFlags::empty(),
            posted: WireFlags::empty(),
        }
    }

    /// Select the front coil and start the polling timer.
    pub fn init(
        &mut self,
        sensor: &mut dyn TrackWireSensor,
        timers: &mut TimerBank,
        params: &DebounceParams,
    ) {
        self.probe = WireProbe::Front;
        sensor.select(self.probe);
        timers.arm(timer::TRACK_WIRE, params.track_wire_ticks);
    }

    /// Handle one event from this service's queue.
    pub fn run(
        &mut self,
        event: Event,
        sensor: &mut dyn TrackWireSensor,
        runtime: &mut Runtime,
        params: &DebounceParams,
    ) {
        if event.kind != EventKind::Timeout || event.param != timer::TRACK_WIRE {
            return;
        }
        runtime.timers.arm(timer::TRACK_WIRE, params.track_wire_ticks);

        let idx = self.probe.index();
        if sensor.read_detected() {
            self.counts[idx] = self.counts[idx].saturating_add(1);
        } else {
            self.counts[idx] = 0;
        }
        let on = self.counts[idx] > params.wire_count;
        let bit = match self.probe {
            WireProbe::Front => WireFlags::FRONT,
            WireProbe::Back => WireFlags::BACK,
        };
        self.mask.set(bit, on);

        let evaluated_back = self.probe == WireProbe::Back;
        self.probe = self.probe.other();
        sensor.select(self.probe);

        if evaluated_back && self.mask != self.posted {
            self.posted = self.mask;
            let param = if self.mask.contains(WireFlags::BACK) {
                WireFlags::BACK.bits()
            } else if self.mask.contains(WireFlags::FRONT) {
                WireFlags::FRONT.bits()
            } else {
                0
            };
            runtime.post(
                ServiceId::Mission,
                Event::new(EventKind::TwTriggered, param),
            );
        }
    }

    /// Current debounced coil mask.
    #[inline]
    pub fn mask(&self) -> WireFlags {
        self.mask
    }
}

impl Default for TrackWireService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::MockTrackWire;

    fn tick(svc: &mut TrackWireService, wire: &mut MockTrackWire, rt: &mut Runtime) {
        let params = DebounceParams::default();
        svc.run(Event::new(EventKind::Timeout, timer::TRACK_WIRE), wire, rt, &params);
    }

    fn setup() -> (TrackWireService, MockTrackWire, Runtime) {
        let mut svc = TrackWireService::new();
        let mut wire = MockTrackWire::new();
        let mut rt = Runtime::new();
        let params = DebounceParams::default();
        svc.init(&mut wire, &mut rt.timers, &params);
        (svc, wire, rt)
    }

    #[test]
    fn test_mux_alternates_every_period() {
        let (mut svc, mut wire, mut rt) = setup();
        assert_eq!(wire.selected, WireProbe::Front);
        tick(&mut svc, &mut wire, &mut rt);
        assert_eq!(wire.selected, WireProbe::Back);
        tick(&mut svc, &mut wire, &mut rt);
        assert_eq!(wire.selected, WireProbe::Front);
    }

    #[test]
    fn test_front_detection_needs_three_samples() {
        let (mut svc, mut wire, mut rt) = setup();
        wire.front = true;

        // Front samples land on every other period; the third one crosses
        // the threshold and the following back phase posts the change.
        for _ in 0..5 {
            tick(&mut svc, &mut wire, &mut rt);
            assert_eq!(rt.pending(ServiceId::Mission), 0);
        }
        assert_eq!(svc.mask(), WireFlags::FRONT);
        tick(&mut svc, &mut wire, &mut rt);
        let ev = rt.take_event_for(ServiceId::Mission).unwrap();
        assert_eq!(ev.kind, EventKind::TwTriggered);
        assert_eq!(ev.param, WireFlags::FRONT.bits());
    }

    #[test]
    fn test_back_coil_wins_parameter() {
        let (mut svc, mut wire, mut rt) = setup();
        wire.front = true;
        wire.back = true;

        // Both coils debounce on; the posted parameter names only the back
        for _ in 0..6 {
            tick(&mut svc, &mut wire, &mut rt);
        }
        assert_eq!(svc.mask(), WireFlags::FRONT | WireFlags::BACK);
        let ev = rt.take_event_for(ServiceId::Mission).unwrap();
        assert_eq!(ev.param, WireFlags::BACK.bits());
        assert_eq!(rt.pending(ServiceId::Mission), 0);
    }

    #[test]
    fn test_single_clean_sample_drops_coil() {
        let (mut svc, mut wire, mut rt) = setup();
        wire.front = true;
        for _ in 0..6 {
            tick(&mut svc, &mut wire, &mut rt);
        }
        rt.take_event_for(ServiceId::Mission);

        wire.front = false;
        // One front sample resets the counter; the next back phase posts 0
        tick(&mut svc, &mut wire, &mut rt);
        assert_eq!(svc.mask(), WireFlags::empty());
        tick(&mut svc, &mut wire, &mut rt);
        let ev = rt.take_event_for(ServiceId::Mission).unwrap();
        assert_eq!(ev.param, 0);
    }
}
