//! Behavior executive
//!
//! Glue between the hardware seams and the event machinery. The executive
//! owns the runtime (queues plus timer bank), the four debounce services,
//! the mission chart and the tuning set; the hardware itself is borrowed
//! per call through [`Io`], so one executive can run against real drivers
//! or against mocks without knowing the difference.
//!
//! One [`tick`](Executive::tick) is one run-to-completion step: advance
//! the timer bank once, drain every service queue in priority order (the
//! debounce services first, each consuming its expired sampling timers),
//! then capture the debounced [`SensorSnapshot`] and drain the mission
//! queue through the chart with that snapshot. Events the chart hands
//! back unconsumed are dropped here; there is no layer above.

use crate::drive::DriveInterface;
use crate::events::{Event, WireFlags};
use crate::hsm::{init_chart, run_chart, Context, MissionChart, Phase};
use crate::parameters::Tuning;
use crate::runtime::{Runtime, ServiceId};
use crate::sensors::{BeaconSensor, BumperSensors, TapeSensorArray, TrackWireSensor};
use crate::servo::ServoInterface;
use crate::services::{
    BeaconService, BumperService, SensorSnapshot, TapeService, TrackWireService,
};

/// Failure starting the behavior core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutiveError {
    /// The mission chart did not consume its `Init` event.
    ChartInit,
}

impl core::fmt::Display for ExecutiveError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ExecutiveError::ChartInit => write!(f, "mission chart rejected init"),
        }
    }
}

/// Borrowed hardware endpoints for one executive call.
pub struct Io<'a> {
    pub drive: &'a mut dyn DriveInterface,
    pub servos: &'a mut dyn ServoInterface,
    pub tape: &'a mut dyn TapeSensorArray,
    pub wire: &'a mut dyn TrackWireSensor,
    pub beacon: &'a mut dyn BeaconSensor,
    pub bumpers: &'a mut dyn BumperSensors,
}

/// One robot's complete autonomous behavior core.
#[derive(Debug)]
pub struct Executive {
    runtime: Runtime,
    tape: TapeService,
    wire: TrackWireService,
    beacon: BeaconService,
    bumpers: BumperService,
    mission: MissionChart,
    tuning: Tuning,
}

impl Executive {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            runtime: Runtime::new(),
            tape: TapeService::new(),
            wire: TrackWireService::new(),
            beacon: BeaconService::new(),
            bumpers: BumperService::new(),
            mission: MissionChart::new(),
            tuning,
        }
    }

    /// Start the services, preset the unload servos, and run the mission
    /// chart's initial transition.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutiveError::ChartInit`] when the mission chart fails
    /// to take its initial transition.
    pub fn init(&mut self, mut io: Io<'_>) -> Result<(), ExecutiveError> {
        self.tape
            .init(io.tape, &mut self.runtime.timers, &self.tuning.debounce);
        self.wire
            .init(io.wire, &mut self.runtime.timers, &self.tuning.debounce);
        self.beacon
            .init(&mut self.runtime.timers, &self.tuning.debounce);
        self.bumpers
            .init(&mut self.runtime.timers, &self.tuning.debounce);

        // Park the unload mechanics in their travel pose
        let _ = io.servos.set_unloading_pulse(self.tuning.unload.sweep_mid);
        let _ = io.servos.set_bridge_pulse(self.tuning.unload.bridge_in);

        let snapshot = self.snapshot();
        let mut ctx = Context {
            drive: &mut *io.drive,
            servos: &mut *io.servos,
            timers: &mut self.runtime.timers,
            snapshot,
            tuning: &self.tuning,
        };
        if !init_chart(&mut self.mission, &mut ctx) {
            return Err(ExecutiveError::ChartInit);
        }
        Ok(())
    }

    /// Run one cooperative tick.
    pub fn tick(&mut self, mut io: Io<'_>) {
        self.runtime.timers.advance();

        while let Some(ev) = self.runtime.take_event_for(ServiceId::Tape) {
            self.tape
                .run(ev, io.tape, &mut self.runtime, &self.tuning.debounce);
        }
        while let Some(ev) = self.runtime.take_event_for(ServiceId::TrackWire) {
            self.wire
                .run(ev, io.wire, &mut self.runtime, &self.tuning.debounce);
        }
        while let Some(ev) = self.runtime.take_event_for(ServiceId::Beacon) {
            self.beacon
                .run(ev, io.beacon, &mut self.runtime, &self.tuning.debounce);
        }
        while let Some(ev) = self.runtime.take_event_for(ServiceId::Bumper) {
            self.bumpers
                .run(ev, io.bumpers, &mut self.runtime, &self.tuning.debounce);
        }

        // Snapshot after the services ran, before the charts read it
        let snapshot = self.snapshot();
        while let Some(ev) = self.runtime.take_event_for(ServiceId::Mission) {
            let mut ctx = Context {
                drive: &mut *io.drive,
                servos: &mut *io.servos,
                timers: &mut self.runtime.timers,
                snapshot,
                tuning: &self.tuning,
            };
            let _ = run_chart(&mut self.mission, ev, &mut ctx);
        }
    }

    /// Inject an event from outside the sensor services.
    pub fn post(&mut self, service: ServiceId, event: Event) -> bool {
        self.runtime.post(service, event)
    }

    /// Currently active mission phase.
    #[inline]
    pub fn phase(&self) -> Phase {
        self.mission.phase()
    }

    fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            last_tape: self.tape.last_side(),
            wire_front: self.wire.mask().contains(WireFlags::FRONT),
            wire_back: self.wire.mask().contains(WireFlags::BACK),
            beacon: self.beacon.seen(),
        }
    }
}
