//! Hardware seams backed by the simulated rover
//!
//! [`SimPlatform`] bundles one [`SimRover`] with implementations of every
//! trait the executive's `Io` borrows: motors behind the real
//! differential drive, servos, and the four sensor groups. The adapters
//! share the rover through `Rc<RefCell<_>>`; the executive drives them
//! one at a time from a single thread, so borrows never overlap.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mech_rover_core::drive::DifferentialDrive;
use mech_rover_core::executive::Io;
use mech_rover_core::motor::{validate_speed, Motor, MotorError};
use mech_rover_core::parameters::DriveParams;
use mech_rover_core::sensors::{
    BeaconSensor, BumperSensors, TapeSensorArray, TrackWireSensor, WireProbe, TAPE_SENSOR_COUNT,
};
use mech_rover_core::servo::{clamp_pulse, ServoInterface, SERVO_PULSE_CENTER};

use crate::arena::{Arena, Vec2};
use crate::rover::{RoverConfig, SimRover};

/// Motor whose commanded duty lands in a shared cell the physics reads.
#[derive(Debug)]
pub struct SimMotor {
    duty: Rc<Cell<f32>>,
    /// `1.0` or `-1.0`, models which way the motor is wired
    direction: f32,
}

impl Motor for SimMotor {
    fn set_speed(&mut self, speed: f32) -> Result<(), MotorError> {
        validate_speed(speed)?;
        self.duty.set(speed * self.direction);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), MotorError> {
        self.duty.set(0.0);
        Ok(())
    }
}

/// Servo pair that just remembers its commanded pulses.
#[derive(Debug)]
pub struct SimServos {
    pub sweep: u16,
    pub bridge: u16,
}

impl ServoInterface for SimServos {
    fn set_unloading_pulse(&mut self, pulse_us: u16) -> Result<(), &'static str> {
        self.sweep = clamp_pulse(pulse_us);
        Ok(())
    }

    fn set_bridge_pulse(&mut self, pulse_us: u16) -> Result<(), &'static str> {
        self.bridge = clamp_pulse(pulse_us);
        Ok(())
    }
}

/// Tape array adapter; owns the emitter bank state like the real part.
#[derive(Debug)]
pub struct SimTapeArray {
    rover: Rc<RefCell<SimRover>>,
    emitters_on: bool,
}

impl TapeSensorArray for SimTapeArray {
    fn set_emitters(&mut self, on: bool) {
        self.emitters_on = on;
    }

    fn read_raw(&mut self) -> [u16; TAPE_SENSOR_COUNT] {
        self.rover.borrow_mut().tape_levels(self.emitters_on)
    }
}

/// Track-wire mux adapter.
#[derive(Debug)]
pub struct SimTrackWire {
    rover: Rc<RefCell<SimRover>>,
    probe: WireProbe,
}

impl TrackWireSensor for SimTrackWire {
    fn select(&mut self, probe: WireProbe) {
        self.probe = probe;
    }

    fn read_detected(&mut self) -> bool {
        self.rover.borrow().wire_detected(self.probe)
    }
}

#[derive(Debug)]
pub struct SimBeacon {
    rover: Rc<RefCell<SimRover>>,
}

impl BeaconSensor for SimBeacon {
    fn read_detected(&mut self) -> bool {
        self.rover.borrow_mut().beacon_detected()
    }
}

#[derive(Debug)]
pub struct SimBumpers {
    rover: Rc<RefCell<SimRover>>,
}

impl BumperSensors for SimBumpers {
    fn read_raw(&mut self) -> u8 {
        self.rover.borrow().bumpers()
    }
}

/// One rover's worth of simulated hardware.
#[derive(Debug)]
pub struct SimPlatform {
    rover: Rc<RefCell<SimRover>>,
    left_duty: Rc<Cell<f32>>,
    right_duty: Rc<Cell<f32>>,
    drive: DifferentialDrive<SimMotor, SimMotor>,
    servos: SimServos,
    tape: SimTapeArray,
    wire: SimTrackWire,
    beacon: SimBeacon,
    bumpers: SimBumpers,
}

impl SimPlatform {
    pub fn new(arena: Arena, config: RoverConfig, params: DriveParams) -> Self {
        let rover = Rc::new(RefCell::new(SimRover::new(arena, config)));
        let left_duty = Rc::new(Cell::new(0.0));
        let right_duty = Rc::new(Cell::new(0.0));
        // The right motor is mirror-mounted; its wiring and the drive
        // layer's polarity flip cancel, so positive patterns go forward.
        let left = SimMotor {
            duty: Rc::clone(&left_duty),
            direction: 1.0,
        };
        let right = SimMotor {
            duty: Rc::clone(&right_duty),
            direction: -1.0,
        };
        Self {
            drive: DifferentialDrive::new(left, right, params),
            servos: SimServos {
                sweep: SERVO_PULSE_CENTER,
                bridge: SERVO_PULSE_CENTER,
            },
            tape: SimTapeArray {
                rover: Rc::clone(&rover),
                emitters_on: false,
            },
            wire: SimTrackWire {
                rover: Rc::clone(&rover),
                probe: WireProbe::Front,
            },
            beacon: SimBeacon {
                rover: Rc::clone(&rover),
            },
            bumpers: SimBumpers {
                rover: Rc::clone(&rover),
            },
            rover,
            left_duty,
            right_duty,
        }
    }

    /// Borrow every hardware seam for one executive call.
    pub fn io(&mut self) -> Io<'_> {
        Io {
            drive: &mut self.drive,
            servos: &mut self.servos,
            tape: &mut self.tape,
            wire: &mut self.wire,
            beacon: &mut self.beacon,
            bumpers: &mut self.bumpers,
        }
    }

    /// Push the latched motor duties into the physics and advance one tick.
    pub fn step(&mut self) {
        let mut rover = self.rover.borrow_mut();
        rover.set_duty(self.left_duty.get(), self.right_duty.get());
        rover.step();
    }

    pub fn position(&self) -> Vec2 {
        self.rover.borrow().position()
    }

    pub fn heading(&self) -> f32 {
        self.rover.borrow().heading()
    }

    pub fn ticks(&self) -> u64 {
        self.rover.borrow().ticks()
    }

    /// Current `(sweep, bridge)` servo pulses.
    pub fn servo_pulses(&self) -> (u16, u16) {
        (self.servos.sweep, self.servos.bridge)
    }
}
