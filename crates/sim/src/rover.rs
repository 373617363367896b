//! Differential-drive rover physics and simulated sensing
//!
//! [`SimRover`] integrates wheel duties into a pose on a fixed tick and
//! answers the raw sensor questions the platform adapters forward from the
//! core's hardware traits. Sensor placement and physical constants live in
//! [`RoverConfig`]; all randomness flows from one seeded generator so runs
//! replay exactly.
//!
//! Contact is sensed, not resolved: the hull can overlap a post while the
//! bumpers report it, the behavior layer is expected to back away.

use std::f32::consts::PI;

use mech_rover_core::sensors::WireProbe;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arena::{Arena, Vec2};

/// Physical rover description.
///
/// Offsets are in the body frame: x forward, y left, meters from the
/// center of the wheel axle. Array order matches the sensor bit layout
/// the debounce services expect.
#[derive(Debug, Clone)]
pub struct RoverConfig {
    /// Distance between wheel contact patches (m)
    pub wheel_base: f32,
    /// Wheel speed at 100% duty (m/s)
    pub max_speed: f32,
    /// Simulation step (s)
    pub tick_s: f32,
    /// Start position in the arena
    pub start: Vec2,
    /// Start heading (rad, 0 faces +x)
    pub start_heading: f32,
    /// Tape ADC noise, one standard deviation (counts)
    pub tape_noise: f32,
    /// RNG seed; equal seeds replay equal sensor noise
    pub seed: u64,
    /// Tape sensor positions: FR, FL, FM, BR, BL
    pub tape_offsets: [Vec2; 5],
    /// Bumper switch positions: FR, FL, plunger
    pub bumper_offsets: [Vec2; 3],
    /// Track-wire coil positions: front, back
    pub wire_offsets: [Vec2; 2],
    /// Beacon detector field of view (degrees, full cone)
    pub beacon_fov_deg: f32,
    /// Chance a visible beacon sample still reads dark
    pub beacon_dropout: f32,
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self {
            // Calibrated so the 685 ms quarter-speed tank turn sweeps 45 degrees
            wheel_base: 0.218,
            max_speed: 0.5,
            tick_s: 0.001, // 1 kHz, one behavior tick per step
            start: Vec2::new(0.6, 0.6),
            start_heading: 0.0,
            tape_noise: 10.0,
            seed: 42,
            tape_offsets: [
                Vec2::new(0.09, -0.05),
                Vec2::new(0.09, 0.05),
                Vec2::new(0.11, 0.0),
                Vec2::new(-0.09, -0.05),
                Vec2::new(-0.09, 0.05),
            ],
            bumper_offsets: [
                Vec2::new(0.12, -0.06),
                Vec2::new(0.12, 0.06),
                Vec2::new(-0.13, 0.0),
            ],
            wire_offsets: [Vec2::new(0.1, 0.0), Vec2::new(-0.1, 0.0)],
            beacon_fov_deg: 60.0,
            beacon_dropout: 0.02,
        }
    }
}

/// Reflectance counts the tape array reports with emitters lit.
const TAPE_LIT_FLOOR: f32 = 550.0;
const TAPE_LIT_TAPE: f32 = 90.0;
/// Ambient counts with emitters dark, floor or tape alike.
const TAPE_DARK: f32 = 60.0;

/// Pose integrator plus ground-truth sensing against an [`Arena`].
#[derive(Debug)]
pub struct SimRover {
    config: RoverConfig,
    arena: Arena,
    x: f32,
    y: f32,
    heading: f32,
    left_duty: f32,
    right_duty: f32,
    rng: StdRng,
    ticks: u64,
}

impl SimRover {
    pub fn new(arena: Arena, config: RoverConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let (x, y) = (config.start.x, config.start.y);
        let heading = config.start_heading;
        Self {
            config,
            arena,
            x,
            y,
            heading,
            left_duty: 0.0,
            right_duty: 0.0,
            rng,
            ticks: 0,
        }
    }

    /// Latch signed wheel duties in -1.0..=1.0 for the next steps.
    pub fn set_duty(&mut self, left: f32, right: f32) {
        self.left_duty = left.clamp(-1.0, 1.0);
        self.right_duty = right.clamp(-1.0, 1.0);
    }

    /// Advance the pose by one tick of the current wheel duties.
    pub fn step(&mut self) {
        let vl = self.left_duty * self.config.max_speed;
        let vr = self.right_duty * self.config.max_speed;
        let v = (vl + vr) / 2.0;
        let omega = (vr - vl) / self.config.wheel_base;

        self.heading = normalize_angle(self.heading + omega * self.config.tick_s);
        self.x += v * self.heading.cos() * self.config.tick_s;
        self.y += v * self.heading.sin() * self.config.tick_s;

        // Walls stop the hull; the bumpers hang over the edge and report it
        self.x = self.x.clamp(0.0, self.arena.width);
        self.y = self.y.clamp(0.0, self.arena.height);
        self.ticks += 1;
    }

    /// Raw tape array reading for the current emitter state.
    pub fn tape_levels(&mut self, emitters_on: bool) -> [u16; 5] {
        let mut levels = [0u16; 5];
        let offsets = self.config.tape_offsets;
        for (i, offset) in offsets.iter().enumerate() {
            let clean = if !emitters_on {
                TAPE_DARK
            } else if self.arena.tape_at(self.body_to_world(*offset)) {
                TAPE_LIT_TAPE
            } else {
                TAPE_LIT_FLOOR
            };
            let noisy = clean + self.gaussian_noise(self.config.tape_noise);
            levels[i] = noisy.clamp(0.0, 1023.0) as u16;
        }
        levels
    }

    /// Is the selected coil over a track-wire source?
    pub fn wire_detected(&self, probe: WireProbe) -> bool {
        let offset = self.config.wire_offsets[probe.index()];
        self.arena.wire_at(self.body_to_world(offset))
    }

    /// Does the beacon detector see the beacon right now?
    ///
    /// Requires the beacon enabled, in range, and within the detector's
    /// cone; a visible beacon can still drop a sample at the configured
    /// dropout rate.
    pub fn beacon_detected(&mut self) -> bool {
        let beacon = &self.arena.beacon;
        if !beacon.enabled {
            return false;
        }
        let here = Vec2::new(self.x, self.y);
        if here.distance(beacon.at) > beacon.range {
            return false;
        }
        let bearing = (beacon.at.y - self.y).atan2(beacon.at.x - self.x);
        let off_axis = normalize_angle(bearing - self.heading).abs();
        if off_axis > self.config.beacon_fov_deg.to_radians() / 2.0 {
            return false;
        }
        !(self.config.beacon_dropout > 0.0 && self.rng.gen::<f32>() < self.config.beacon_dropout)
    }

    /// Raw bumper switch states, one bit per switch.
    pub fn bumpers(&self) -> u8 {
        let mut raw = 0u8;
        for (i, offset) in self.config.bumper_offsets.iter().enumerate() {
            if self.arena.obstacle_contact(self.body_to_world(*offset)) {
                raw |= 1 << i;
            }
        }
        raw
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn heading(&self) -> f32 {
        self.heading
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Rotate a body-frame offset by the heading and translate to field
    /// coordinates.
    fn body_to_world(&self, offset: Vec2) -> Vec2 {
        let (sin, cos) = self.heading.sin_cos();
        Vec2::new(
            self.x + offset.x * cos - offset.y * sin,
            self.y + offset.x * sin + offset.y * cos,
        )
    }

    /// Box-Muller sample, zero when the deviation is zero.
    fn gaussian_noise(&mut self, stddev: f32) -> f32 {
        if stddev <= 0.0 {
            return 0.0;
        }
        let u1: f32 = self.rng.gen_range(1e-6..1.0f32);
        let u2: f32 = self.rng.gen_range(0.0..1.0f32);
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos() * stddev
    }
}

fn normalize_angle(angle: f32) -> f32 {
    let mut a = angle;
    while a > PI {
        a -= 2.0 * PI;
    }
    while a < -PI {
        a += 2.0 * PI;
    }
    a
}
