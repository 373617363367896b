//! Synchronized tape sampling
//!
//! The reflectance sensors are read in lockstep with their emitters: one
//! sampling period with the emitters lit, the next with them dark. The
//! difference between the two readings cancels ambient IR, and a hysteresis
//! band turns it into a stable on-tape bit per sensor:
//!
//! - difference above the high threshold: strong reflection, white floor,
//!   bit cleared
//! - difference below the low threshold: absorbed light, tape, bit set
//! - in between: previous bit held
//!
//! Whenever the debounced mask changes, a `TapeTriggered` event carrying
//! the new mask is posted. The service also keeps the [`TapeSide`] memory:
//! repeated changes involving one front corner sensor mean the rover keeps
//! drifting over that edge of the line.

use crate::events::{Event, EventKind, TapeFlags};
use crate::parameters::DebounceParams;
use crate::runtime::{timer, Runtime, ServiceId, TimerBank};
use crate::sensors::{TapeSensorArray, TAPE_SENSOR_COUNT};
use crate::services::TapeSide;

/// Differential debouncer for the five-sensor tape array.
#[derive(Debug)]
pub struct TapeService {
    emitters_on: bool,
    lit: [u16; TAPE_SENSOR_COUNT],
    dark: [u16; TAPE_SENSOR_COUNT],
    mask: TapeFlags,
    posted: TapeFlags,
    left_count: u8,
    right_count: u8,
    last_side: TapeSide,
}

impl TapeService {
    pub const fn new() -> Self {
        Self {
            emitters_on: false,
            lit: [0; TAPE_SENSOR_COUNT],
            dark: [0; TAPE_SENSOR_COUNT],
            mask: TapeFlags::empty(),
            posted: TapeFlags::empty(),
            left_count: 0,
            right_count: 0,
            last_side: TapeSide::NotFollowing,
        }
    }

    /// Start the sampling cycle: emitters lit first, timer armed.
    pub fn init(
        &mut self,
        sensor: &mut dyn TapeSensorArray,
        timers: &mut TimerBank,
        params: &DebounceParams,
    ) {
        sensor.set_emitters(true);
        self.emitters_on = true;
        timers.arm(timer::SYNC_SAMPLE, params.sync_sample_ticks);
    }

    /// Handle one event from this service's queue.
    pub fn run(
        &mut self,
        event: Event,
        sensor: &mut dyn TapeSensorArray,
        runtime: &mut Runtime,
        params: &DebounceParams,
    ) {
        if event.kind != EventKind::Timeout || event.param != timer::SYNC_SAMPLE {
            return;
        }
        runtime.timers.arm(timer::SYNC_SAMPLE, params.sync_sample_ticks);

        if self.emitters_on {
            self.lit = sensor.read_raw();
            sensor.set_emitters(false);
            self.emitters_on = false;
        } else {
            self.dark = sensor.read_raw();
            sensor.set_emitters(true);
            self.emitters_on = true;
            self.evaluate(runtime, params);
        }
    }

    /// Current debounced on-tape mask.
    #[inline]
    pub fn mask(&self) -> TapeFlags {
        self.mask
    }

    /// Which side of the line the rover last wandered over.
    #[inline]
    pub fn last_side(&self) -> TapeSide {
        self.last_side
    }

    fn evaluate(&mut self, runtime: &mut Runtime, params: &DebounceParams) {
        let mut mask = self.mask;
        for i in 0..TAPE_SENSOR_COUNT {
            let diff = i32::from(self.lit[i]) - i32::from(self.dark[i]);
            let bit = TapeFlags::from_bits_truncate(1 << i);
            if diff > i32::from(params.tape_high) {
                mask.remove(bit);
            } else if diff < i32::from(params.tape_low) {
                mask.insert(bit);
            }
        }
        self.mask = mask;

        if mask != self.posted {
            self.posted = mask;
            runtime.post(
                ServiceId::Mission,
                Event::new(EventKind::TapeTriggered, mask.bits()),
            );
            self.track_side(mask, params);
        }
    }

    fn track_side(&mut self, mask: TapeFlags, params: &DebounceParams) {
        if mask.contains(TapeFlags::FRONT_RIGHT) {
            self.right_count = self.right_count.saturating_add(1);
        }
        if mask.contains(TapeFlags::FRONT_LEFT) {
            self.left_count = self.left_count.saturating_add(1);
        }
        if self.right_count > params.tape_side_count {
            self.last_side = TapeSide::Right;
            self.right_count = 0;
            self.left_count = 0;
        } else if self.left_count > params.tape_side_count {
            self.last_side = TapeSide::Left;
            self.left_count = 0;
            self.right_count = 0;
        }
    }
}

impl Default for TapeService {
    fn default() -> Self {
        Self::new()
    }
}
