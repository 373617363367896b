//! Sensor debounce services
//!
//! Four periodic services stand between the raw sensors and the state
//! charts. Each owns a hardware timer, re-arms it on every expiration, and
//! posts a debounced event to the mission queue only when its filtered
//! picture changes:
//!
//! - [`TapeService`]: synchronized differential sampling of the five
//!   reflectance sensors, `TapeTriggered` with the on-tape mask.
//! - [`TrackWireService`]: multiplexed front/back coil polling,
//!   `TwTriggered` when either debounced coil flips.
//! - [`BeaconService`]: hold-count filter on the beacon detector,
//!   `BeaconTriggered` with 1/0 in the parameter.
//! - [`BumperService`]: shift-register press detection, `Bumped` with the
//!   newly-pressed mask.
//!
//! The services never dispatch into the charts themselves. The executive
//! drains their queues, runs them, then hands the resulting events to the
//! mission chart together with a [`SensorSnapshot`] of the debounced state.

pub mod beacon;
pub mod bumper;
pub mod tape;
pub mod track_wire;

pub use beacon::BeaconService;
pub use bumper::BumperService;
pub use tape::TapeService;
pub use track_wire::TrackWireService;

/// Which side of the followed tape line the rover last drifted over.
///
/// Maintained by [`TapeService`] from the front corner sensors and used by
/// the search charts to pick a recovery turn direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapeSide {
    #[default]
    NotFollowing,
    Left,
    Right,
}

/// Debounced sensor picture captured at dispatch time.
///
/// Charts read this instead of touching sensors, so every handler in one
/// run-to-completion step sees the same world.
#[derive(Debug, Clone, Copy)]
pub struct SensorSnapshot {
    pub last_tape: TapeSide,
    pub wire_front: bool,
    pub wire_back: bool,
    pub beacon: bool,
}

impl SensorSnapshot {
    pub const fn new() -> Self {
        Self {
            last_tape: TapeSide::NotFollowing,
            wire_front: false,
            wire_back: false,
            beacon: false,
        }
    }
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
