//! Host-side simulator for the rover behavior core
//!
//! Runs the real executive against a 2-D arena model: differential-drive
//! kinematics, tape strips and track wires on the floor, a beacon, and
//! obstacle posts, with deterministic seeded sensor noise. The
//! `mission_sim` binary runs complete missions on the host; the library
//! pieces are also usable individually from tests.
//!
//! The loop is synchronous lockstep: one physics step, then one executive
//! tick, repeated. No part of the simulator is time-based, so runs are
//! reproducible down to the tick.

pub mod arena;
pub mod error;
pub mod platform;
pub mod rover;

pub use arena::{Arena, Vec2};
pub use error::SimError;
pub use platform::SimPlatform;
pub use rover::{RoverConfig, SimRover};
