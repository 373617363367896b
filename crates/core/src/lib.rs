//! mech_rover_core - Pure no_std mission logic for an autonomous competition robot
//!
//! This crate contains the event-driven behavior core: a hierarchical state
//! machine that sequences the robot through its mission (find ammo, load it,
//! find and unload at two targets), fed by debounced sensor events and driving
//! motors/servos through trait seams.
//!
//! # Design Principles
//!
//! - **Zero cfg**: no feature gates anywhere in the crate
//! - **Pure no_std**: builds without the standard library or an allocator
//! - **Trait abstractions**: Hardware injected via traits; charts never touch
//!   pins, globals, or clocks directly
//! - **Run-to-completion**: One cooperative tick services the debounce layer,
//!   then the mission machine; nothing blocks, all waiting is a timer
//!
//! # Modules
//!
//! - [`events`]: Event values and sensor bitmask types
//! - [`runtime`]: Per-service event queues and the one-shot timer bank
//! - [`hsm`]: State chart engine (dispatch verdicts, exit/entry step loop)
//! - [`services`]: Sensor debounce services and the published snapshot
//! - [`motor`]: Motor driver abstraction (PWM + direction)
//! - [`drive`]: Maneuver-level drive interface and differential drive
//! - [`servo`]: Unloading/bridge servo interface and pulse clamping
//! - [`sensors`]: Raw sensor trait seams polled by the debounce layer
//! - [`parameters`]: Parameter store and tunable parameter blocks
//! - [`executive`]: Owns the runtime, services, and mission chart; per-tick entry point

#![no_std]

pub mod drive;
pub mod events;
pub mod executive;
pub mod hsm;
pub mod motor;
pub mod parameters;
pub mod runtime;
pub mod sensors;
pub mod servo;
pub mod services;
