//! Event dispatch and timer runtime
//!
//! The runtime owns one event queue per service plus the shared timer bank.
//! Services are drained once per tick in a fixed priority order, the four
//! debounce services first and the mission chart last, so the sensor
//! snapshot the charts read is always refreshed before events derived from
//! it are consumed in the same tick.
//!
//! Draining a service yields its expired timers (lowest id first) before its
//! posted events.

pub mod queue;
pub mod timer;

pub use queue::{EventQueue, QUEUE_DEPTH};
pub use timer::{TimerBank, TIMER_COUNT};

use crate::events::Event;

/// Number of schedulable services.
pub const SERVICE_COUNT: usize = 5;

/// Destination of posted events and routed timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceId {
    Tape,
    TrackWire,
    Beacon,
    Bumper,
    Mission,
}

impl ServiceId {
    /// All services in per-tick priority order (debounce before mission).
    pub const ALL: [ServiceId; SERVICE_COUNT] = [
        ServiceId::Tape,
        ServiceId::TrackWire,
        ServiceId::Beacon,
        ServiceId::Bumper,
        ServiceId::Mission,
    ];

    const fn index(self) -> usize {
        match self {
            ServiceId::Tape => 0,
            ServiceId::TrackWire => 1,
            ServiceId::Beacon => 2,
            ServiceId::Bumper => 3,
            ServiceId::Mission => 4,
        }
    }
}

/// Queues and timers for one robot instance.
#[derive(Debug)]
pub struct Runtime {
    pub timers: TimerBank,
    queues: [EventQueue; SERVICE_COUNT],
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    pub const fn new() -> Self {
        Self {
            timers: TimerBank::new(),
            queues: [
                EventQueue::new(),
                EventQueue::new(),
                EventQueue::new(),
                EventQueue::new(),
                EventQueue::new(),
            ],
        }
    }

    /// Post an event to a service's queue; false when the queue is full.
    pub fn post(&mut self, service: ServiceId, event: Event) -> bool {
        self.queues[service.index()].post(event)
    }

    /// Next pending event for a service: expired timers first, then the
    /// queue.
    pub fn take_event_for(&mut self, service: ServiceId) -> Option<Event> {
        self.timers
            .take_expired_for(service)
            .or_else(|| self.queues[service.index()].take())
    }

    pub fn pending(&self, service: ServiceId) -> usize {
        self.queues[service.index()].len()
    }
}
