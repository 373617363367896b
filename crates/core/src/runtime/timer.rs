//! One-shot countdown timer bank
//!
//! Sixteen independently addressable timers, each statically routed to one
//! service. [`TimerBank::advance`] counts every running timer down once per
//! scheduler tick; a timer reaching zero becomes *expired* and is delivered
//! as a `Timeout { param = id }` the next time its destination service is
//! drained. Delivery is lazy so that [`TimerBank::stop`] can suppress a
//! pending timeout entirely: a timer stopped by an exit handler never
//! fires, even when it elapsed earlier in the same tick.
//!
//! Timer ids double as the `Timeout.param` value, so handlers match on the
//! constants in [`self`] (e.g. `ev.param == timer::SHIMMY`).

use crate::events::{Event, EventKind};
use crate::runtime::ServiceId;

/// Number of timer slots in the bank.
pub const TIMER_COUNT: usize = 16;

pub const SYNC_SAMPLE: u16 = 0;
pub const SHORT: u16 = 1;
pub const MEDIUM: u16 = 2;
pub const LONG: u16 = 3;
pub const BUMPER_DEBOUNCE: u16 = 4;
pub const TRACK_WIRE: u16 = 5;
pub const TURN_45: u16 = 6;
pub const TURN_90: u16 = 7;
pub const TURN_180: u16 = 8;
pub const TURN_22: u16 = 9;
pub const BEACON_DEBOUNCE: u16 = 10;
pub const TURN_360: u16 = 11;
pub const SHIMMY: u16 = 12;
pub const SCAN: u16 = 13;
pub const SERVO: u16 = 14;

/// Every timer routed to the mission chart, in id order.
///
/// The mission's init stops all of these after the sub-charts run their
/// initial entry actions, since those actions may have armed some.
pub const MISSION_TIMERS: [u16; 11] = [
    SHORT, MEDIUM, LONG, TURN_45, TURN_90, TURN_180, TURN_22, TURN_360, SHIMMY, SCAN, SERVO,
];

/// Static routing: which service a timer's timeout is delivered to.
pub fn destination(id: u16) -> Option<ServiceId> {
    match id {
        SYNC_SAMPLE => Some(ServiceId::Tape),
        TRACK_WIRE => Some(ServiceId::TrackWire),
        BEACON_DEBOUNCE => Some(ServiceId::Beacon),
        BUMPER_DEBOUNCE => Some(ServiceId::Bumper),
        SHORT | MEDIUM | LONG | TURN_45 | TURN_90 | TURN_180 | TURN_22 | TURN_360 | SHIMMY
        | SCAN | SERVO => Some(ServiceId::Mission),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Idle,
    Running,
    Expired,
}

#[derive(Debug, Clone, Copy)]
struct TimerSlot {
    state: SlotState,
    remaining: u16,
}

impl TimerSlot {
    const fn new() -> Self {
        Self {
            state: SlotState::Idle,
            remaining: 0,
        }
    }
}

/// The fixed pool of one-shot timers.
#[derive(Debug)]
pub struct TimerBank {
    slots: [TimerSlot; TIMER_COUNT],
}

impl Default for TimerBank {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerBank {
    pub const fn new() -> Self {
        Self {
            slots: [TimerSlot::new(); TIMER_COUNT],
        }
    }

    /// Start (or restart) a timer. Arming with 0 ticks expires on the next
    /// advance. Out-of-range ids are ignored.
    pub fn arm(&mut self, id: u16, ticks: u16) {
        if let Some(slot) = self.slots.get_mut(id as usize) {
            slot.state = SlotState::Running;
            slot.remaining = ticks;
        }
    }

    /// Stop a timer, suppressing any not-yet-delivered timeout.
    pub fn stop(&mut self, id: u16) {
        if let Some(slot) = self.slots.get_mut(id as usize) {
            slot.state = SlotState::Idle;
            slot.remaining = 0;
        }
    }

    pub fn is_running(&self, id: u16) -> bool {
        self.slots
            .get(id as usize)
            .is_some_and(|s| s.state == SlotState::Running)
    }

    /// Ticks left on a running timer.
    pub fn remaining(&self, id: u16) -> Option<u16> {
        self.slots
            .get(id as usize)
            .filter(|s| s.state == SlotState::Running)
            .map(|s| s.remaining)
    }

    /// Count every running timer down by one tick; timers reaching zero
    /// become expired and await delivery.
    pub fn advance(&mut self) {
        for slot in self.slots.iter_mut() {
            if slot.state == SlotState::Running {
                slot.remaining = slot.remaining.saturating_sub(1);
                if slot.remaining == 0 {
                    slot.state = SlotState::Expired;
                }
            }
        }
    }

    /// Deliver the lowest-id expired timer routed to `service`, if any.
    pub fn take_expired_for(&mut self, service: ServiceId) -> Option<Event> {
        for (id, slot) in self.slots.iter_mut().enumerate() {
            if slot.state == SlotState::Expired && destination(id as u16) == Some(service) {
                slot.state = SlotState::Idle;
                return Some(Event::new(EventKind::Timeout, id as u16));
            }
        }
        None
    }
}
