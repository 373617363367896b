//! Fixed-capacity per-service event queues
//!
//! Posting never blocks: a full queue rejects the event and the caller
//! decides whether that matters (the debounce services drop and re-detect on
//! the next sample; nothing in the core retries).

use heapless::Deque;

use crate::events::Event;

/// Capacity of each service queue.
pub const QUEUE_DEPTH: usize = 8;

/// FIFO event queue for one service.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Deque<Event, QUEUE_DEPTH>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            events: Deque::new(),
        }
    }

    /// Append an event; returns false (event dropped) when full.
    pub fn post(&mut self, event: Event) -> bool {
        self.events.push_back(event).is_ok()
    }

    /// Remove and return the oldest pending event.
    pub fn take(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
