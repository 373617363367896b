//! Event values and sensor bitmask types
//!
//! Everything that flows through the dispatch layer is an [`Event`]: a kind
//! plus a 16-bit parameter whose meaning depends on the kind (a sensor
//! bitmask for the `*Triggered` kinds, a timer id for `Timeout`). Events are
//! small `Copy` values passed between machine layers, never owned resources.

use bitflags::bitflags;

/// Closed enumeration of every event kind in the system.
///
/// The first group is reserved by the dispatch framework (`Entry`/`Exit` are
/// synthesized by the chart engine, `Timeout` by the timer bank); the second
/// group is produced by the debounce services and the charts themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    NoEvent,
    Error,
    Init,
    Entry,
    Exit,
    Timeout,
    TimerActive,
    TimerStopped,
    KeyInput,
    ListEvents,
    OffTape,
    OnTape,
    TapeTriggered,
    TwTriggered,
    TrackWireOn,
    TrackWireOff,
    BeaconOn,
    BeaconOff,
    BeaconTriggered,
    Bumped,
    Unloaded,
    BatteryConnected,
    BatteryDisconnected,
}

impl EventKind {
    /// Human-readable name for host-side reporting.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NoEvent => "NO_EVENT",
            EventKind::Error => "ERROR",
            EventKind::Init => "INIT",
            EventKind::Entry => "ENTRY",
            EventKind::Exit => "EXIT",
            EventKind::Timeout => "TIMEOUT",
            EventKind::TimerActive => "TIMER_ACTIVE",
            EventKind::TimerStopped => "TIMER_STOPPED",
            EventKind::KeyInput => "KEY_INPUT",
            EventKind::ListEvents => "LIST_EVENTS",
            EventKind::OffTape => "OFF_TAPE",
            EventKind::OnTape => "ON_TAPE",
            EventKind::TapeTriggered => "TAPE_TRIGGERED",
            EventKind::TwTriggered => "TW_TRIGGERED",
            EventKind::TrackWireOn => "TRACK_WIRE_ON",
            EventKind::TrackWireOff => "TRACK_WIRE_OFF",
            EventKind::BeaconOn => "BEACON_ON",
            EventKind::BeaconOff => "BEACON_OFF",
            EventKind::BeaconTriggered => "BEACON_TRIGGERED",
            EventKind::Bumped => "BUMPED",
            EventKind::Unloaded => "UNLOADED",
            EventKind::BatteryConnected => "BATTERY_CONNECTED",
            EventKind::BatteryDisconnected => "BATTERY_DISCONNECTED",
        }
    }
}

/// One dispatched event: a kind plus a kind-dependent parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub param: u16,
}

impl Event {
    pub const fn new(kind: EventKind, param: u16) -> Self {
        Self { kind, param }
    }

    /// Event with no parameter payload.
    pub const fn of(kind: EventKind) -> Self {
        Self::new(kind, 0)
    }

    pub const fn none() -> Self {
        Self::of(EventKind::NoEvent)
    }

    pub const fn init() -> Self {
        Self::of(EventKind::Init)
    }

    pub const fn entry() -> Self {
        Self::of(EventKind::Entry)
    }

    pub const fn exit() -> Self {
        Self::of(EventKind::Exit)
    }

    /// True for `NoEvent`, i.e. a consumed/absent event.
    pub fn is_none(&self) -> bool {
        self.kind == EventKind::NoEvent
    }
}

bitflags! {
    /// Tape sensor bits carried in `TapeTriggered.param`.
    ///
    /// A set bit means that sensor sees tape after the reported change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TapeFlags: u16 {
        const FRONT_RIGHT = 0x01;
        const FRONT_LEFT = 0x02;
        const FRONT_MIDDLE = 0x04;
        const BACK_RIGHT = 0x08;
        const BACK_LEFT = 0x10;
    }
}

bitflags! {
    /// Track-wire bits carried in `TwTriggered.param`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WireFlags: u16 {
        const FRONT = 0x01;
        const BACK = 0x02;
    }
}

bitflags! {
    /// Bumper bits carried in `Bumped.param`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BumperFlags: u16 {
        const FRONT_RIGHT = 0x01;
        const FRONT_LEFT = 0x02;
        const PLUNGER = 0x04;
    }
}
