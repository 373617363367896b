//! Sensor front-end traits
//!
//! Hardware-facing traits for the four sensor groups the debounce services
//! sample. Implementations hide electrical details behind semantic reads:
//! an active-low comparator output becomes `read_detected() -> bool`, a
//! multiplexed ADC pin becomes `select` + `read_detected`.
//!
//! ## Conventions
//!
//! - Tape levels are raw 10-bit conversions, index `i` of the returned
//!   array corresponds to bit `1 << i` of
//!   [`TapeFlags`](crate::events::TapeFlags).
//! - Bumper reads return a plain mask, bit `1 << i` per switch, in the
//!   [`BumperFlags`](crate::events::BumperFlags) layout.
//! - Detection reads return `true` for "signal present" regardless of the
//!   pin's idle polarity.
//!
//! `Mock*` implementations with public fields are provided for host-side
//! tests of the services and charts.

/// Reflective tape sensors under the chassis.
pub const TAPE_SENSOR_COUNT: usize = 5;

/// Debounced bumper switches around the shell.
pub const BUMPER_COUNT: usize = 3;

/// IR-reflectance array used for tape detection.
///
/// The emitters are switched as a bank so the sampling service can take
/// lit and ambient readings and work on the difference.
pub trait TapeSensorArray {
    /// Drive all tape emitters on or off.
    fn set_emitters(&mut self, on: bool);

    /// Convert every channel once and return the raw levels.
    fn read_raw(&mut self) -> [u16; TAPE_SENSOR_COUNT];
}

/// Which track-wire inductor the shared input currently measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireProbe {
    Front,
    Back,
}

impl WireProbe {
    pub const fn other(self) -> WireProbe {
        match self {
            WireProbe::Front => WireProbe::Back,
            WireProbe::Back => WireProbe::Front,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            WireProbe::Front => 0,
            WireProbe::Back => 1,
        }
    }
}

/// Two track-wire pickup coils behind one analog input.
///
/// `select` switches the mux; callers are expected to wait one sampling
/// period before trusting `read_detected` so the input settles.
pub trait TrackWireSensor {
    fn select(&mut self, probe: WireProbe);

    /// Whether the currently selected coil sees the 25-kHz field.
    fn read_detected(&mut self) -> bool;
}

/// Demodulated 2-kHz beacon detector.
pub trait BeaconSensor {
    fn read_detected(&mut self) -> bool;
}

/// Bumper limit switches.
pub trait BumperSensors {
    /// Instantaneous pressed mask, one bit per switch.
    fn read_raw(&mut self) -> u8;
}

/// Scriptable tape array for tests.
#[derive(Debug)]
pub struct MockTapeArray {
    pub emitters_on: bool,
    pub lit: [u16; TAPE_SENSOR_COUNT],
    pub dark: [u16; TAPE_SENSOR_COUNT],
}

impl MockTapeArray {
    pub fn new() -> Self {
        Self {
            emitters_on: false,
            lit: [0; TAPE_SENSOR_COUNT],
            dark: [0; TAPE_SENSOR_COUNT],
        }
    }
}

impl Default for MockTapeArray {
    fn default() -> Self {
        Self::new()
    }
}

impl TapeSensorArray for MockTapeArray {
    #[inline]
    fn set_emitters(&mut self, on: bool) {
        self.emitters_on = on;
    }

    #[inline]
    fn read_raw(&mut self) -> [u16; TAPE_SENSOR_COUNT] {
        if self.emitters_on {
            self.lit
        } else {
            self.dark
        }
    }
}

/// Scriptable track-wire pair for tests.
#[derive(Debug)]
pub struct MockTrackWire {
    pub selected: WireProbe,
    pub front: bool,
    pub back: bool,
}

impl MockTrackWire {
    pub fn new() -> Self {
        Self {
            selected: WireProbe::Front,
            front: false,
            back: false,
        }
    }
}

impl Default for MockTrackWire {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackWireSensor for MockTrackWire {
    #[inline]
    fn select(&mut self, probe: WireProbe) {
        self.selected = probe;
    }

    #[inline]
    fn read_detected(&mut self) -> bool {
        match self.selected {
            WireProbe::Front => self.front,
            WireProbe::Back => self.back,
        }
    }
}

/// Scriptable beacon detector for tests.
#[derive(Debug, Default)]
pub struct MockBeacon {
    pub detected: bool,
}

impl MockBeacon {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BeaconSensor for MockBeacon {
    #[inline]
    fn read_detected(&mut self) -> bool {
        self.detected
    }
}

/// Scriptable bumpers for tests.
#[derive(Debug, Default)]
pub struct MockBumpers {
    pub pressed: u8,
}

impl MockBumpers {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BumperSensors for MockBumpers {
    #[inline]
    fn read_raw(&mut self) -> u8 {
        self.pressed
    }
}
