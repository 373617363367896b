//! Debounce parameter definitions
//!
//! Sampling periods and filter thresholds for the four sensor services.
//!
//! # Parameters
//!
//! - `DEB_SYNC_TICKS` - Tape emitter phase period (ticks)
//! - `DEB_WIRE_TICKS` - Track-wire mux period, doubles as settle time (ticks)
//! - `DEB_BEACON_TICKS` - Beacon sample period (ticks)
//! - `DEB_BUMPER_TICKS` - Bumper shift-register sample period (ticks)
//! - `DEB_TAPE_HIGH` - Differential above this reads as white floor
//! - `DEB_TAPE_LOW` - Differential below this reads as tape
//! - `DEB_TAPE_SIDE` - Corner-sensor changes before the side memory latches
//! - `DEB_WIRE_COUNT` - Consecutive coil samples before detection
//! - `DEB_BEACON_HOLD` - Agreeing beacon samples before the state flips

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

/// Debounce parameters loaded from the parameter store
#[derive(Debug, Clone, Copy)]
pub struct DebounceParams {
    /// Tape emitter phase period (ticks)
    pub sync_sample_ticks: u16,
    /// Track-wire mux period (ticks)
    pub track_wire_ticks: u16,
    /// Beacon sample period (ticks)
    pub beacon_ticks: u16,
    /// Bumper sample period (ticks)
    pub bumper_ticks: u16,
    /// Tape differential release threshold
    pub tape_high: u16,
    /// Tape differential detect threshold
    pub tape_low: u16,
    /// Corner-sensor hits before the side memory latches
    pub tape_side_count: u8,
    /// Consecutive samples before a coil counts as detected
    pub wire_count: u8,
    /// Agreeing samples before the beacon state flips
    pub beacon_hold: u8,
}

impl DebounceParams {
    /// Register debounce parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register("DEB_SYNC_TICKS", ParamValue::Int(5), ParamFlags::empty())?;
        store.register("DEB_WIRE_TICKS", ParamValue::Int(8), ParamFlags::empty())?;
        store.register("DEB_BEACON_TICKS", ParamValue::Int(2), ParamFlags::empty())?;
        store.register("DEB_BUMPER_TICKS", ParamValue::Int(5), ParamFlags::empty())?;
        store.register("DEB_TAPE_HIGH", ParamValue::Int(300), ParamFlags::empty())?;
        store.register("DEB_TAPE_LOW", ParamValue::Int(100), ParamFlags::empty())?;
        store.register("DEB_TAPE_SIDE", ParamValue::Int(3), ParamFlags::empty())?;
        store.register("DEB_WIRE_COUNT", ParamValue::Int(2), ParamFlags::empty())?;
        store.register("DEB_BEACON_HOLD", ParamValue::Int(5), ParamFlags::empty())?;
        Ok(())
    }

    /// Load debounce parameters from the parameter store
    ///
    /// Missing entries fall back to the registration defaults.
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            sync_sample_ticks: store.get_int("DEB_SYNC_TICKS", 5) as u16,
            track_wire_ticks: store.get_int("DEB_WIRE_TICKS", 8) as u16,
            beacon_ticks: store.get_int("DEB_BEACON_TICKS", 2) as u16,
            bumper_ticks: store.get_int("DEB_BUMPER_TICKS", 5) as u16,
            tape_high: store.get_int("DEB_TAPE_HIGH", 300) as u16,
            tape_low: store.get_int("DEB_TAPE_LOW", 100) as u16,
            tape_side_count: store.get_int("DEB_TAPE_SIDE", 3) as u8,
            wire_count: store.get_int("DEB_WIRE_COUNT", 2) as u8,
            beacon_hold: store.get_int("DEB_BEACON_HOLD", 5) as u8,
        }
    }

    /// Check the hysteresis band is ordered.
    pub fn is_configured(&self) -> bool {
        self.tape_low < self.tape_high
    }
}

impl Default for DebounceParams {
    fn default() -> Self {
        Self::from_store(&ParameterStore::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_defaults() {
        let mut store = ParameterStore::new();
        DebounceParams::register_defaults(&mut store).unwrap();
        assert_eq!(store.len(), 9);
    }

    #[test]
    fn test_from_store_defaults() {
        let store = ParameterStore::new();
        let params = DebounceParams::from_store(&store);
        assert_eq!(params.sync_sample_ticks, 5);
        assert_eq!(params.tape_high, 300);
        assert_eq!(params.tape_low, 100);
        assert!(params.is_configured());
    }

    #[test]
    fn test_from_store_custom_values() {
        let mut store = ParameterStore::new();
        DebounceParams::register_defaults(&mut store).unwrap();
        store.set("DEB_TAPE_HIGH", ParamValue::Int(90)).unwrap();

        let params = DebounceParams::from_store(&store);
        assert_eq!(params.tape_high, 90);
        assert!(!params.is_configured());
    }
}
