//! Loading and unloading parameter definitions
//!
//! Tunables for the ball-handling sequences: the reverse run onto the
//! loading station, the shimmy that settles incoming balls, and the servo
//! choreography that empties the hopper at a target.
//!
//! # Parameters
//!
//! - `ULD_BACKUP_TICKS` - Reverse run onto the loading station (ticks)
//! - `ULD_BACKUP_SPEED` - Speed for that reverse run (0-50)
//! - `ULD_SHIMMY_MAX` - Shimmy half-periods before loading is called done
//! - `ULD_RETREAT_TICKS` - Reverse-off-the-tape hold at a target (ticks)
//! - `ULD_DWELL_TICKS` - Pause at each sweep extreme (ticks)
//! - `ULD_SWEEP_STEP` - Servo pulse change per sweep step (us)
//! - `ULD_SWEEP_LOW` / `ULD_SWEEP_MID` / `ULD_SWEEP_HIGH` - Sweep servo
//!   pulse positions (us)
//! - `ULD_BRIDGE_IN` / `ULD_BRIDGE_OUT` - Bridge servo pulse positions (us)

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

/// Load/unload parameters loaded from the parameter store
#[derive(Debug, Clone, Copy)]
pub struct UnloadParams {
    /// Reverse run onto the loading station (ticks)
    pub backup_ticks: u16,
    /// Speed for the loading reverse run
    pub backup_speed: u8,
    /// Shimmy half-periods before loading is called done
    pub shimmy_max: u8,
    /// Reverse-off-the-tape hold at a target (ticks)
    pub retreat_ticks: u16,
    /// Pause at each sweep extreme (ticks)
    pub dwell_ticks: u16,
    /// Servo pulse change per sweep step (us)
    pub sweep_step: u16,
    /// Sweep servo low extreme (us)
    pub sweep_low: u16,
    /// Sweep servo center rest (us)
    pub sweep_mid: u16,
    /// Sweep servo high extreme (us)
    pub sweep_high: u16,
    /// Bridge servo retracted (us)
    pub bridge_in: u16,
    /// Bridge servo deployed (us)
    pub bridge_out: u16,
}

impl UnloadParams {
    /// Register load/unload parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register("ULD_BACKUP_TICKS", ParamValue::Int(1500), ParamFlags::empty())?;
        store.register("ULD_BACKUP_SPEED", ParamValue::Int(40), ParamFlags::empty())?;
        store.register("ULD_SHIMMY_MAX", ParamValue::Int(6), ParamFlags::empty())?;
        store.register("ULD_RETREAT_TICKS", ParamValue::Int(250), ParamFlags::empty())?;
        store.register("ULD_DWELL_TICKS", ParamValue::Int(2500), ParamFlags::empty())?;
        store.register("ULD_SWEEP_STEP", ParamValue::Int(10), ParamFlags::empty())?;
        store.register("ULD_SWEEP_LOW", ParamValue::Int(1000), ParamFlags::empty())?;
        store.register("ULD_SWEEP_MID", ParamValue::Int(1500), ParamFlags::empty())?;
        store.register("ULD_SWEEP_HIGH", ParamValue::Int(2000), ParamFlags::empty())?;
        store.register("ULD_BRIDGE_IN", ParamValue::Int(1500), ParamFlags::empty())?;
        store.register("ULD_BRIDGE_OUT", ParamValue::Int(1000), ParamFlags::empty())?;
        Ok(())
    }

    /// Load the parameters from the parameter store
    ///
    /// Missing entries fall back to the registration defaults.
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            backup_ticks: store.get_int("ULD_BACKUP_TICKS", 1500) as u16,
            backup_speed: store.get_int("ULD_BACKUP_SPEED", 40) as u8,
            shimmy_max: store.get_int("ULD_SHIMMY_MAX", 6) as u8,
            retreat_ticks: store.get_int("ULD_RETREAT_TICKS", 250) as u16,
            dwell_ticks: store.get_int("ULD_DWELL_TICKS", 2500) as u16,
            sweep_step: store.get_int("ULD_SWEEP_STEP", 10) as u16,
            sweep_low: store.get_int("ULD_SWEEP_LOW", 1000) as u16,
            sweep_mid: store.get_int("ULD_SWEEP_MID", 1500) as u16,
            sweep_high: store.get_int("ULD_SWEEP_HIGH", 2000) as u16,
            bridge_in: store.get_int("ULD_BRIDGE_IN", 1500) as u16,
            bridge_out: store.get_int("ULD_BRIDGE_OUT", 1000) as u16,
        }
    }

    /// Check the sweep positions are ordered around the center.
    pub fn is_configured(&self) -> bool {
        self.sweep_low < self.sweep_mid && self.sweep_mid < self.sweep_high
    }
}

impl Default for UnloadParams {
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
        UnloadParams::register_defaults(&mut store).unwrap();
        assert_eq!(store.len(), 11);
    }

    #[test]
    fn test_from_store_defaults() {
        let params = UnloadParams::default();
        assert_eq!(params.backup_speed, 40);
        assert_eq!(params.sweep_mid, 1500);
        assert!(params.is_configured());
    }

    #[test]
    fn test_from_store_custom_values() {
        let mut store = ParameterStore::new();
        UnloadParams::register_defaults(&mut store).unwrap();
        store.set("ULD_SWEEP_HIGH", ParamValue::Int(1400)).unwrap();

        let params = UnloadParams::from_store(&store);
        assert!(!params.is_configured());
    }
}
