//! Drive parameter definitions
//!
//! Speed scale and wiring polarity for the differential drive.
//!
//! # Parameters
//!
//! - `DRV_NORM_SPEED` - Cruise speed every maneuver resets to (0-50)
//! - `DRV_MAX_SPEED` - Upper clamp for speed rescaling (0-50)
//! - `DRV_INV_LEFT` - Invert the left motor's forward direction
//! - `DRV_INV_RIGHT` - Invert the right motor's forward direction
//!
//! The inversion flags absorb how the gearmotors are mirrored on the
//! chassis, so the maneuver layer can reason in chassis-forward terms. The
//! stock wiring has the right motor mounted flipped.

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

/// Drive parameters loaded from the parameter store
#[derive(Debug, Clone, Copy)]
pub struct DriveParams {
    /// Cruise speed every maneuver resets to
    pub normal_speed: u8,
    /// Upper clamp for commanded speed
    pub max_speed: u8,
    /// Invert the left motor's forward direction
    pub invert_left: bool,
    /// Invert the right motor's forward direction
    pub invert_right: bool,
}

impl DriveParams {
    /// Register drive parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register("DRV_NORM_SPEED", ParamValue::Int(25), ParamFlags::empty())?;
        store.register("DRV_MAX_SPEED", ParamValue::Int(50), ParamFlags::empty())?;
        store.register("DRV_INV_LEFT", ParamValue::Bool(false), ParamFlags::empty())?;
        store.register("DRV_INV_RIGHT", ParamValue::Bool(true), ParamFlags::empty())?;
        Ok(())
    }

    /// Load drive parameters from the parameter store
    ///
    /// Missing entries fall back to the registration defaults.
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            normal_speed: store.get_int("DRV_NORM_SPEED", 25) as u8,
            max_speed: store.get_int("DRV_MAX_SPEED", 50) as u8,
            invert_left: store.get_bool("DRV_INV_LEFT", false),
            invert_right: store.get_bool("DRV_INV_RIGHT", true),
        }
    }

    /// Clamp a requested speed to the configured maximum.
    #[inline]
    pub fn clamp_speed(&self, speed: u8) -> u8 {
        speed.min(self.max_speed)
    }
}

impl Default for DriveParams {
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
        DriveParams::register_defaults(&mut store).unwrap();

        assert!(store.get("DRV_NORM_SPEED").is_some());
        assert!(store.get("DRV_MAX_SPEED").is_some());
        assert!(store.get("DRV_INV_LEFT").is_some());
        assert!(store.get("DRV_INV_RIGHT").is_some());
    }

    #[test]
    fn test_from_store_defaults() {
        let mut store = ParameterStore::new();
        DriveParams::register_defaults(&mut store).unwrap();

        let params = DriveParams::from_store(&store);
        assert_eq!(params.normal_speed, 25);
        assert_eq!(params.max_speed, 50);
        assert!(!params.invert_left);
        assert!(params.invert_right);
    }

    #[test]
    fn test_from_store_custom_values() {
        let mut store = ParameterStore::new();
        DriveParams::register_defaults(&mut store).unwrap();

        store.set("DRV_NORM_SPEED", ParamValue::Int(30)).unwrap();
        store.set("DRV_INV_RIGHT", ParamValue::Bool(false)).unwrap();

        let params = DriveParams::from_store(&store);
        assert_eq!(params.normal_speed, 30);
        assert!(!params.invert_right);
    }

    #[test]
    fn test_clamp_speed() {
        let params = DriveParams::default();
        assert_eq!(params.clamp_speed(20), 20);
        assert_eq!(params.clamp_speed(80), 50);
    }
}
