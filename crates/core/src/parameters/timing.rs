//! Maneuver timing definitions
//!
//! Calibrated open-loop durations, all in 1-ms scheduler ticks. The turn
//! times were measured at cruise speed on the competition floor; they scale
//! together if the drive speed changes.
//!
//! # Parameters
//!
//! - `TIM_TURN_22` / `TIM_TURN_45` / `TIM_TURN_90` / `TIM_TURN_180` /
//!   `TIM_TURN_360` - Tank-turn durations for the named arcs
//! - `TIM_SHORT` / `TIM_MEDIUM` / `TIM_LONG` - General maneuver holds
//! - `TIM_SHIMMY` - Half-period of the load-settling shake
//! - `TIM_SCAN` - Beacon scan window before giving up a heading
//! - `TIM_SERVO` - Servo sweep step period

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

/// Maneuver timing loaded from the parameter store
#[derive(Debug, Clone, Copy)]
pub struct TimingParams {
    /// 22.5-degree tank turn (ticks)
    pub turn_22_ticks: u16,
    /// 45-degree tank turn (ticks)
    pub turn_45_ticks: u16,
    /// 90-degree tank turn (ticks)
    pub turn_90_ticks: u16,
    /// 180-degree tank turn (ticks)
    pub turn_180_ticks: u16,
    /// Full-revolution tank turn (ticks)
    pub turn_360_ticks: u16,
    /// Short maneuver hold (ticks)
    pub short_ticks: u16,
    /// Medium maneuver hold (ticks)
    pub medium_ticks: u16,
    /// Long maneuver hold (ticks)
    pub long_ticks: u16,
    /// Half-period of the shimmy shake (ticks)
    pub shimmy_ticks: u16,
    /// Beacon scan window (ticks)
    pub scan_ticks: u16,
    /// Servo sweep step period (ticks)
    pub servo_ticks: u16,
}

impl TimingParams {
    /// Register timing parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register("TIM_TURN_22", ParamValue::Int(342), ParamFlags::empty())?;
        store.register("TIM_TURN_45", ParamValue::Int(685), ParamFlags::empty())?;
        store.register("TIM_TURN_90", ParamValue::Int(1370), ParamFlags::empty())?;
        store.register("TIM_TURN_180", ParamValue::Int(2740), ParamFlags::empty())?;
        store.register("TIM_TURN_360", ParamValue::Int(5480), ParamFlags::empty())?;
        store.register("TIM_SHORT", ParamValue::Int(50), ParamFlags::empty())?;
        store.register("TIM_MEDIUM", ParamValue::Int(250), ParamFlags::empty())?;
        store.register("TIM_LONG", ParamValue::Int(1000), ParamFlags::empty())?;
        store.register("TIM_SHIMMY", ParamValue::Int(500), ParamFlags::empty())?;
        store.register("TIM_SCAN", ParamValue::Int(4000), ParamFlags::empty())?;
        store.register("TIM_SERVO", ParamValue::Int(25), ParamFlags::empty())?;
        Ok(())
    }

    /// Load timing parameters from the parameter store
    ///
    /// Missing entries fall back to the registration defaults.
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            turn_22_ticks: store.get_int("TIM_TURN_22", 342) as u16,
            turn_45_ticks: store.get_int("TIM_TURN_45", 685) as u16,
            turn_90_ticks: store.get_int("TIM_TURN_90", 1370) as u16,
            turn_180_ticks: store.get_int("TIM_TURN_180", 2740) as u16,
            turn_360_ticks: store.get_int("TIM_TURN_360", 5480) as u16,
            short_ticks: store.get_int("TIM_SHORT", 50) as u16,
            medium_ticks: store.get_int("TIM_MEDIUM", 250) as u16,
            long_ticks: store.get_int("TIM_LONG", 1000) as u16,
            shimmy_ticks: store.get_int("TIM_SHIMMY", 500) as u16,
            scan_ticks: store.get_int("TIM_SCAN", 4000) as u16,
            servo_ticks: store.get_int("TIM_SERVO", 25) as u16,
        }
    }
}

impl Default for TimingParams {
    fn default() -> Self {
        Self::from_store(&ParameterStore::new())
    }
}
