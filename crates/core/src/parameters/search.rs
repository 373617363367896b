//! Search behavior parameter definitions
//!
//! Tunables for the two field-search behaviors: the outward spiral that
//! hunts for the second target's wall and the stuck-detection that keeps
//! tape searching from ping-ponging into the same obstacle.
//!
//! # Parameters
//!
//! - `SRCH_SPIRAL_DIFF` - Initial wheel differential of the spiral
//! - `SRCH_SPIRAL_STEP` - Differential reduction per half-revolution
//! - `SRCH_SPIRAL_FLR` - Differential floor, keeps the spiral a spiral
//! - `SRCH_STUCK_MAX` - Same-side hits tolerated before turning into the hit
//! - `SRCH_ALIGN_DIFF` - Differential of the first turn onto a found line
//! - `SRCH_FOLLOW_DIFF` - Differential of follow-up corrections on the line

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

/// Search parameters loaded from the parameter store
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Initial wheel differential of the outward spiral
    pub spiral_diff: u8,
    /// Differential reduction per half-revolution
    pub spiral_step: u8,
    /// Lower bound the differential never shrinks past
    pub spiral_floor: u8,
    /// Same-side obstacle hits tolerated before reversing the dodge
    pub stuck_threshold: u8,
    /// Wheel differential of the shallow turn onto a found tape line
    pub align_diff: u8,
    /// Wheel differential of corrections while following the line
    pub follow_diff: u8,
}

impl SearchParams {
    /// Register search parameters with default values
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        store.register("SRCH_SPIRAL_DIFF", ParamValue::Int(10), ParamFlags::empty())?;
        store.register("SRCH_SPIRAL_STEP", ParamValue::Int(3), ParamFlags::empty())?;
        store.register("SRCH_SPIRAL_FLR", ParamValue::Int(1), ParamFlags::empty())?;
        store.register("SRCH_STUCK_MAX", ParamValue::Int(4), ParamFlags::empty())?;
        store.register("SRCH_ALIGN_DIFF", ParamValue::Int(5), ParamFlags::empty())?;
        store.register("SRCH_FOLLOW_DIFF", ParamValue::Int(10), ParamFlags::empty())?;
        Ok(())
    }

    /// Load search parameters from the parameter store
    ///
    /// Missing entries fall back to the registration defaults.
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            spiral_diff: store.get_int("SRCH_SPIRAL_DIFF", 10) as u8,
            spiral_step: store.get_int("SRCH_SPIRAL_STEP", 3) as u8,
            spiral_floor: store.get_int("SRCH_SPIRAL_FLR", 1) as u8,
            stuck_threshold: store.get_int("SRCH_STUCK_MAX", 4) as u8,
            align_diff: store.get_int("SRCH_ALIGN_DIFF", 5) as u8,
            follow_diff: store.get_int("SRCH_FOLLOW_DIFF", 10) as u8,
        }
    }

    /// Widen the spiral by one step, never below the floor.
    #[inline]
    pub fn widen(&self, diff: u8) -> u8 {
        diff.saturating_sub(self.spiral_step).max(self.spiral_floor)
    }
}

impl Default for SearchParams {
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
        SearchParams::register_defaults(&mut store).unwrap();
        assert_eq!(store.len(), 6);
    }

    #[test]
    fn test_from_store_defaults() {
        let params = SearchParams::default();
        assert_eq!(params.spiral_diff, 10);
        assert_eq!(params.stuck_threshold, 4);
        assert_eq!(params.align_diff, 5);
    }

    #[test]
    fn test_widen_stops_at_floor() {
        let params = SearchParams::default();
        let mut diff = params.spiral_diff;
        for _ in 0..20 {
            diff = params.widen(diff);
        }
        assert_eq!(diff, params.spiral_floor);
    }

    #[test]
    fn test_from_store_custom_values() {
        let mut store = ParameterStore::new();
        SearchParams::register_defaults(&mut store).unwrap();
        store.set("SRCH_STUCK_MAX", ParamValue::Int(2)).unwrap();

        let params = SearchParams::from_store(&store);
        assert_eq!(params.stuck_threshold, 2);
    }
}
