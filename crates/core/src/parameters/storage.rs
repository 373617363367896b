//! Tunable parameter store
//!
//! One fixed-capacity map from short uppercase names to typed values,
//! shared by every subsystem block. Blocks register their defaults at
//! boot; a host harness may override entries afterwards, and the dirty
//! flag records that the tuning no longer matches the built-ins.

use super::error::ParameterError;
use bitflags::bitflags;
use heapless::index_map::FnvIndexMap;
use heapless::String;

/// Longest accepted parameter name
pub const PARAM_NAME_LEN: usize = 16;

/// Slots in the store (must stay a power of two for the index map)
pub const MAX_PARAMS: usize = 64;

/// Fixed-length parameter name
pub type ParamName = String<PARAM_NAME_LEN>;

bitflags! {
    /// Per-parameter behavior flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ParamFlags: u8 {
        /// Writes after registration are refused
        const READ_ONLY = 0b0000_0001;
    }
}

/// A tunable's current value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Float(f32),
}

/// Bookkeeping recorded at registration, separate from the value
#[derive(Debug, Clone, Copy)]
pub struct ParamMetadata {
    pub flags: ParamFlags,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    value: ParamValue,
    meta: ParamMetadata,
}

/// Fixed-capacity name/value store backing the typed parameter blocks.
pub struct ParameterStore {
    slots: FnvIndexMap<ParamName, Slot, MAX_PARAMS>,
    dirty: bool,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            slots: FnvIndexMap::new(),
            dirty: false,
        }
    }

    fn key(name: &str) -> Result<ParamName, ParameterError> {
        ParamName::try_from(name).map_err(|_| ParameterError::UnknownParameter)
    }

    /// Look up a value by name.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        let key = Self::key(name).ok()?;
        self.slots.get(&key).map(|slot| &slot.value)
    }

    /// Integer view of a parameter, coercing floats and bools; `fallback`
    /// when the name is missing.
    pub fn get_int(&self, name: &str, fallback: i32) -> i32 {
        match self.get(name) {
            Some(ParamValue::Int(v)) => *v,
            Some(ParamValue::Float(v)) => *v as i32,
            Some(ParamValue::Bool(v)) => i32::from(*v),
            None => fallback,
        }
    }

    /// Float view of a parameter, coercing integers and bools.
    pub fn get_float(&self, name: &str, fallback: f32) -> f32 {
        match self.get(name) {
            Some(ParamValue::Float(v)) => *v,
            Some(ParamValue::Int(v)) => *v as f32,
            Some(ParamValue::Bool(v)) => f32::from(u8::from(*v)),
            None => fallback,
        }
    }

    /// Boolean view of a parameter; nonzero numerics read as true.
    pub fn get_bool(&self, name: &str, fallback: bool) -> bool {
        match self.get(name) {
            Some(ParamValue::Bool(v)) => *v,
            Some(ParamValue::Int(v)) => *v != 0,
            Some(ParamValue::Float(v)) => *v != 0.0,
            None => fallback,
        }
    }

    /// Override a registered parameter.
    ///
    /// Only names some block has registered are writable; a write to an
    /// unregistered name fails instead of creating a stray entry.
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<(), ParameterError> {
        let key = Self::key(name)?;
        let slot = self
            .slots
            .get_mut(&key)
            .ok_or(ParameterError::UnknownParameter)?;
        if slot.meta.flags.contains(ParamFlags::READ_ONLY) {
            return Err(ParameterError::ReadOnly);
        }
        slot.value = value;
        self.dirty = true;
        Ok(())
    }

    /// Register a parameter with its default value.
    ///
    /// Re-registering an existing name keeps the stored value, so an
    /// override applied before the owning block boots survives it. The
    /// dirty flag is untouched; defaults are not overrides.
    pub fn register(
        &mut self,
        name: &str,
        default: ParamValue,
        flags: ParamFlags,
    ) -> Result<(), ParameterError> {
        let key = Self::key(name)?;
        if self.slots.contains_key(&key) {
            return Ok(());
        }
        let slot = Slot {
            value: default,
            meta: ParamMetadata { flags },
        };
        self.slots
            .insert(key, slot)
            .map_err(|_| ParameterError::StoreFull)?;
        Ok(())
    }

    /// Flags recorded when the parameter was registered.
    pub fn metadata(&self, name: &str) -> Option<&ParamMetadata> {
        let key = Self::key(name).ok()?;
        self.slots.get(&key).map(|slot| &slot.meta)
    }

    /// All entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParamName, &ParamValue)> {
        self.slots.iter().map(|(name, slot)| (name, &slot.value))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True once any value has been overridden since registration.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_reads_fall_back() {
        let store = ParameterStore::new();
        assert!(store.is_empty());
        assert!(!store.is_dirty());
        assert_eq!(store.get("DRV_NORM_SPEED"), None);
        assert_eq!(store.get_int("DRV_NORM_SPEED", 25), 25);
        assert!(store.get_bool("DRV_INV_RIGHT", true));
    }

    #[test]
    fn test_register_then_get() {
        let mut store = ParameterStore::new();
        store
            .register("TIM_TURN_90", ParamValue::Int(1370), ParamFlags::empty())
            .unwrap();
        assert_eq!(store.get("TIM_TURN_90"), Some(&ParamValue::Int(1370)));
        assert_eq!(store.len(), 1);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_set_requires_registration() {
        let mut store = ParameterStore::new();
        assert_eq!(
            store.set("TIM_TURN_90", ParamValue::Int(1500)),
            Err(ParameterError::UnknownParameter)
        );

        store
            .register("TIM_TURN_90", ParamValue::Int(1370), ParamFlags::empty())
            .unwrap();
        store.set("TIM_TURN_90", ParamValue::Int(1500)).unwrap();
        assert_eq!(store.get("TIM_TURN_90"), Some(&ParamValue::Int(1500)));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_register_is_idempotent_and_keeps_overrides() {
        let mut store = ParameterStore::new();
        store
            .register("SRCH_STUCK_MAX", ParamValue::Int(4), ParamFlags::empty())
            .unwrap();
        store.set("SRCH_STUCK_MAX", ParamValue::Int(2)).unwrap();

        store
            .register("SRCH_STUCK_MAX", ParamValue::Int(4), ParamFlags::empty())
            .unwrap();
        assert_eq!(store.get("SRCH_STUCK_MAX"), Some(&ParamValue::Int(2)));
        assert!(store.is_dirty());
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let mut store = ParameterStore::new();
        store
            .register("HW_REV", ParamValue::Int(3), ParamFlags::READ_ONLY)
            .unwrap();
        assert_eq!(
            store.set("HW_REV", ParamValue::Int(4)),
            Err(ParameterError::ReadOnly)
        );
        assert_eq!(store.get("HW_REV"), Some(&ParamValue::Int(3)));
        assert!(store
            .metadata("HW_REV")
            .is_some_and(|m| m.flags.contains(ParamFlags::READ_ONLY)));
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_typed_getters_coerce() {
        let mut store = ParameterStore::new();
        store
            .register("F", ParamValue::Float(2.5), ParamFlags::empty())
            .unwrap();
        store
            .register("I", ParamValue::Int(7), ParamFlags::empty())
            .unwrap();
        store
            .register("B", ParamValue::Bool(true), ParamFlags::empty())
            .unwrap();

        assert_eq!(store.get_int("F", 0), 2);
        assert_eq!(store.get_float("I", 0.0), 7.0);
        assert_eq!(store.get_int("B", 0), 1);
        assert!(store.get_bool("I", false));
        assert!(!store.get_bool("MISSING", false));
    }

    #[test]
    fn test_overlong_name_rejected() {
        let mut store = ParameterStore::new();
        let long = "A_NAME_WELL_BEYOND_THE_LIMIT";
        assert_eq!(
            store.register(long, ParamValue::Int(0), ParamFlags::empty()),
            Err(ParameterError::UnknownParameter)
        );
        assert_eq!(store.get(long), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_full_after_max_params() {
        use core::fmt::Write;

        let mut store = ParameterStore::new();
        for i in 0..MAX_PARAMS {
            let mut name = ParamName::new();
            write!(name, "PAD_{i:02}").unwrap();
            store
                .register(name.as_str(), ParamValue::Int(i as i32), ParamFlags::empty())
                .unwrap();
        }
        assert_eq!(store.len(), MAX_PARAMS);
        assert_eq!(
            store.register("ONE_TOO_MANY", ParamValue::Int(0), ParamFlags::empty()),
            Err(ParameterError::StoreFull)
        );
    }

    #[test]
    fn test_iter_yields_registration_order() {
        let mut store = ParameterStore::new();
        store
            .register("FIRST", ParamValue::Int(1), ParamFlags::empty())
            .unwrap();
        store
            .register("SECOND", ParamValue::Int(2), ParamFlags::empty())
            .unwrap();
        store
            .register("THIRD", ParamValue::Int(3), ParamFlags::empty())
            .unwrap();

        let names: heapless::Vec<&str, 4> = store.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names.as_slice(), &["FIRST", "SECOND", "THIRD"]);
    }

    #[test]
    fn test_clear_dirty() {
        let mut store = ParameterStore::new();
        store
            .register("TIM_SHORT", ParamValue::Int(50), ParamFlags::empty())
            .unwrap();
        store.set("TIM_SHORT", ParamValue::Int(60)).unwrap();
        assert!(store.is_dirty());
        store.clear_dirty();
        assert!(!store.is_dirty());
    }
}
