//! Tunable parameter blocks and their backing store
//!
//! Every tunable the behavior layer consumes lives here: calibrated turn
//! times, debounce thresholds, servo positions, drive polarity. Each
//! subsystem defines a parameter block with `register_defaults` and
//! `from_store`; [`Tuning`] bundles the typed snapshots the executive hands
//! to every chart dispatch.

pub mod debounce;
pub mod drive;
pub mod error;
pub mod search;
pub mod storage;
pub mod timing;
pub mod unload;

pub use debounce::DebounceParams;
pub use drive::DriveParams;
pub use error::ParameterError;
pub use search::SearchParams;
pub use storage::{ParamFlags, ParamMetadata, ParamValue, ParameterStore};
pub use storage::{MAX_PARAMS, PARAM_NAME_LEN};
pub use timing::TimingParams;
pub use unload::UnloadParams;

/// All tunable parameters as one typed snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    pub drive: DriveParams,
    pub debounce: DebounceParams,
    pub timing: TimingParams,
    pub search: SearchParams,
    pub unload: UnloadParams,
}

impl Tuning {
    /// Register every parameter block's defaults.
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        DriveParams::register_defaults(store)?;
        DebounceParams::register_defaults(store)?;
        TimingParams::register_defaults(store)?;
        SearchParams::register_defaults(store)?;
        UnloadParams::register_defaults(store)?;
        Ok(())
    }

    /// Build the typed snapshot from the store.
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            drive: DriveParams::from_store(store),
            debounce: DebounceParams::from_store(store),
            timing: TimingParams::from_store(store),
            search: SearchParams::from_store(store),
            unload: UnloadParams::from_store(store),
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::from_store(&ParameterStore::new())
    }
}
