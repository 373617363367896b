//! Parameter store errors
//!
//! Writes can fail three ways: the name was never registered, the backing
//! map ran out of slots, or the entry is locked. Reads never fail; lookups
//! that miss fall back to the caller's default instead.

/// Why a parameter registration or write was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterError {
    /// No parameter registered under this name (or the name exceeds the
    /// fixed-length key the store uses)
    UnknownParameter,
    /// All slots taken; raise `MAX_PARAMS` if a new block needs room
    StoreFull,
    /// Entry carries `ParamFlags::READ_ONLY`
    ReadOnly,
}

impl core::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParameterError::UnknownParameter => write!(f, "no such parameter"),
            ParameterError::StoreFull => write!(f, "no free parameter slots"),
            ParameterError::ReadOnly => write!(f, "parameter is locked"),
        }
    }
}
