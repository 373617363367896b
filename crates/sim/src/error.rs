//! Simulator error types

/// Errors produced while loading an arena description.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// I/O error reading an arena file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Arena file is not valid JSON
    #[error("arena parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arena parsed but describes an unusable layout
    #[error("invalid arena: {0}")]
    Arena(String),
}
