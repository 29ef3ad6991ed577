//! Error types
//!
//! The simulation itself never fails; only loading and saving preferences and
//! leaderboards can, plus parsing user-supplied names.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// Stored data could not be parsed or serialized
    #[error("invalid stored data: {0}")]
    Json(#[from] serde_json::Error),

    /// No LocalStorage (native build, private browsing, denied access)
    #[error("storage unavailable")]
    Unavailable,

    /// The browser refused a read or write
    #[error("storage access failed for key {key}")]
    Access { key: &'static str },
}

/// A difficulty name that matches no level
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty: {0}")]
pub struct ParseDifficultyError(pub String);
