//! Tuning error types

use takeoff_types::{StoreError, TypesError};

/// Errors from the tuning engine
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid key: {0}")]
    InvalidKey(#[from] TypesError),

    #[error("Gave up updating pattern '{key}' after {attempts} conflicting writes")]
    Contention { key: String, attempts: u32 },

    #[error("Invalid tuning policy: {0}")]
    InvalidPolicy(String),
}

/// Result type alias for tuning operations
pub type TuningResult<T> = Result<T, TuningError>;
