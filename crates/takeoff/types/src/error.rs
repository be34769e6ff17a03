//! Error types shared across takeoff crates

/// Errors raised while constructing or validating domain values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypesError {
    #[error("Invalid rule key '{key}': {message}")]
    InvalidRuleKey { key: String, message: String },

    #[error("Invalid pattern key '{key}': {message}")]
    InvalidPatternKey { key: String, message: String },

    #[error("Unknown room type: '{0}'")]
    UnknownRoomType(String),

    #[error("Unknown finish level: '{0}'")]
    UnknownFinishLevel(String),

    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),
}

/// Result type alias for domain value construction
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors reported by storage collaborators
///
/// Stores are external to the engine; these variants describe the failures the
/// engine knows how to react to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Version conflict on '{key}': expected {expected}, found {actual}")]
    VersionConflict {
        key: String,
        expected: u64,
        actual: u64,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
