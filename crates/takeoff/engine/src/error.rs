//! Engine error types

use takeoff_expr::ExprError;
use takeoff_tuning::TuningError;
use takeoff_types::{RuleKey, StoreError, TenantId, TypesError};

/// Errors surfaced by the generation engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(
        "No generation rule '{key}' for tenant '{tenant}'. \
         Create it with put_rule using the roomType|finishLevel key format, e.g. '{key}'"
    )]
    RuleNotFound { tenant: TenantId, key: RuleKey },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid expression for {kind} item '{item_ref}': {source}")]
    InvalidExpression {
        kind: String,
        item_ref: String,
        #[source]
        source: ExprError,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] TypesError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Tuning error: {0}")]
    Tuning(#[from] TuningError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid seed data: {0}")]
    Seed(String),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
