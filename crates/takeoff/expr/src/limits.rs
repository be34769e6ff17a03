//! Resource limits enforced before and after evaluation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default maximum expression length in characters
pub const DEFAULT_MAX_EXPRESSION_LEN: usize = 512;

/// Default maximum number of tokens
pub const DEFAULT_MAX_TOKENS: usize = 256;

/// Bounds applied to every expression
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalLimits {
    /// Longest accepted expression, in characters
    pub max_expression_len: usize,
    /// Most tokens an expression may produce
    pub max_tokens: usize,
    /// Numeric literals must be strictly below this value
    pub max_literal: Decimal,
    /// Largest accepted result; results must also be non-negative
    pub max_result: Decimal,
}

impl Default for EvalLimits {
    fn default() -> Self {
        Self {
            max_expression_len: DEFAULT_MAX_EXPRESSION_LEN,
            max_tokens: DEFAULT_MAX_TOKENS,
            max_literal: Decimal::from(1_000_000),
            max_result: Decimal::from(100_000),
        }
    }
}
