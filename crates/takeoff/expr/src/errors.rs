//! Expression error types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors raised while tokenizing, parsing or evaluating an expression
///
/// Positions are 0-based character offsets into the source expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    #[error("Syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("Undefined variable '{name}' at position {position}")]
    UndefinedVariable { name: String, position: usize },

    #[error("Type error at position {position}: '{name}' is a tag and cannot be used in arithmetic")]
    Type { name: String, position: usize },

    #[error("Result {value} is out of range [0, {max}]")]
    Range { value: Decimal, max: Decimal },

    #[error("Arithmetic error at position {position}: {message}")]
    Arithmetic { position: usize, message: String },
}

impl ExprError {
    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn arithmetic(position: usize, message: impl Into<String>) -> Self {
        Self::Arithmetic {
            position,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ExprErrorKind {
        match self {
            Self::Syntax { .. } => ExprErrorKind::Syntax,
            Self::UndefinedVariable { .. } => ExprErrorKind::UndefinedVariable,
            Self::Type { .. } => ExprErrorKind::Type,
            Self::Range { .. } => ExprErrorKind::Range,
            Self::Arithmetic { .. } => ExprErrorKind::Arithmetic,
        }
    }
}

/// Error category, as reported in generation manifests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExprErrorKind {
    #[serde(rename = "SyntaxError")]
    Syntax,
    #[serde(rename = "UndefinedVariableError")]
    UndefinedVariable,
    #[serde(rename = "TypeError")]
    Type,
    #[serde(rename = "RangeError")]
    Range,
    #[serde(rename = "ArithmeticError")]
    Arithmetic,
}

impl std::fmt::Display for ExprErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax => write!(f, "SyntaxError"),
            Self::UndefinedVariable => write!(f, "UndefinedVariableError"),
            Self::Type => write!(f, "TypeError"),
            Self::Range => write!(f, "RangeError"),
            Self::Arithmetic => write!(f, "ArithmeticError"),
        }
    }
}

/// Result type alias for expression operations
pub type ExprResult<T> = Result<T, ExprError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExprError::syntax(3, "unexpected character '$'");
        assert_eq!(
            err.to_string(),
            "Syntax error at position 3: unexpected character '$'"
        );
        assert_eq!(err.kind(), ExprErrorKind::Syntax);

        let err = ExprError::Range {
            value: Decimal::from(-5),
            max: Decimal::from(100000),
        };
        assert_eq!(err.to_string(), "Result -5 is out of range [0, 100000]");
    }

    #[test]
    fn test_kind_serializes_with_error_suffix() {
        let json = serde_json::to_string(&ExprErrorKind::Arithmetic).unwrap();
        assert_eq!(json, "\"ArithmeticError\"");
        assert_eq!(ExprErrorKind::UndefinedVariable.to_string(), "UndefinedVariableError");
    }
}
