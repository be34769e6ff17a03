//! Compiled expressions

use crate::errors::ExprResult;
use crate::evaluator::evaluate;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::limits::EvalLimits;
use crate::parser::Parser;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use takeoff_types::Bindings;

/// An expression that has been tokenized and converted to RPN
///
/// Compiling once and evaluating many times skips re-tokenizing; results are
/// identical to evaluating the source string directly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    source: String,
    rpn: Vec<Token>,
    limits: EvalLimits,
}

impl Expression {
    pub fn compile(source: &str, limits: &EvalLimits) -> ExprResult<Self> {
        let tokens = tokenize(source, limits)?;
        let rpn = Parser::parse(tokens)?;
        Ok(Self {
            source: source.to_string(),
            rpn,
            limits: limits.clone(),
        })
    }

    pub fn evaluate(&self, bindings: &Bindings) -> ExprResult<Decimal> {
        evaluate(&self.rpn, bindings, &self.limits)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn rpn(&self) -> &[Token] {
        &self.rpn
    }

    /// Variable names referenced by the expression, sorted
    pub fn variables(&self) -> BTreeSet<&str> {
        self.rpn
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Variable(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Tokenize, parse and evaluate in one step
pub fn evaluate_str(source: &str, bindings: &Bindings, limits: &EvalLimits) -> ExprResult<Decimal> {
    Expression::compile(source, limits)?.evaluate(bindings)
}
