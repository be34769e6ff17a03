//! Evaluator: runs an RPN token sequence against variable bindings

use crate::errors::{ExprError, ExprResult};
use crate::lexer::{Function, Operator, Token, TokenKind};
use crate::limits::EvalLimits;
use rust_decimal::Decimal;
use takeoff_types::money::round2;
use takeoff_types::{Binding, Bindings};

/// Evaluate `rpn` with `bindings`, returning a two-decimal result within limits
pub fn evaluate(rpn: &[Token], bindings: &Bindings, limits: &EvalLimits) -> ExprResult<Decimal> {
    let mut stack: Vec<Decimal> = Vec::with_capacity(rpn.len());

    for token in rpn {
        match &token.kind {
            TokenKind::Number(value) => stack.push(*value),
            TokenKind::Variable(name) => stack.push(lookup(name, token.position, bindings)?),
            TokenKind::Operator(op) => {
                let rhs = pop(&mut stack, token)?;
                let lhs = pop(&mut stack, token)?;
                stack.push(apply_operator(*op, lhs, rhs, token.position)?);
            }
            TokenKind::Function(func) => {
                let mut args = Vec::with_capacity(func.arity());
                for _ in 0..func.arity() {
                    args.push(pop(&mut stack, token)?);
                }
                args.reverse();
                stack.push(apply_function(*func, &args));
            }
            TokenKind::LeftParen | TokenKind::RightParen | TokenKind::Comma => {
                return Err(ExprError::syntax(
                    token.position,
                    format!("unexpected {} in compiled expression", token.kind),
                ));
            }
        }
    }

    let value = match stack.as_slice() {
        [value] => *value,
        [] => return Err(ExprError::syntax(0, "expression produced no value")),
        _ => {
            return Err(ExprError::syntax(
                0,
                format!("expression left {} values on the stack", stack.len()),
            ))
        }
    };

    let result = round2(value);
    if result < Decimal::ZERO || result > limits.max_result {
        return Err(ExprError::Range {
            value: result,
            max: limits.max_result,
        });
    }
    Ok(result)
}

fn lookup(name: &str, position: usize, bindings: &Bindings) -> ExprResult<Decimal> {
    match bindings.get(name) {
        Some(Binding::Number(value)) => Ok(*value),
        Some(Binding::Tag(_)) => Err(ExprError::Type {
            name: name.to_string(),
            position,
        }),
        None => Err(ExprError::UndefinedVariable {
            name: name.to_string(),
            position,
        }),
    }
}

fn pop(stack: &mut Vec<Decimal>, token: &Token) -> ExprResult<Decimal> {
    stack.pop().ok_or_else(|| {
        ExprError::syntax(
            token.position,
            format!("missing operand for {}", token.kind),
        )
    })
}

fn apply_operator(op: Operator, lhs: Decimal, rhs: Decimal, position: usize) -> ExprResult<Decimal> {
    let result = match op {
        Operator::Add => lhs.checked_add(rhs),
        Operator::Sub => lhs.checked_sub(rhs),
        Operator::Mul => lhs.checked_mul(rhs),
        Operator::Div => {
            if rhs.is_zero() {
                return Err(ExprError::arithmetic(position, "division by zero"));
            }
            lhs.checked_div(rhs)
        }
    };
    result.ok_or_else(|| {
        ExprError::arithmetic(
            position,
            format!("overflow in {} {} {}", lhs, op.symbol(), rhs),
        )
    })
}

fn apply_function(func: Function, args: &[Decimal]) -> Decimal {
    match (func, args) {
        // ceil/floor see the value at two decimals first, so 5.1666.. ceils from 5.17
        (Function::Ceil, [x]) => round2(*x).ceil(),
        (Function::Floor, [x]) => round2(*x).floor(),
        (Function::Round, [x]) => round2(*x),
        (Function::Min, [a, b]) => (*a).min(*b),
        (Function::Max, [a, b]) => (*a).max(*b),
        (Function::Case, [cond, then, otherwise]) => {
            if cond.is_zero() {
                *otherwise
            } else {
                *then
            }
        }
        // Arity is fixed by the parser and the pops above
        _ => Decimal::ZERO,
    }
}
