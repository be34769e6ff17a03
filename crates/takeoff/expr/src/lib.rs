//! Sandboxed quantity expressions for Takeoff
//!
//! Rules compute quantities with a deliberately tiny arithmetic language:
//! decimal literals, variables, `+ - * /`, parentheses and six built-in
//! functions (`ceil`, `floor`, `round`, `min`, `max`, `case`). There is no host
//! eval, no member access, and no way to name anything outside the bindings
//! and the function whitelist.
//!
//! # Pipeline
//!
//! ```text
//! source ──► Lexer ──► tokens ──► Parser ──► RPN ──► evaluate(bindings) ──► Decimal
//!            (whitelist,          (shunting-yard,      (checked arithmetic,
//!             length, literal      parens, arity)       2-decimal half-up,
//!             ceiling)                                  range check)
//! ```
//!
//! # Example
//!
//! ```rust
//! use takeoff_expr::{evaluate_str, EvalLimits};
//! use takeoff_types::{Bindings, Decimal};
//!
//! let bindings = Bindings::new().with("areaM2", Decimal::new(155, 1));
//! let qty = evaluate_str("8 + 2*areaM2", &bindings, &EvalLimits::default()).unwrap();
//! assert_eq!(qty.to_string(), "39.00");
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod evaluator;
pub mod expression;
pub mod lexer;
pub mod limits;
pub mod parser;

pub use errors::{ExprError, ExprErrorKind, ExprResult};
pub use evaluator::evaluate;
pub use expression::{evaluate_str, Expression};
pub use lexer::{tokenize, Function, Operator, Token, TokenKind};
pub use limits::EvalLimits;
pub use parser::Parser;

pub use takeoff_types::{Binding, Bindings};
