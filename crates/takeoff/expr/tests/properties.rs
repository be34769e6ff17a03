//! Property tests: sandbox guarantees of the expression language.
//!
//! - Any input containing a character outside the whitelist is rejected by the
//!   lexer, before parsing or evaluation.
//! - Well-formed expressions over bound variables always terminate with either
//!   a two-decimal value inside the result range or a typed evaluation error.
//! - Arbitrary strings over the whitelist never panic.

use proptest::prelude::*;
use takeoff_expr::{evaluate_str, tokenize, EvalLimits, ExprError, Expression};
use takeoff_types::{Bindings, Decimal};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_whitelisted(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_ascii_whitespace()
        || matches!(c, '_' | '+' | '-' | '*' | '/' | '(' | ')' | '.' | ',')
}

fn bindings() -> Bindings {
    Bindings::new()
        .with("areaM2", Decimal::new(155, 1))
        .with("hasPlumbingWork", true)
        .with("hasElectricalWork", false)
        .with_tag("roomType", "bathroom")
}

/// Limits roomy enough that generated expressions never hit the size ceilings.
fn roomy_limits() -> EvalLimits {
    EvalLimits {
        max_expression_len: 8192,
        max_tokens: 2048,
        ..EvalLimits::default()
    }
}

fn arb_forbidden_char() -> impl Strategy<Value = char> {
    any::<char>().prop_filter("must be outside the whitelist", |c| !is_whitelisted(*c))
}

fn arb_leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..1000, 0u32..100).prop_map(|(i, f)| format!("{}.{:02}", i, f)),
        (0u32..100).prop_map(|i| i.to_string()),
        Just("areaM2".to_string()),
        Just("hasPlumbingWork".to_string()),
        Just("hasElectricalWork".to_string()),
    ]
}

/// Generate a syntactically valid expression from the whole grammar.
fn arb_expression() -> impl Strategy<Value = String> {
    arb_leaf().prop_recursive(4, 32, 3, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop_oneof![Just('+'), Just('-'), Just('*'), Just('/')],
                inner.clone(),
            )
                .prop_map(|(a, op, b)| format!("({} {} {})", a, op, b)),
            (
                prop_oneof![Just("ceil"), Just("floor"), Just("round")],
                inner.clone(),
            )
                .prop_map(|(f, a)| format!("{}({})", f, a)),
            (prop_oneof![Just("min"), Just("max")], inner.clone(), inner.clone())
                .prop_map(|(f, a, b)| format!("{}({}, {})", f, a, b)),
            (inner.clone(), inner.clone(), inner)
                .prop_map(|(c, a, b)| format!("case({}, {}, {})", c, a, b)),
        ]
    })
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// A single forbidden character anywhere rejects the whole input in the lexer.
    #[test]
    fn forbidden_characters_fail_tokenization(
        prefix in "[a-z0-9 +*/().,_-]{0,12}",
        bad in arb_forbidden_char(),
        suffix in "[a-z0-9 +*/().,_-]{0,12}",
    ) {
        let input = format!("{}{}{}", prefix, bad, suffix);
        let result = tokenize(&input, &EvalLimits::default());
        let is_syntax_error = matches!(result, Err(ExprError::Syntax { .. }));
        prop_assert!(is_syntax_error);

        let result = evaluate_str(&input, &bindings(), &EvalLimits::default());
        let is_syntax_error = matches!(result, Err(ExprError::Syntax { .. }));
        prop_assert!(is_syntax_error);
    }

    /// Well-formed expressions terminate with a bounded two-decimal value or a
    /// runtime (not syntax) error.
    #[test]
    fn well_formed_expressions_terminate_with_two_decimals(expr in arb_expression()) {
        let limits = roomy_limits();
        match evaluate_str(&expr, &bindings(), &limits) {
            Ok(value) => {
                prop_assert_eq!(value.scale(), 2);
                prop_assert!(value >= Decimal::ZERO);
                prop_assert!(value <= limits.max_result);
            }
            Err(ExprError::Arithmetic { .. }) | Err(ExprError::Range { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error for {}: {}", expr, other),
        }
    }

    /// Compiled and one-shot evaluation agree, and repeated evaluation is stable.
    #[test]
    fn compiled_evaluation_is_deterministic(expr in arb_expression()) {
        let limits = roomy_limits();
        let compiled = Expression::compile(&expr, &limits).unwrap();
        let first = compiled.evaluate(&bindings());
        let second = compiled.evaluate(&bindings());
        let direct = evaluate_str(&expr, &bindings(), &limits);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &direct);
    }

    /// Arbitrary strings over the allowed alphabet never panic.
    #[test]
    fn whitelisted_noise_never_panics(input in "[a-zA-Z0-9_ +*/().,-]{0,64}") {
        let _ = evaluate_str(&input, &bindings(), &EvalLimits::default());
    }
}
