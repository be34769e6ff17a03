//! Evaluate a single expression

use crate::output::{print_json, OutputFormat};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use takeoff_expr::{evaluate_str, EvalLimits};
use takeoff_types::{Binding, Bindings};

/// Parse `name=value`; numbers and `true`/`false` bind as numbers, anything else as a tag
pub fn parse_binding(s: &str) -> Result<(String, Binding), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", s));
    }

    let value = value.trim();
    let binding = match value {
        "true" => Binding::from(true),
        "false" => Binding::from(false),
        _ => match Decimal::from_str(value) {
            Ok(n) => Binding::Number(n),
            Err(_) => Binding::Tag(value.to_string()),
        },
    };
    Ok((name.to_string(), binding))
}

pub fn execute(
    expression: &str,
    vars: Vec<(String, Binding)>,
    limits: &EvalLimits,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let bindings: Bindings = vars.into_iter().collect();

    match evaluate_str(expression, &bindings, limits) {
        Ok(value) => match format {
            OutputFormat::Json => print_json(&json!({
                "expression": expression,
                "result": value,
            })),
            OutputFormat::Table => {
                println!("{}", value);
                Ok(())
            }
        },
        Err(e) => {
            if let OutputFormat::Json = format {
                print_json(&json!({
                    "expression": expression,
                    "error": e.kind(),
                    "message": e.to_string(),
                }))?;
            }
            Err(anyhow::anyhow!("{}: {}", e.kind(), e))
        }
    }
}
