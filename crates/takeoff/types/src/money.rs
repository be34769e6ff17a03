//! Decimal rounding helpers
//!
//! Quantities and amounts leave the engine with exactly two decimals, rounded
//! half-up. Tuning factors are kept at three decimals.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places for quantities and monetary amounts
pub const MONEY_SCALE: u32 = 2;

/// Decimal places for stored tuning factors
pub const FACTOR_SCALE: u32 = 3;

/// Round half-up to `scale` places and pin the scale so the value always
/// renders with exactly that many decimals.
pub fn round_to(value: Decimal, scale: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

/// Round a quantity or amount to two decimals, half-up
pub fn round2(value: Decimal) -> Decimal {
    round_to(value, MONEY_SCALE)
}

/// Round a tuning factor to three decimals, half-up
pub fn round_factor(value: Decimal) -> Decimal {
    round_to(value, FACTOR_SCALE)
}

/// `value * (1 + pct / 100)` rounded to two decimals
pub fn apply_percentage(value: Decimal, pct: Decimal) -> Decimal {
    round2(value * (Decimal::ONE + pct / Decimal::ONE_HUNDRED))
}
