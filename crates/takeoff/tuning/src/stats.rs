//! Pattern statistics: clamping, rolling window and median
//!
//! Pure functions; the engine wraps them in an optimistic read-modify-write
//! against the pattern store.

use crate::policy::TuningPolicy;
use chrono::Utc;
use rust_decimal::Decimal;
use takeoff_types::money::round_factor;
use takeoff_types::{PatternKey, TenantId, TuningPattern};

/// `adjusted / original`, falling back to 1.0 when the original is not positive
///
/// An overflowing quotient saturates so the policy clamp still applies.
pub fn raw_factor(original_qty: Decimal, adjusted_qty: Decimal) -> Decimal {
    if original_qty <= Decimal::ZERO {
        return Decimal::ONE;
    }
    adjusted_qty
        .checked_div(original_qty)
        .unwrap_or(if adjusted_qty.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// Median of `values`; even counts average the two middle values
pub fn median(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / Decimal::TWO)
    }
}

/// Fold one clamped observation into the current pattern (or seed a new one)
pub fn observe(
    current: Option<TuningPattern>,
    tenant: &TenantId,
    key: &PatternKey,
    clamped: Decimal,
    policy: &TuningPolicy,
) -> TuningPattern {
    let clamped = round_factor(clamped);

    let Some(mut pattern) = current else {
        return TuningPattern::seeded(tenant.clone(), key.clone(), clamped);
    };

    pattern.recent_factors.push(clamped);
    let overflow = pattern
        .recent_factors
        .len()
        .saturating_sub(policy.window_size);
    if overflow > 0 {
        pattern.recent_factors.drain(..overflow);
    }

    // Window entries are already clamped, so the median is too
    if let Some(m) = median(&pattern.recent_factors) {
        pattern.factor = round_factor(policy.clamp(m));
    }
    pattern.sample_count = pattern
        .sample_count
        .saturating_add(1)
        .min(policy.max_samples());
    pattern.last_updated = Utc::now();
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn key() -> PatternKey {
        "bathroom|basic|tiling".parse().unwrap()
    }

    fn feed(raws: &[&str], policy: &TuningPolicy) -> TuningPattern {
        let tenant = TenantId::new("acme");
        let mut current = None;
        for raw in raws {
            current = Some(observe(current, &tenant, &key(), policy.clamp(d(raw)), policy));
        }
        current.unwrap()
    }

    #[test]
    fn test_raw_factor() {
        assert_eq!(raw_factor(d("8"), d("10")), d("1.25"));
        assert_eq!(raw_factor(d("0"), d("10")), Decimal::ONE);
        assert_eq!(raw_factor(d("-1"), d("10")), Decimal::ONE);
    }

    #[test]
    fn test_raw_factor_saturates_on_overflow() {
        assert_eq!(raw_factor(d("0.01"), Decimal::MAX), Decimal::MAX);
        let policy = TuningPolicy::default();
        assert_eq!(policy.clamp(raw_factor(d("0.01"), Decimal::MAX)), d("1.2"));
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[d("1.1")]), Some(d("1.1")));
        assert_eq!(median(&[d("1.2"), d("0.8"), d("1.1")]), Some(d("1.1")));
        assert_eq!(median(&[d("1.2"), d("0.8"), d("1.1"), d("1.0")]), Some(d("1.05")));
    }

    #[test]
    fn test_first_adjustment_seeds_clamped_factor() {
        let policy = TuningPolicy::default();
        let p = feed(&["1.25"], &policy);
        assert_eq!(p.factor.to_string(), "1.200");
        assert_eq!(p.sample_count, 1);
        assert_eq!(p.recent_factors.len(), 1);
    }

    #[test]
    fn test_median_of_clamped_window() {
        let policy = TuningPolicy::default();
        let p = feed(&["1.25", "0.75", "1.1"], &policy);
        assert_eq!(p.factor, d("1.1"));
        assert_eq!(p.factor.to_string(), "1.100");
        assert_eq!(p.sample_count, 3);
    }

    #[test]
    fn test_window_is_bounded() {
        let policy = TuningPolicy {
            window_size: 4,
            ..TuningPolicy::default()
        };
        let p = feed(&["0.8", "0.8", "0.8", "0.8", "1.2", "1.2", "1.2"], &policy);
        assert_eq!(p.recent_factors.len(), 4);
        assert_eq!(p.sample_count, 4);
        // window is [0.8, 1.2, 1.2, 1.2]
        assert_eq!(p.factor, d("1.2"));
    }
}
