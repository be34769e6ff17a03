//! Tuning applier: confidence-gated correction of generated quantities
//!
//! Pure and idempotent. Application always starts from the item's untuned
//! `base_qty`, so re-applying the same pattern gives the same result.

use crate::policy::TuningPolicy;
use takeoff_types::{ConfidenceTier, GeneratedItem, TuningAnnotation, TuningPattern};

/// Apply `pattern` to `item` if it has enough samples
pub fn apply(
    item: &GeneratedItem,
    pattern: Option<&TuningPattern>,
    policy: &TuningPolicy,
) -> GeneratedItem {
    let mut tuned = item.clone();
    tuned.set_qty(item.base_qty);

    tuned.tuning = match pattern {
        Some(p) if p.sample_count >= policy.min_samples => {
            let factor = policy.clamp(p.factor);
            tuned.set_qty(item.base_qty * factor);
            TuningAnnotation {
                applied: true,
                factor: Some(factor),
                tier: policy.confidence(p.sample_count).tier(),
                sample_count: p.sample_count,
            }
        }
        Some(p) => TuningAnnotation {
            applied: false,
            factor: Some(p.factor),
            tier: ConfidenceTier::Low,
            sample_count: p.sample_count,
        },
        None => TuningAnnotation::untuned(),
    };

    tuned
}
