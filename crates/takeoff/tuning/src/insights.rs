//! Human-readable views over learned patterns

use crate::policy::TuningPolicy;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use takeoff_types::{
    ConfidenceTier, FinishLevel, PatternKey, PatternState, RoomType, RuleKey, TuningPattern,
};

/// One learned pattern as shown to users
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternInsight {
    pub pattern_key: PatternKey,
    pub room_type: RoomType,
    pub finish_level: FinishLevel,
    pub item_ref: String,
    pub factor: Decimal,
    pub sample_count: u32,
    pub tier: ConfidenceTier,
    /// Smoothed display score; never used to gate application
    pub score: Decimal,
    pub state: PatternState,
    pub interpretation: String,
    pub last_updated: DateTime<Utc>,
}

/// Per-rule rollup of pattern confidence
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub rule_key: RuleKey,
    pub total_items: usize,
    pub high_confidence_items: usize,
    pub medium_confidence_items: usize,
    pub low_confidence_items: usize,
    pub items: Vec<PatternInsight>,
}

/// Describe what a factor means for the quantity users end up with
pub fn interpret(factor: Decimal, tier: ConfidenceTier) -> String {
    let upper = Decimal::new(11, 1);
    let lower = Decimal::new(9, 1);
    let pct = |delta: Decimal| {
        (delta * Decimal::ONE_HUNDRED).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    };

    let direction = if factor > upper {
        format!("raise this quantity by about {}%", pct(factor - Decimal::ONE))
    } else if factor < lower {
        format!("lower this quantity by about {}%", pct(Decimal::ONE - factor))
    } else {
        "keep this quantity within 10%".to_string()
    };

    format!("Users usually {} ({} reliability)", direction, tier)
}

fn to_insight(pattern: TuningPattern, policy: &TuningPolicy) -> PatternInsight {
    let confidence = policy.confidence(pattern.sample_count);
    let tier = confidence.tier();
    PatternInsight {
        room_type: pattern.key.room_type(),
        finish_level: pattern.key.finish_level(),
        item_ref: pattern.key.item_ref().to_string(),
        factor: pattern.factor,
        sample_count: pattern.sample_count,
        tier,
        score: confidence.score(),
        state: PatternState::from_samples(pattern.sample_count, policy.high_confidence_samples),
        interpretation: interpret(pattern.factor, tier),
        last_updated: pattern.last_updated,
        pattern_key: pattern.key,
    }
}

/// Insights sorted by sample count (descending), then pattern key
pub fn build_insights(patterns: Vec<TuningPattern>, policy: &TuningPolicy) -> Vec<PatternInsight> {
    let mut insights: Vec<_> = patterns
        .into_iter()
        .map(|p| to_insight(p, policy))
        .collect();
    insights.sort_by(|a, b| {
        b.sample_count
            .cmp(&a.sample_count)
            .then_with(|| a.pattern_key.cmp(&b.pattern_key))
    });
    insights
}

pub fn summarize_rule(
    rule_key: RuleKey,
    patterns: Vec<TuningPattern>,
    policy: &TuningPolicy,
) -> RuleSummary {
    let items = build_insights(patterns, policy);
    let count = |tier: ConfidenceTier| items.iter().filter(|i| i.tier == tier).count();
    RuleSummary {
        rule_key,
        total_items: items.len(),
        high_confidence_items: count(ConfidenceTier::High),
        medium_confidence_items: count(ConfidenceTier::Medium),
        low_confidence_items: count(ConfidenceTier::Low),
        items,
    }
}
