//! Tuning patterns and confidence
//!
//! A [`TuningPattern`] holds the learned correction factor for one
//! `(tenant, pattern key)`. [`Confidence`] derives both the discrete tier that
//! gates application and the smoothed score shown in insights from the same
//! sample count.

use crate::money::round_factor;
use crate::{PatternKey, TenantId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Samples needed before a pattern reaches the medium tier
pub const DEFAULT_MEDIUM_SAMPLES: u32 = 3;

/// Samples needed before a pattern reaches the high tier
pub const DEFAULT_HIGH_SAMPLES: u32 = 10;

// ── Confidence ───────────────────────────────────────────────────────

/// Coarse confidence label derived from sample count
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Confidence in a learned factor, computed from its sample count
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Confidence {
    sample_count: u32,
    medium_at: u32,
    high_at: u32,
}

impl Confidence {
    pub fn new(sample_count: u32) -> Self {
        Self::with_thresholds(sample_count, DEFAULT_MEDIUM_SAMPLES, DEFAULT_HIGH_SAMPLES)
    }

    pub fn with_thresholds(sample_count: u32, medium_at: u32, high_at: u32) -> Self {
        Self {
            sample_count,
            medium_at,
            high_at: high_at.max(medium_at),
        }
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Discrete tier; this is what gates tuning application
    pub fn tier(&self) -> ConfidenceTier {
        if self.sample_count >= self.high_at {
            ConfidenceTier::High
        } else if self.sample_count >= self.medium_at {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    /// Smoothed score for display: 0.70 at one sample, +0.05 per further
    /// sample, capped at 0.95. Zero samples score 0.
    pub fn score(&self) -> Decimal {
        if self.sample_count == 0 {
            return Decimal::ZERO;
        }
        let start = Decimal::new(70, 2);
        let step = Decimal::new(5, 2);
        let cap = Decimal::new(95, 2);
        let steps = Decimal::from(self.sample_count.saturating_sub(1).min(100));
        (start + step * steps).min(cap)
    }
}

// ── Pattern ──────────────────────────────────────────────────────────

/// Lifecycle of a pattern key as samples accumulate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternState {
    Absent,
    Seeded,
    Learning,
    Confident,
}

impl PatternState {
    pub fn from_samples(sample_count: u32, high_at: u32) -> Self {
        match sample_count {
            0 => Self::Absent,
            1 => Self::Seeded,
            n if n < high_at => Self::Learning,
            _ => Self::Confident,
        }
    }
}

impl std::fmt::Display for PatternState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Seeded => write!(f, "seeded"),
            Self::Learning => write!(f, "learning"),
            Self::Confident => write!(f, "confident"),
        }
    }
}

/// Learned correction factor for one pattern key of one tenant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningPattern {
    pub tenant: TenantId,
    pub key: PatternKey,
    /// Median of `recent_factors`, three decimals, always within the clamp bounds
    pub factor: Decimal,
    /// Number of samples contributing, capped at the window size
    pub sample_count: u32,
    /// Most recent clamped factors, oldest first
    pub recent_factors: Vec<Decimal>,
    /// Optimistic concurrency version, bumped on every write
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl TuningPattern {
    /// First observation for a key
    pub fn seeded(tenant: TenantId, key: PatternKey, clamped_factor: Decimal) -> Self {
        let now = Utc::now();
        Self {
            tenant,
            key,
            factor: round_factor(clamped_factor),
            sample_count: 1,
            recent_factors: vec![clamped_factor],
            version: 0,
            created_at: now,
            last_updated: now,
        }
    }

    pub fn confidence(&self) -> Confidence {
        Confidence::new(self.sample_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Confidence::new(0).tier(), ConfidenceTier::Low);
        assert_eq!(Confidence::new(2).tier(), ConfidenceTier::Low);
        assert_eq!(Confidence::new(3).tier(), ConfidenceTier::Medium);
        assert_eq!(Confidence::new(9).tier(), ConfidenceTier::Medium);
        assert_eq!(Confidence::new(10).tier(), ConfidenceTier::High);
        assert_eq!(Confidence::new(50).tier(), ConfidenceTier::High);
    }

    #[test]
    fn test_score_progression() {
        assert_eq!(Confidence::new(0).score(), Decimal::ZERO);
        assert_eq!(Confidence::new(1).score(), Decimal::new(70, 2));
        assert_eq!(Confidence::new(3).score(), Decimal::new(80, 2));
        assert_eq!(Confidence::new(6).score(), Decimal::new(95, 2));
        assert_eq!(Confidence::new(40).score(), Decimal::new(95, 2));
    }

    #[test]
    fn test_pattern_state() {
        assert_eq!(PatternState::from_samples(0, 10), PatternState::Absent);
        assert_eq!(PatternState::from_samples(1, 10), PatternState::Seeded);
        assert_eq!(PatternState::from_samples(9, 10), PatternState::Learning);
        assert_eq!(PatternState::from_samples(10, 10), PatternState::Confident);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(ConfidenceTier::Low < ConfidenceTier::Medium);
        assert!(ConfidenceTier::Medium < ConfidenceTier::High);
    }
}
