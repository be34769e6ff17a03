//! Tuning policy: clamp bounds, window size and confidence thresholds

use crate::error::{TuningError, TuningResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use takeoff_types::Confidence;

/// Default lower clamp bound for learned factors
pub const DEFAULT_MIN_FACTOR: Decimal = Decimal::from_parts(8, 0, 0, false, 1);

/// Default upper clamp bound for learned factors
pub const DEFAULT_MAX_FACTOR: Decimal = Decimal::from_parts(12, 0, 0, false, 1);

/// Default rolling window of recent factors per pattern
pub const DEFAULT_WINDOW_SIZE: usize = 50;

/// Default samples required before a factor is applied
pub const DEFAULT_MIN_SAMPLES: u32 = 3;

/// Default samples at which confidence becomes high
pub const DEFAULT_HIGH_CONFIDENCE_SAMPLES: u32 = 10;

/// Default attempts for an optimistic pattern write
pub const DEFAULT_MAX_UPSERT_ATTEMPTS: u32 = 5;

/// How adjustments become factors and when factors are applied
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningPolicy {
    pub min_factor: Decimal,
    pub max_factor: Decimal,
    /// Most recent clamped factors kept per pattern; also caps the sample count
    pub window_size: usize,
    /// Gate: factors apply only at or above this sample count
    pub min_samples: u32,
    pub high_confidence_samples: u32,
    pub max_upsert_attempts: u32,
}

impl Default for TuningPolicy {
    fn default() -> Self {
        Self {
            min_factor: DEFAULT_MIN_FACTOR,
            max_factor: DEFAULT_MAX_FACTOR,
            window_size: DEFAULT_WINDOW_SIZE,
            min_samples: DEFAULT_MIN_SAMPLES,
            high_confidence_samples: DEFAULT_HIGH_CONFIDENCE_SAMPLES,
            max_upsert_attempts: DEFAULT_MAX_UPSERT_ATTEMPTS,
        }
    }
}

impl TuningPolicy {
    pub fn validate(&self) -> TuningResult<()> {
        if self.min_factor <= Decimal::ZERO
            || self.min_factor > Decimal::ONE
            || self.max_factor < Decimal::ONE
        {
            return Err(TuningError::InvalidPolicy(format!(
                "factor bounds must satisfy 0 < min <= 1 <= max, got [{}, {}]",
                self.min_factor, self.max_factor
            )));
        }
        if self.window_size == 0 {
            return Err(TuningError::InvalidPolicy(
                "window_size must be at least 1".into(),
            ));
        }
        if self.high_confidence_samples < self.min_samples {
            return Err(TuningError::InvalidPolicy(format!(
                "high_confidence_samples ({}) must not be below min_samples ({})",
                self.high_confidence_samples, self.min_samples
            )));
        }
        if self.max_upsert_attempts == 0 {
            return Err(TuningError::InvalidPolicy(
                "max_upsert_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn clamp(&self, factor: Decimal) -> Decimal {
        factor.clamp(self.min_factor, self.max_factor)
    }

    pub fn confidence(&self, sample_count: u32) -> Confidence {
        Confidence::with_thresholds(sample_count, self.min_samples, self.high_confidence_samples)
    }

    pub fn max_samples(&self) -> u32 {
        u32::try_from(self.window_size).unwrap_or(u32::MAX)
    }
}
