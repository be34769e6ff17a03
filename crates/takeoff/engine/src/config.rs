//! Engine configuration
//!
//! Layered as defaults, then an optional file, then `TAKEOFF_*` environment
//! variables (nested keys separated by `__`, e.g. `TAKEOFF_TUNING__MIN_SAMPLES=5`).

use crate::error::{EngineError, EngineResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use takeoff_expr::EvalLimits;
use takeoff_tuning::TuningPolicy;

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Expression resource limits
    #[serde(default)]
    pub limits: EvalLimits,

    /// Factor clamping, window and confidence gates
    #[serde(default)]
    pub tuning: TuningPolicy,

    /// Which user edits count as adjustments
    #[serde(default)]
    pub adjustments: AdjustmentPolicy,

    /// Pricing fallbacks
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Logging output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Threshold for logging a user edit as an adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentPolicy {
    /// Relative change `|new - old| / old` at or above which an edit is logged
    #[serde(default = "default_min_relative_change")]
    pub min_relative_change: Decimal,
}

fn default_min_relative_change() -> Decimal {
    Decimal::new(1, 2)
}

impl Default for AdjustmentPolicy {
    fn default() -> Self {
        Self {
            min_relative_change: default_min_relative_change(),
        }
    }
}

impl AdjustmentPolicy {
    /// Whether an edit from `original` to `adjusted` is worth logging
    pub fn is_significant(&self, original: Decimal, adjusted: Decimal) -> bool {
        if original <= Decimal::ZERO {
            return adjusted != original;
        }
        // Overflow means the edit dwarfs the original
        match adjusted
            .checked_sub(original)
            .and_then(|delta| delta.abs().checked_div(original))
        {
            Some(change) => change >= self.min_relative_change,
            None => true,
        }
    }
}

/// Fallbacks used when the catalog is incomplete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// VAT in percent when the price profile is unknown
    #[serde(default = "default_vat_rate")]
    pub default_vat_rate: Decimal,

    /// Currency reported when the price profile is unknown
    #[serde(default = "default_currency")]
    pub default_currency: String,

    #[serde(default = "default_labor_unit")]
    pub default_labor_unit: String,

    #[serde(default = "default_material_unit")]
    pub default_material_unit: String,
}

fn default_vat_rate() -> Decimal {
    Decimal::from(25)
}

fn default_currency() -> String {
    "SEK".to_string()
}

fn default_labor_unit() -> String {
    "hour".to_string()
}

fn default_material_unit() -> String {
    "pcs".to_string()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_vat_rate: default_vat_rate(),
            default_currency: default_currency(),
            default_labor_unit: default_labor_unit(),
            default_material_unit: default_material_unit(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> EngineResult<Self> {
        let config = Self::build(path).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn build(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&EngineConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TAKEOFF")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> EngineResult<()> {
        self.tuning
            .validate()
            .map_err(|e| EngineError::Config(e.to_string()))?;

        if self.limits.max_expression_len == 0 || self.limits.max_tokens == 0 {
            return Err(EngineError::Config(
                "limits.max_expression_len and limits.max_tokens must be positive".into(),
            ));
        }
        if self.limits.max_result <= Decimal::ZERO || self.limits.max_literal <= Decimal::ZERO {
            return Err(EngineError::Config(
                "limits.max_result and limits.max_literal must be positive".into(),
            ));
        }
        if self.adjustments.min_relative_change < Decimal::ZERO {
            return Err(EngineError::Config(
                "adjustments.min_relative_change must not be negative".into(),
            ));
        }
        if self.pricing.default_vat_rate < Decimal::ZERO {
            return Err(EngineError::Config(
                "pricing.default_vat_rate must not be negative".into(),
            ));
        }
        Ok(())
    }
}
