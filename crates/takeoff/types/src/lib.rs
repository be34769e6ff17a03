//! Takeoff domain types
//!
//! Shared vocabulary for the rule engine and the auto-tuning engine:
//!
//! - Identifiers: [`TenantId`], [`QuoteId`], [`ProfileId`], [`AdjustmentId`]
//! - Keys: [`RuleKey`] (`room|finish`) and [`PatternKey`] (`room|finish|item`)
//! - Inputs: [`ProjectRequirements`] and the variable [`Bindings`] derived from them
//! - Rules: [`GenerationRule`], one per tenant and rule key
//! - Outputs: [`GeneratedItem`] with pricing confidence and tuning annotation
//! - Learning: [`AdjustmentLogEntry`], [`TuningPattern`], [`Confidence`]
//!
//! Every quantity and amount is a [`rust_decimal::Decimal`]. Use [`money::round2`]
//! to bring a value to the canonical two-decimal form before it leaves the engine.

#![deny(unsafe_code)]

pub mod adjustment;
pub mod bindings;
pub mod error;
pub mod ids;
pub mod item;
pub mod keys;
pub mod money;
pub mod pricing;
pub mod requirements;
pub mod rule;
pub mod tuning;

pub use adjustment::AdjustmentLogEntry;
pub use bindings::{Binding, Bindings};
pub use error::{StoreError, StoreResult, TypesError, TypesResult};
pub use ids::{AdjustmentId, ProfileId, QuoteId, TenantId};
pub use item::{GeneratedItem, ItemKind, PriceConfidence, TuningAnnotation};
pub use keys::{FinishLevel, PatternKey, RoomType, RuleKey};
pub use pricing::{LaborRate, Material, PriceProfile, QuoteTotals};
pub use requirements::ProjectRequirements;
pub use rule::GenerationRule;
pub use tuning::{Confidence, ConfidenceTier, PatternState, TuningPattern};

pub use rust_decimal::Decimal;
