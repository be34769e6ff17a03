//! Generation report: items, totals and the failure manifest

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use takeoff_types::{GeneratedItem, ItemKind, ProfileId, QuoteId, QuoteTotals, RuleKey, TenantId};

/// Where an item degraded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Evaluation,
    Pricing,
}

/// One entry of the failure manifest
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub kind: ItemKind,
    pub item_ref: String,
    pub stage: FailureStage,
    /// `SyntaxError`, `ArithmeticError`, ..., or `CatalogMiss` / `CatalogUnavailable`
    pub error: String,
    pub message: String,
}

/// Full result of a generation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub tenant: TenantId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<QuoteId>,
    pub rule_key: RuleKey,
    pub profile: ProfileId,
    pub currency: String,
    pub vat_rate: Decimal,
    pub items: Vec<GeneratedItem>,
    pub failures: Vec<GenerationFailure>,
    pub totals: QuoteTotals,
    /// False when the tuning store could not be read and items are untuned
    pub tuning_available: bool,
}

impl GenerationReport {
    pub fn item(&self, item_ref: &str) -> Option<&GeneratedItem> {
        self.items.iter().find(|i| i.item_ref == item_ref)
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn tuned_count(&self) -> usize {
        self.items.iter().filter(|i| i.tuning.applied).count()
    }
}
