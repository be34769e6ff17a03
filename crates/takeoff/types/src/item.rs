//! Generated line items

use crate::money::round2;
use crate::ConfidenceTier;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of quote line item
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Labor,
    Material,
    Custom,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Labor => write!(f, "labor"),
            Self::Material => write!(f, "material"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Whether the item's quantity and price came out clean
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceConfidence {
    /// Expression evaluated and the catalog resolved a price
    High,
    /// Evaluation failed or the catalog had no entry
    Low,
}

/// How tuning treated an item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningAnnotation {
    /// True when a learned factor changed the quantity
    pub applied: bool,
    /// Factor of the matching pattern, if one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor: Option<Decimal>,
    pub tier: ConfidenceTier,
    pub sample_count: u32,
}

impl TuningAnnotation {
    /// No pattern, or pattern below the application gate
    pub fn untuned() -> Self {
        Self {
            applied: false,
            factor: None,
            tier: ConfidenceTier::Low,
            sample_count: 0,
        }
    }
}

impl Default for TuningAnnotation {
    fn default() -> Self {
        Self::untuned()
    }
}

/// One generated quote line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedItem {
    pub kind: ItemKind,
    /// Labor code or material SKU
    #[serde(rename = "ref")]
    pub item_ref: String,
    pub description: String,
    /// Final quantity after tuning
    pub qty: Decimal,
    /// Quantity as evaluated, before any tuning
    pub base_qty: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub confidence: PriceConfidence,
    pub tuning: TuningAnnotation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl GeneratedItem {
    pub fn new(
        kind: ItemKind,
        item_ref: impl Into<String>,
        description: impl Into<String>,
        qty: Decimal,
        unit: impl Into<String>,
        unit_price: Decimal,
    ) -> Self {
        let qty = round2(qty);
        let unit_price = round2(unit_price);
        Self {
            kind,
            item_ref: item_ref.into(),
            description: description.into(),
            qty,
            base_qty: qty,
            unit: unit.into(),
            unit_price,
            line_total: round2(qty * unit_price),
            confidence: PriceConfidence::High,
            tuning: TuningAnnotation::untuned(),
            warning: None,
        }
    }

    pub fn with_confidence(mut self, confidence: PriceConfidence) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self.confidence = PriceConfidence::Low;
        self
    }

    /// Replace the final quantity and recompute the line total
    pub fn set_qty(&mut self, qty: Decimal) {
        self.qty = round2(qty);
        self.line_total = round2(self.qty * self.unit_price);
    }
}
