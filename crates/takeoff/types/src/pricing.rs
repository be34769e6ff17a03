//! Pricing catalog records and quote totals

use crate::money::{apply_percentage, round2};
use crate::{GeneratedItem, ProfileId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_currency() -> String {
    "SEK".into()
}

fn default_vat_rate() -> Decimal {
    Decimal::from(25)
}

fn default_labor_unit() -> String {
    "hour".into()
}

fn default_material_unit() -> String {
    "pcs".into()
}

fn default_markup_pct() -> Decimal {
    Decimal::from(20)
}

/// Named price profile: currency and VAT applied to a quote
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceProfile {
    pub id: ProfileId,
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// VAT in percent
    #[serde(default = "default_vat_rate")]
    pub vat_rate: Decimal,
}

impl PriceProfile {
    pub fn new(id: ProfileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            currency: default_currency(),
            vat_rate: default_vat_rate(),
        }
    }
}

/// Hourly (or per-unit) labor price
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaborRate {
    pub code: String,
    pub description: String,
    #[serde(default = "default_labor_unit")]
    pub unit: String,
    pub unit_price: Decimal,
}

/// Material with purchase cost and markup
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub sku: String,
    pub name: String,
    #[serde(default = "default_material_unit")]
    pub unit: String,
    pub unit_cost: Decimal,
    /// Markup in percent over unit cost
    #[serde(default = "default_markup_pct")]
    pub markup_pct: Decimal,
}

impl Material {
    /// Selling price: `unit_cost * (1 + markup_pct / 100)`, two decimals
    pub fn unit_price(&self) -> Decimal {
        apply_percentage(self.unit_cost, self.markup_pct)
    }
}

/// Subtotal, VAT and grand total of a set of items
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub subtotal: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

impl QuoteTotals {
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a GeneratedItem>, vat_rate: Decimal) -> Self {
        let subtotal = round2(items.into_iter().map(|i| i.line_total).sum());
        let vat = round2(subtotal * vat_rate / Decimal::ONE_HUNDRED);
        Self {
            subtotal,
            vat,
            total: round2(subtotal + vat),
        }
    }
}
