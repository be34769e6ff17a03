//! Adjustment log entries: user corrections to generated quantities

use crate::{AdjustmentId, ItemKind, QuoteId, TenantId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One recorded correction. Entries are append-only and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLogEntry {
    pub id: AdjustmentId,
    pub tenant: TenantId,
    pub quote_id: QuoteId,
    pub item_ref: String,
    pub item_kind: ItemKind,
    pub original_qty: Decimal,
    pub adjusted_qty: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_unit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted_unit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AdjustmentLogEntry {
    pub fn new(
        tenant: TenantId,
        quote_id: QuoteId,
        item_kind: ItemKind,
        item_ref: impl Into<String>,
        original_qty: Decimal,
        adjusted_qty: Decimal,
    ) -> Self {
        Self {
            id: AdjustmentId::generate(),
            tenant,
            quote_id,
            item_ref: item_ref.into(),
            item_kind,
            original_qty,
            adjusted_qty,
            original_unit_price: None,
            adjusted_unit_price: None,
            reason: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_prices(mut self, original: Option<Decimal>, adjusted: Option<Decimal>) -> Self {
        self.original_unit_price = original;
        self.adjusted_unit_price = adjusted;
        self
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason;
        self
    }
}
