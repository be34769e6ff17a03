//! Quote context: which rule key a quote was generated under
//!
//! Adjustments arrive with a quote id and an item ref only. The bound rule key
//! completes the pattern key the tuning engine learns under.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use takeoff_types::{QuoteId, RuleKey, StoreResult, TenantId};
use tokio::sync::RwLock;

/// Quote → rule key bindings
#[async_trait]
pub trait QuoteContextStore: Send + Sync {
    /// Record that `quote_id` was generated under `rule_key`
    async fn bind(&self, tenant: &TenantId, quote_id: &QuoteId, rule_key: RuleKey) -> StoreResult<()>;

    /// Rule key a quote was generated under, if known
    async fn rule_key_for(&self, tenant: &TenantId, quote_id: &QuoteId) -> StoreResult<Option<RuleKey>>;
}

/// In-memory quote context
#[derive(Debug, Default)]
pub struct InMemoryQuoteContext {
    bindings: Arc<RwLock<HashMap<(TenantId, QuoteId), RuleKey>>>,
}

impl InMemoryQuoteContext {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuoteContextStore for InMemoryQuoteContext {
    async fn bind(&self, tenant: &TenantId, quote_id: &QuoteId, rule_key: RuleKey) -> StoreResult<()> {
        let mut bindings = self.bindings.write().await;
        bindings.insert((tenant.clone(), quote_id.clone()), rule_key);
        Ok(())
    }

    async fn rule_key_for(&self, tenant: &TenantId, quote_id: &QuoteId) -> StoreResult<Option<RuleKey>> {
        let bindings = self.bindings.read().await;
        Ok(bindings.get(&(tenant.clone(), quote_id.clone())).copied())
    }
}
