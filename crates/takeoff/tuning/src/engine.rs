//! Tuning engine: turns logged adjustments into learned factors
//!
//! Each pattern key moves through
//!
//! ```text
//! ABSENT ──► SEEDED (n=1) ──► LEARNING (n < high) ──► CONFIDENT (n >= high)
//! ```
//!
//! Updates are read-modify-write with an optimistic version check. A writer
//! that loses the race re-reads and retries, up to the policy's attempt limit.

use crate::error::{TuningError, TuningResult};
use crate::insights::{build_insights, summarize_rule, PatternInsight, RuleSummary};
use crate::policy::TuningPolicy;
use crate::stats::{observe, raw_factor};
use crate::store::TuningPatternStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use takeoff_types::{PatternKey, PatternState, RuleKey, StoreError, TenantId, TuningPattern};
use tracing::{debug, info};

/// Learns and serves tuning patterns for all tenants
pub struct TuningEngine {
    store: Arc<dyn TuningPatternStore>,
    policy: TuningPolicy,
}

impl TuningEngine {
    pub fn new(store: Arc<dyn TuningPatternStore>, policy: TuningPolicy) -> TuningResult<Self> {
        policy.validate()?;
        Ok(Self { store, policy })
    }

    pub fn policy(&self) -> &TuningPolicy {
        &self.policy
    }

    /// Fold one adjustment into the pattern for `key`
    pub async fn record(
        &self,
        tenant: &TenantId,
        key: &PatternKey,
        original_qty: Decimal,
        adjusted_qty: Decimal,
    ) -> TuningResult<TuningPattern> {
        let raw = raw_factor(original_qty, adjusted_qty);
        let clamped = self.policy.clamp(raw);

        for attempt in 1..=self.policy.max_upsert_attempts {
            let current = self.store.get(tenant, key).await?;
            let expected_version = current.as_ref().map_or(0, |p| p.version);
            let next = observe(current, tenant, key, clamped, &self.policy);

            match self.store.upsert(next, expected_version).await {
                Ok(saved) => {
                    debug!(
                        tenant = %tenant,
                        pattern = %key,
                        raw_factor = %raw,
                        factor = %saved.factor,
                        samples = saved.sample_count,
                        state = %PatternState::from_samples(
                            saved.sample_count,
                            self.policy.high_confidence_samples
                        ),
                        "tuning pattern updated"
                    );
                    return Ok(saved);
                }
                Err(StoreError::VersionConflict { .. }) => {
                    debug!(pattern = %key, attempt, "tuning pattern write conflicted, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(TuningError::Contention {
            key: key.to_string(),
            attempts: self.policy.max_upsert_attempts,
        })
    }

    pub async fn pattern(
        &self,
        tenant: &TenantId,
        key: &PatternKey,
    ) -> TuningResult<Option<TuningPattern>> {
        Ok(self.store.get(tenant, key).await?)
    }

    /// Patterns for the items of one rule, keyed by item ref
    pub async fn patterns_for_rule(
        &self,
        tenant: &TenantId,
        rule_key: &RuleKey,
    ) -> TuningResult<Vec<TuningPattern>> {
        let patterns = self.store.list(tenant).await?;
        Ok(patterns
            .into_iter()
            .filter(|p| &p.key.rule_key() == rule_key)
            .collect())
    }

    /// All learned patterns of a tenant, most-sampled first
    pub async fn insights(&self, tenant: &TenantId) -> TuningResult<Vec<PatternInsight>> {
        let patterns = self.store.list(tenant).await?;
        Ok(build_insights(patterns, &self.policy))
    }

    /// Tier counts and insights for one rule key
    pub async fn rule_summary(
        &self,
        tenant: &TenantId,
        rule_key: &RuleKey,
    ) -> TuningResult<RuleSummary> {
        let patterns = self.patterns_for_rule(tenant, rule_key).await?;
        Ok(summarize_rule(*rule_key, patterns, &self.policy))
    }

    /// Administrative reset; the only way a sample count goes down
    pub async fn reset(&self, tenant: &TenantId, key: &PatternKey) -> TuningResult<bool> {
        let removed = self.store.delete(tenant, key).await?;
        if removed {
            info!(tenant = %tenant, pattern = %key, "tuning pattern reset");
        }
        Ok(removed)
    }
}
