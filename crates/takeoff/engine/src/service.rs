//! Service facade: generation, adjustment recording and insights
//!
//! ```text
//! generate ──► QuantityGenerator ──► TuningEngine::patterns_for_rule ──► apply ──► totals
//!                                         (fail-open: untuned on error)
//!
//! record_adjustment ──► threshold ──► log.append ──► quotes.rule_key_for ──► TuningEngine::record
//! ```

use crate::catalog::{InMemoryCatalog, PricingCatalog};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::generator::QuantityGenerator;
use crate::quotes::{InMemoryQuoteContext, QuoteContextStore};
use crate::report::{FailureStage, GenerationReport};
use crate::rules::{InMemoryRuleStore, RuleStore};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use takeoff_expr::Expression;
use takeoff_tuning::{
    apply, AdjustmentLogStore, InMemoryPatternStore, MemoryAdjustmentLog, PatternInsight,
    RuleSummary, TuningEngine, TuningPatternStore,
};
use takeoff_types::{
    AdjustmentId, AdjustmentLogEntry, Bindings, ConfidenceTier, GenerationRule, ItemKind,
    PatternKey, ProfileId, ProjectRequirements, QuoteId, QuoteTotals, RuleKey, TenantId,
    TuningPattern, TypesError,
};
use tracing::{debug, info, warn};

/// Collaborators the service is wired from
#[derive(Clone)]
pub struct Stores {
    pub rules: Arc<dyn RuleStore>,
    pub catalog: Arc<dyn PricingCatalog>,
    pub quotes: Arc<dyn QuoteContextStore>,
    pub log: Arc<dyn AdjustmentLogStore>,
    pub patterns: Arc<dyn TuningPatternStore>,
}

impl Stores {
    /// Empty in-memory stores
    pub fn in_memory() -> Self {
        Self {
            rules: Arc::new(InMemoryRuleStore::new()),
            catalog: Arc::new(InMemoryCatalog::new()),
            quotes: Arc::new(InMemoryQuoteContext::new()),
            log: Arc::new(MemoryAdjustmentLog::new()),
            patterns: Arc::new(InMemoryPatternStore::new()),
        }
    }
}

/// A user edit of one generated quantity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub quote_id: QuoteId,
    pub item_kind: ItemKind,
    #[serde(rename = "ref")]
    pub item_ref: String,
    pub original_qty: Decimal,
    pub adjusted_qty: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_unit_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_unit_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AdjustmentRequest {
    pub fn new(
        quote_id: QuoteId,
        item_kind: ItemKind,
        item_ref: impl Into<String>,
        original_qty: Decimal,
        adjusted_qty: Decimal,
    ) -> Self {
        Self {
            quote_id,
            item_kind,
            item_ref: item_ref.into(),
            original_qty,
            adjusted_qty,
            original_unit_price: None,
            adjusted_unit_price: None,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_prices(mut self, original: Decimal, adjusted: Decimal) -> Self {
        self.original_unit_price = Some(original);
        self.adjusted_unit_price = Some(adjusted);
        self
    }

    fn validate(&self) -> EngineResult<()> {
        if self.item_ref.trim().is_empty() {
            return Err(TypesError::InvalidValue {
                field: "ref".into(),
                message: "must not be empty".into(),
            }
            .into());
        }
        for (field, value) in [
            ("original_qty", self.original_qty),
            ("adjusted_qty", self.adjusted_qty),
        ] {
            if value < Decimal::ZERO {
                return Err(TypesError::InvalidValue {
                    field: field.into(),
                    message: format!("must not be negative, got {}", value),
                }
                .into());
            }
        }
        Ok(())
    }
}

/// What happened to the tuning pattern after a logged adjustment
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TuningUpdate {
    Updated {
        factor: Decimal,
        sample_count: u32,
        tier: ConfidenceTier,
    },
    /// The quote was never generated through this service
    NoRuleContext,
    /// Custom items have no rule entry to learn for
    NotTunable,
    /// The entry is logged; the pattern update failed
    Failed { error: String },
}

/// Result of `record_adjustment`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdjustmentOutcome {
    /// Below the relative-change threshold; nothing written
    Ignored,
    Logged {
        entry_id: AdjustmentId,
        tuning: TuningUpdate,
    },
}

/// Rule engine and auto-tuning behind one entry point
pub struct TakeoffService {
    generator: QuantityGenerator,
    tuning: TuningEngine,
    rules: Arc<dyn RuleStore>,
    quotes: Arc<dyn QuoteContextStore>,
    log: Arc<dyn AdjustmentLogStore>,
    config: EngineConfig,
}

impl TakeoffService {
    pub fn new(stores: Stores, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let tuning = TuningEngine::new(stores.patterns, config.tuning.clone())?;
        let generator = QuantityGenerator::new(
            stores.rules.clone(),
            stores.catalog,
            config.limits.clone(),
            config.pricing.clone(),
        );
        Ok(Self {
            generator,
            tuning,
            rules: stores.rules,
            quotes: stores.quotes,
            log: stores.log,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Generation ───────────────────────────────────────────────────

    /// Generate tuned, priced items for a rule key
    pub async fn generate(
        &self,
        tenant: &TenantId,
        rule_key: &RuleKey,
        bindings: &Bindings,
        profile: &ProfileId,
    ) -> EngineResult<GenerationReport> {
        let generated = self
            .generator
            .generate(tenant, rule_key, bindings, profile)
            .await?;

        let (patterns, tuning_available) = match self.tuning.patterns_for_rule(tenant, rule_key).await
        {
            Ok(patterns) => (patterns, true),
            Err(e) => {
                warn!(
                    tenant = %tenant,
                    rule_key = %rule_key,
                    error = %e,
                    "tuning patterns unavailable, generating untuned"
                );
                (Vec::new(), false)
            }
        };
        let by_ref: HashMap<&str, &TuningPattern> =
            patterns.iter().map(|p| (p.key.item_ref(), p)).collect();
        // Items whose expression failed carry no quantity to tune
        let degraded: HashSet<(ItemKind, &str)> = generated
            .failures
            .iter()
            .filter(|f| f.stage == FailureStage::Evaluation)
            .map(|f| (f.kind, f.item_ref.as_str()))
            .collect();

        let items: Vec<_> = generated
            .items
            .iter()
            .map(|item| {
                if degraded.contains(&(item.kind, item.item_ref.as_str())) {
                    return item.clone();
                }
                apply(
                    item,
                    by_ref.get(item.item_ref.as_str()).copied(),
                    self.tuning.policy(),
                )
            })
            .collect();

        let (currency, vat_rate) = match generated.profile {
            Some(p) => (p.currency, p.vat_rate),
            None => (
                self.config.pricing.default_currency.clone(),
                self.config.pricing.default_vat_rate,
            ),
        };
        let totals = QuoteTotals::from_items(&items, vat_rate);

        let report = GenerationReport {
            tenant: tenant.clone(),
            quote_id: None,
            rule_key: *rule_key,
            profile: profile.clone(),
            currency,
            vat_rate,
            items,
            failures: generated.failures,
            totals,
            tuning_available,
        };

        info!(
            tenant = %tenant,
            rule_key = %rule_key,
            items = report.items.len(),
            failures = report.failures.len(),
            tuned = report.tuned_count(),
            total = %report.totals.total,
            "quote items generated"
        );
        Ok(report)
    }

    /// Generate for a quote from its project requirements
    ///
    /// On success the quote is bound to the requirements' rule key so later
    /// adjustments can be learned under the right pattern. A failed generation
    /// binds nothing.
    pub async fn generate_for_quote(
        &self,
        tenant: &TenantId,
        quote_id: &QuoteId,
        requirements: &ProjectRequirements,
        profile: &ProfileId,
    ) -> EngineResult<GenerationReport> {
        requirements.validate()?;
        let rule_key = requirements.rule_key();

        let mut report = self
            .generate(tenant, &rule_key, &requirements.bindings(), profile)
            .await?;
        self.quotes.bind(tenant, quote_id, rule_key).await?;
        report.quote_id = Some(quote_id.clone());
        Ok(report)
    }

    // ── Adjustments ──────────────────────────────────────────────────

    /// Log a user edit and fold it into the item's tuning pattern
    ///
    /// Once the log entry is written the call succeeds; a tuning failure is
    /// reported in the outcome.
    pub async fn record_adjustment(
        &self,
        tenant: &TenantId,
        request: AdjustmentRequest,
    ) -> EngineResult<AdjustmentOutcome> {
        request.validate()?;

        if !self
            .config
            .adjustments
            .is_significant(request.original_qty, request.adjusted_qty)
        {
            debug!(
                tenant = %tenant,
                quote = %request.quote_id,
                item = %request.item_ref,
                "adjustment below threshold, ignored"
            );
            return Ok(AdjustmentOutcome::Ignored);
        }

        let entry = AdjustmentLogEntry::new(
            tenant.clone(),
            request.quote_id.clone(),
            request.item_kind,
            request.item_ref.clone(),
            request.original_qty,
            request.adjusted_qty,
        )
        .with_prices(request.original_unit_price, request.adjusted_unit_price)
        .with_reason(request.reason.clone());
        let entry_id = entry.id;
        self.log.append(entry).await?;

        let tuning = self.update_tuning(tenant, &request).await;
        info!(
            tenant = %tenant,
            quote = %request.quote_id,
            item = %request.item_ref,
            original = %request.original_qty,
            adjusted = %request.adjusted_qty,
            "adjustment logged"
        );

        Ok(AdjustmentOutcome::Logged { entry_id, tuning })
    }

    async fn update_tuning(&self, tenant: &TenantId, request: &AdjustmentRequest) -> TuningUpdate {
        if request.item_kind == ItemKind::Custom {
            return TuningUpdate::NotTunable;
        }

        let rule_key = match self.quotes.rule_key_for(tenant, &request.quote_id).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                debug!(tenant = %tenant, quote = %request.quote_id, "no rule context for quote");
                return TuningUpdate::NoRuleContext;
            }
            Err(e) => return self.tuning_failed(tenant, request, e.to_string()),
        };

        let key = match rule_key.pattern(request.item_ref.as_str()) {
            Ok(key) => key,
            Err(e) => return self.tuning_failed(tenant, request, e.to_string()),
        };

        match self
            .tuning
            .record(tenant, &key, request.original_qty, request.adjusted_qty)
            .await
        {
            Ok(pattern) => TuningUpdate::Updated {
                factor: pattern.factor,
                sample_count: pattern.sample_count,
                tier: self.tuning.policy().confidence(pattern.sample_count).tier(),
            },
            Err(e) => self.tuning_failed(tenant, request, e.to_string()),
        }
    }

    fn tuning_failed(&self, tenant: &TenantId, request: &AdjustmentRequest, error: String) -> TuningUpdate {
        warn!(
            tenant = %tenant,
            quote = %request.quote_id,
            item = %request.item_ref,
            error = %error,
            "tuning update failed; adjustment is logged"
        );
        TuningUpdate::Failed { error }
    }

    /// Logged adjustments for a quote, newest first
    pub async fn adjustments_for_quote(
        &self,
        tenant: &TenantId,
        quote_id: &QuoteId,
    ) -> EngineResult<Vec<AdjustmentLogEntry>> {
        Ok(self.log.list_by_quote(tenant, quote_id).await?)
    }

    // ── Insights ─────────────────────────────────────────────────────

    pub async fn insights(&self, tenant: &TenantId) -> EngineResult<Vec<PatternInsight>> {
        Ok(self.tuning.insights(tenant).await?)
    }

    pub async fn rule_summary(
        &self,
        tenant: &TenantId,
        rule_key: &RuleKey,
    ) -> EngineResult<RuleSummary> {
        Ok(self.tuning.rule_summary(tenant, rule_key).await?)
    }

    // ── Administration ───────────────────────────────────────────────

    /// Validate, compile every expression, then store the rule
    pub async fn put_rule(&self, rule: GenerationRule) -> EngineResult<()> {
        rule.validate()
            .map_err(|e| EngineError::InvalidRule(e.to_string()))?;

        for (kind, item_ref, expression) in rule.entries() {
            Expression::compile(expression, self.generator.limits()).map_err(|source| {
                EngineError::InvalidExpression {
                    kind: kind.to_string(),
                    item_ref: item_ref.to_string(),
                    source,
                }
            })?;
        }

        let (tenant, key, items) = (rule.tenant.clone(), rule.key, rule.item_count());
        self.rules.put_rule(rule).await?;
        info!(tenant = %tenant, rule_key = %key, items, "generation rule stored");
        Ok(())
    }

    pub async fn delete_rule(&self, tenant: &TenantId, key: &RuleKey) -> EngineResult<bool> {
        let removed = self.rules.delete_rule(tenant, key).await?;
        if removed {
            info!(tenant = %tenant, rule_key = %key, "generation rule deleted");
        }
        Ok(removed)
    }

    pub async fn list_rules(&self, tenant: &TenantId) -> EngineResult<Vec<GenerationRule>> {
        Ok(self.rules.list_rules(tenant).await?)
    }

    /// Drop a learned pattern; its sample count starts over
    pub async fn reset_pattern(&self, tenant: &TenantId, key: &PatternKey) -> EngineResult<bool> {
        Ok(self.tuning.reset(tenant, key).await?)
    }
}
