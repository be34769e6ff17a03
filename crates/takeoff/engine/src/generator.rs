//! Quantity generator: evaluates a tenant's rule and prices each item
//!
//! A missing rule is fatal. Everything per-item degrades instead: a failed
//! expression yields `qty = 0` with a warning, a catalog miss yields a
//! zero-priced item, and both land in the failure manifest.

use crate::catalog::PricingCatalog;
use crate::config::PricingConfig;
use crate::error::{EngineError, EngineResult};
use crate::report::{FailureStage, GenerationFailure};
use crate::rules::RuleStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use takeoff_expr::{EvalLimits, Expression};
use takeoff_types::{
    Bindings, GeneratedItem, ItemKind, PriceProfile, ProfileId, RuleKey, TenantId,
};
use tracing::{debug, warn};

/// Untuned items for one rule
#[derive(Debug, Clone)]
pub struct GeneratedQuantities {
    pub items: Vec<GeneratedItem>,
    pub failures: Vec<GenerationFailure>,
    pub profile: Option<PriceProfile>,
}

/// Catalog resolution for one item
enum Pricing {
    Found {
        description: String,
        unit: String,
        unit_price: Decimal,
    },
    Missing,
    Unavailable(String),
}

/// Evaluates rules and joins results against the pricing catalog
pub struct QuantityGenerator {
    rules: Arc<dyn RuleStore>,
    catalog: Arc<dyn PricingCatalog>,
    limits: EvalLimits,
    pricing: PricingConfig,
}

impl QuantityGenerator {
    pub fn new(
        rules: Arc<dyn RuleStore>,
        catalog: Arc<dyn PricingCatalog>,
        limits: EvalLimits,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            rules,
            catalog,
            limits,
            pricing,
        }
    }

    pub fn limits(&self) -> &EvalLimits {
        &self.limits
    }

    /// Evaluate every item of the tenant's rule for `rule_key`
    pub async fn generate(
        &self,
        tenant: &TenantId,
        rule_key: &RuleKey,
        bindings: &Bindings,
        profile: &ProfileId,
    ) -> EngineResult<GeneratedQuantities> {
        let rule = self
            .rules
            .get_rule(tenant, rule_key)
            .await?
            .ok_or_else(|| EngineError::RuleNotFound {
                tenant: tenant.clone(),
                key: *rule_key,
            })?;

        let mut items = Vec::with_capacity(rule.item_count());
        let mut failures = Vec::new();

        for (kind, item_ref, source) in rule.entries() {
            let evaluated = Expression::compile(source, &self.limits)
                .and_then(|expr| expr.evaluate(bindings));

            let (qty, eval_warning) = match evaluated {
                Ok(qty) => {
                    debug!(tenant = %tenant, item = item_ref, qty = %qty, "item evaluated");
                    (qty, None)
                }
                Err(e) => {
                    warn!(
                        tenant = %tenant,
                        rule_key = %rule_key,
                        item = item_ref,
                        error = %e,
                        "item expression failed"
                    );
                    failures.push(GenerationFailure {
                        kind,
                        item_ref: item_ref.to_string(),
                        stage: FailureStage::Evaluation,
                        error: e.kind().to_string(),
                        message: e.to_string(),
                    });
                    (Decimal::ZERO, Some(e.to_string()))
                }
            };

            let item = match self.price(tenant, profile, kind, item_ref).await {
                Pricing::Found {
                    description,
                    unit,
                    unit_price,
                } => GeneratedItem::new(kind, item_ref, description, qty, unit, unit_price),
                missing => {
                    let (error, message) = match missing {
                        Pricing::Unavailable(reason) => (
                            "CatalogUnavailable",
                            format!("catalog unavailable for {} '{}': {}", kind, item_ref, reason),
                        ),
                        _ => (
                            "CatalogMiss",
                            format!("no catalog entry for {} '{}'", kind, item_ref),
                        ),
                    };
                    warn!(tenant = %tenant, item = item_ref, "{}", message);
                    failures.push(GenerationFailure {
                        kind,
                        item_ref: item_ref.to_string(),
                        stage: FailureStage::Pricing,
                        error: error.to_string(),
                        message: message.clone(),
                    });
                    GeneratedItem::new(
                        kind,
                        item_ref,
                        item_ref,
                        qty,
                        self.default_unit(kind),
                        Decimal::ZERO,
                    )
                    .with_warning(message)
                }
            };

            let item = match eval_warning {
                Some(eval_warning) => {
                    let combined = match &item.warning {
                        Some(existing) => format!("{}; {}", eval_warning, existing),
                        None => eval_warning,
                    };
                    item.with_warning(combined)
                }
                None => item,
            };
            items.push(item);
        }

        let profile = match self.catalog.price_profile(tenant, profile).await {
            Ok(found) => found,
            Err(e) => {
                warn!(tenant = %tenant, profile = %profile, error = %e, "price profile lookup failed");
                None
            }
        };

        Ok(GeneratedQuantities {
            items,
            failures,
            profile,
        })
    }

    async fn price(
        &self,
        tenant: &TenantId,
        profile: &ProfileId,
        kind: ItemKind,
        item_ref: &str,
    ) -> Pricing {
        match kind {
            ItemKind::Labor => match self.catalog.lookup_labor_rate(tenant, profile, item_ref).await {
                Ok(Some(rate)) => Pricing::Found {
                    description: rate.description,
                    unit: rate.unit,
                    unit_price: rate.unit_price,
                },
                Ok(None) => Pricing::Missing,
                Err(e) => Pricing::Unavailable(e.to_string()),
            },
            ItemKind::Material => match self.catalog.lookup_material(tenant, profile, item_ref).await {
                Ok(Some(material)) => Pricing::Found {
                    unit_price: material.unit_price(),
                    description: material.name,
                    unit: material.unit,
                },
                Ok(None) => Pricing::Missing,
                Err(e) => Pricing::Unavailable(e.to_string()),
            },
            ItemKind::Custom => Pricing::Missing,
        }
    }

    fn default_unit(&self, kind: ItemKind) -> &str {
        match kind {
            ItemKind::Labor => &self.pricing.default_labor_unit,
            ItemKind::Material | ItemKind::Custom => &self.pricing.default_material_unit,
        }
    }
}
