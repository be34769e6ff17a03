//! JSON seed data for in-memory stores
//!
//! One tenant's price profiles, catalog entries and rules, used by the CLI and
//! integration tests. Rules are installed through [`TakeoffService::put_rule`]
//! so they are validated and compiled like any administrative write.

use crate::catalog::InMemoryCatalog;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::service::{Stores, TakeoffService};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use takeoff_types::{
    GenerationRule, LaborRate, Material, PriceProfile, ProfileId, RuleKey, TenantId,
};

/// Catalog for one price profile
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedProfile {
    pub id: ProfileId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_rate: Option<Decimal>,
    #[serde(default)]
    pub labor_rates: Vec<LaborRate>,
    #[serde(default)]
    pub materials: Vec<Material>,
}

impl SeedProfile {
    fn price_profile(&self) -> PriceProfile {
        let mut profile = PriceProfile::new(self.id.clone(), self.name.clone());
        if let Some(currency) = &self.currency {
            profile.currency = currency.clone();
        }
        if let Some(vat_rate) = self.vat_rate {
            profile.vat_rate = vat_rate;
        }
        profile
    }
}

/// Rule body without tenant or timestamps
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedRule {
    pub key: RuleKey,
    #[serde(default)]
    pub labor: BTreeMap<String, String>,
    #[serde(default)]
    pub materials: BTreeMap<String, String>,
}

/// Everything needed to generate quotes for one tenant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeedData {
    pub tenant: TenantId,
    #[serde(default)]
    pub profiles: Vec<SeedProfile>,
    #[serde(default)]
    pub rules: Vec<SeedRule>,
}

impl SeedData {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::Seed(e.to_string()))
    }

    /// Load the tenant's profiles, labor rates and materials into `catalog`
    pub async fn populate_catalog(&self, catalog: &InMemoryCatalog) {
        for profile in &self.profiles {
            catalog.put_profile(&self.tenant, profile.price_profile()).await;
            for rate in &profile.labor_rates {
                catalog
                    .put_labor_rate(&self.tenant, &profile.id, rate.clone())
                    .await;
            }
            for material in &profile.materials {
                catalog
                    .put_material(&self.tenant, &profile.id, material.clone())
                    .await;
            }
        }
    }

    /// Install every rule through the service; returns how many were stored
    pub async fn install_rules(&self, service: &TakeoffService) -> EngineResult<usize> {
        for seed in &self.rules {
            let mut rule = GenerationRule::new(self.tenant.clone(), seed.key);
            rule.labor = seed.labor.clone();
            rule.materials = seed.materials.clone();
            service.put_rule(rule).await?;
        }
        Ok(self.rules.len())
    }

    /// Service over in-memory stores holding this seed
    pub async fn in_memory_service(&self, config: EngineConfig) -> EngineResult<TakeoffService> {
        let catalog = Arc::new(InMemoryCatalog::new());
        self.populate_catalog(&catalog).await;

        let stores = Stores {
            catalog,
            ..Stores::in_memory()
        };
        let service = TakeoffService::new(stores, config)?;
        self.install_rules(&service).await?;
        Ok(service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PricingCatalog;

    const SEED: &str = r#"{
        "tenant": "acme",
        "profiles": [{
            "id": "default",
            "name": "Standard prices",
            "vat_rate": "12",
            "labor_rates": [{"code": "tiling", "description": "Tiling", "unit_price": "450"}],
            "materials": [{"sku": "adhesive", "name": "Adhesive", "unit": "bag", "unit_cost": "100"}]
        }],
        "rules": [{
            "key": "bathroom|standard",
            "labor": {"tiling": "8 + 2*areaM2"},
            "materials": {"adhesive": "ceil(areaM2 / 10)"}
        }]
    }"#;

    #[tokio::test]
    async fn test_seed_populates_catalog_with_defaults() {
        let seed = SeedData::from_json(SEED).unwrap();
        let catalog = InMemoryCatalog::new();
        seed.populate_catalog(&catalog).await;

        let tenant = TenantId::new("acme");
        let profile_id = ProfileId::new("default");
        let profile = catalog
            .price_profile(&tenant, &profile_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.currency, "SEK");
        assert_eq!(profile.vat_rate, Decimal::from(12));

        let rate = catalog
            .lookup_labor_rate(&tenant, &profile_id, "tiling")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rate.unit, "hour");

        let material = catalog
            .lookup_material(&tenant, &profile_id, "adhesive")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(material.markup_pct, Decimal::from(20));
    }

    #[tokio::test]
    async fn test_in_memory_service_installs_rules() {
        let seed = SeedData::from_json(SEED).unwrap();
        let service = seed
            .in_memory_service(EngineConfig::default())
            .await
            .unwrap();
        let rules = service.list_rules(&TenantId::new("acme")).await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].key.to_string(), "bathroom|standard");
    }

    #[tokio::test]
    async fn test_seed_with_bad_expression_fails() {
        let seed = SeedData::from_json(
            r#"{"tenant": "acme", "rules": [{"key": "kitchen|basic", "labor": {"x": "2 ** 3"}}]}"#,
        )
        .unwrap();
        let err = seed
            .in_memory_service(EngineConfig::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::InvalidExpression { .. }));
    }

    #[test]
    fn test_malformed_seed_is_reported() {
        let err = SeedData::from_json(r#"{"tenant": "acme", "rules": [{"key": "attic|basic"}]}"#)
            .unwrap_err();
        assert!(matches!(err, EngineError::Seed(_)));
    }
}
