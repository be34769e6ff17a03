//! Pricing catalog lookups
//!
//! The catalog data itself lives elsewhere; the engine only needs to resolve a
//! labor rate by code, a material by SKU, and the price profile's VAT.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use takeoff_types::{LaborRate, Material, PriceProfile, ProfileId, StoreResult, TenantId};
use tokio::sync::RwLock;

/// Tenant-scoped pricing catalog
#[async_trait]
pub trait PricingCatalog: Send + Sync {
    /// Labor rate by code
    async fn lookup_labor_rate(
        &self,
        tenant: &TenantId,
        profile: &ProfileId,
        code: &str,
    ) -> StoreResult<Option<LaborRate>>;

    /// Material by SKU
    async fn lookup_material(
        &self,
        tenant: &TenantId,
        profile: &ProfileId,
        sku: &str,
    ) -> StoreResult<Option<Material>>;

    /// Price profile (currency, VAT)
    async fn price_profile(
        &self,
        tenant: &TenantId,
        profile: &ProfileId,
    ) -> StoreResult<Option<PriceProfile>>;
}

#[derive(Debug, Default)]
struct ProfileCatalog {
    profile: Option<PriceProfile>,
    labor: HashMap<String, LaborRate>,
    materials: HashMap<String, Material>,
}

/// In-memory catalog for development and testing
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    profiles: Arc<RwLock<HashMap<(TenantId, ProfileId), ProfileCatalog>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_profile(&self, tenant: &TenantId, profile: PriceProfile) {
        let id = profile.id.clone();
        let mut profiles = self.profiles.write().await;
        profiles.entry((tenant.clone(), id)).or_default().profile = Some(profile);
    }

    pub async fn put_labor_rate(&self, tenant: &TenantId, profile: &ProfileId, rate: LaborRate) {
        let mut profiles = self.profiles.write().await;
        profiles
            .entry((tenant.clone(), profile.clone()))
            .or_default()
            .labor
            .insert(rate.code.clone(), rate);
    }

    pub async fn put_material(&self, tenant: &TenantId, profile: &ProfileId, material: Material) {
        let mut profiles = self.profiles.write().await;
        profiles
            .entry((tenant.clone(), profile.clone()))
            .or_default()
            .materials
            .insert(material.sku.clone(), material);
    }
}

#[async_trait]
impl PricingCatalog for InMemoryCatalog {
    async fn lookup_labor_rate(
        &self,
        tenant: &TenantId,
        profile: &ProfileId,
        code: &str,
    ) -> StoreResult<Option<LaborRate>> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .get(&(tenant.clone(), profile.clone()))
            .and_then(|c| c.labor.get(code))
            .cloned())
    }

    async fn lookup_material(
        &self,
        tenant: &TenantId,
        profile: &ProfileId,
        sku: &str,
    ) -> StoreResult<Option<Material>> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .get(&(tenant.clone(), profile.clone()))
            .and_then(|c| c.materials.get(sku))
            .cloned())
    }

    async fn price_profile(
        &self,
        tenant: &TenantId,
        profile: &ProfileId,
    ) -> StoreResult<Option<PriceProfile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles
            .get(&(tenant.clone(), profile.clone()))
            .and_then(|c| c.profile.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_lookups_are_tenant_scoped() {
        let catalog = InMemoryCatalog::new();
        let acme = TenantId::new("acme");
        let globex = TenantId::new("globex");
        let profile = ProfileId::new("default");

        catalog
            .put_labor_rate(
                &acme,
                &profile,
                LaborRate {
                    code: "tiling".into(),
                    description: "Tiling".into(),
                    unit: "hour".into(),
                    unit_price: Decimal::from(450),
                },
            )
            .await;

        assert!(catalog
            .lookup_labor_rate(&acme, &profile, "tiling")
            .await
            .unwrap()
            .is_some());
        assert!(catalog
            .lookup_labor_rate(&globex, &profile, "tiling")
            .await
            .unwrap()
            .is_none());
        assert!(catalog
            .lookup_material(&acme, &profile, "tiling")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_price_profile() {
        let catalog = InMemoryCatalog::new();
        let acme = TenantId::new("acme");
        let profile = PriceProfile::new(ProfileId::new("default"), "Default");
        catalog.put_profile(&acme, profile.clone()).await;

        let fetched = catalog
            .price_profile(&acme, &ProfileId::new("default"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.vat_rate, Decimal::from(25));
        assert_eq!(fetched.currency, "SEK");
    }
}
