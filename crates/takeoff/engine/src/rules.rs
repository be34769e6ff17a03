//! Rule store: tenant-scoped generation rules

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use takeoff_types::{GenerationRule, RuleKey, StoreResult, TenantId};
use tokio::sync::RwLock;

/// Storage for generation rules
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Get the rule for a key
    async fn get_rule(&self, tenant: &TenantId, key: &RuleKey) -> StoreResult<Option<GenerationRule>>;

    /// Create or replace a rule
    async fn put_rule(&self, rule: GenerationRule) -> StoreResult<()>;

    /// All rules of a tenant, sorted by key
    async fn list_rules(&self, tenant: &TenantId) -> StoreResult<Vec<GenerationRule>>;

    /// Delete a rule; returns whether it existed
    async fn delete_rule(&self, tenant: &TenantId, key: &RuleKey) -> StoreResult<bool>;
}

/// In-memory rule store
#[derive(Debug, Default)]
pub struct InMemoryRuleStore {
    rules: Arc<RwLock<HashMap<(TenantId, RuleKey), GenerationRule>>>,
}

impl InMemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn get_rule(&self, tenant: &TenantId, key: &RuleKey) -> StoreResult<Option<GenerationRule>> {
        let rules = self.rules.read().await;
        Ok(rules.get(&(tenant.clone(), *key)).cloned())
    }

    async fn put_rule(&self, rule: GenerationRule) -> StoreResult<()> {
        let mut rules = self.rules.write().await;
        let map_key = (rule.tenant.clone(), rule.key);
        let rule = match rules.get(&map_key) {
            Some(existing) => GenerationRule {
                created_at: existing.created_at,
                ..rule
            },
            None => rule,
        };
        rules.insert(map_key, rule);
        Ok(())
    }

    async fn list_rules(&self, tenant: &TenantId) -> StoreResult<Vec<GenerationRule>> {
        let rules = self.rules.read().await;
        let mut listed: Vec<_> = rules
            .iter()
            .filter(|((t, _), _)| t == tenant)
            .map(|(_, r)| r.clone())
            .collect();
        listed.sort_by_key(|r| r.key);
        Ok(listed)
    }

    async fn delete_rule(&self, tenant: &TenantId, key: &RuleKey) -> StoreResult<bool> {
        let mut rules = self.rules.write().await;
        Ok(rules.remove(&(tenant.clone(), *key)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use takeoff_types::{FinishLevel, RoomType};

    fn rule(tenant: &str, room: RoomType) -> GenerationRule {
        GenerationRule::new(TenantId::new(tenant), RuleKey::new(room, FinishLevel::Basic))
            .with_labor("tiling", "areaM2")
    }

    #[tokio::test]
    async fn test_rule_crud() {
        let store = InMemoryRuleStore::new();
        let acme = TenantId::new("acme");
        let key = RuleKey::new(RoomType::Bathroom, FinishLevel::Basic);

        store.put_rule(rule("acme", RoomType::Bathroom)).await.unwrap();
        let fetched = store.get_rule(&acme, &key).await.unwrap().unwrap();
        assert_eq!(fetched.labor.get("tiling").map(String::as_str), Some("areaM2"));

        assert!(store.delete_rule(&acme, &key).await.unwrap());
        assert!(store.get_rule(&acme, &key).await.unwrap().is_none());
        assert!(!store.delete_rule(&acme, &key).await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_keeps_created_at() {
        let store = InMemoryRuleStore::new();
        let first = rule("acme", RoomType::Bathroom);
        let created = first.created_at;
        store.put_rule(first).await.unwrap();

        let mut second = rule("acme", RoomType::Bathroom).with_labor("grout", "2");
        second.created_at = created + chrono::Duration::hours(1);
        store.put_rule(second).await.unwrap();

        let fetched = store
            .get_rule(&TenantId::new("acme"), &RuleKey::new(RoomType::Bathroom, FinishLevel::Basic))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.created_at, created);
        assert_eq!(fetched.labor.len(), 2);
    }

    #[tokio::test]
    async fn test_list_is_tenant_scoped_and_sorted() {
        let store = InMemoryRuleStore::new();
        store.put_rule(rule("acme", RoomType::Kitchen)).await.unwrap();
        store.put_rule(rule("acme", RoomType::Bathroom)).await.unwrap();
        store.put_rule(rule("globex", RoomType::Flooring)).await.unwrap();

        let listed = store.list_rules(&TenantId::new("acme")).await.unwrap();
        let keys: Vec<_> = listed.iter().map(|r| r.key.to_string()).collect();
        assert_eq!(keys, vec!["bathroom|basic", "kitchen|basic"]);
    }
}
