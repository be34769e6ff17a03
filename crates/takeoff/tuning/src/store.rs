//! Tuning pattern storage
//!
//! Writes are optimistic: callers pass the version they read and the store
//! rejects the write if someone else got there first. Version 0 means "the
//! pattern does not exist yet".

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use takeoff_types::{PatternKey, StoreError, StoreResult, TenantId, TuningPattern};

/// Storage for learned tuning patterns
#[async_trait]
pub trait TuningPatternStore: Send + Sync {
    /// Get one pattern
    async fn get(&self, tenant: &TenantId, key: &PatternKey) -> StoreResult<Option<TuningPattern>>;

    /// Insert or replace a pattern if the stored version still equals `expected_version`.
    /// Returns the stored pattern with its new version.
    async fn upsert(
        &self,
        pattern: TuningPattern,
        expected_version: u64,
    ) -> StoreResult<TuningPattern>;

    /// All patterns of a tenant
    async fn list(&self, tenant: &TenantId) -> StoreResult<Vec<TuningPattern>>;

    /// Administrative removal; returns whether a pattern existed
    async fn delete(&self, tenant: &TenantId, key: &PatternKey) -> StoreResult<bool>;
}

/// In-memory pattern store. The version check runs under the map's entry lock.
#[derive(Debug)]
pub struct InMemoryPatternStore {
    patterns: Arc<DashMap<(TenantId, PatternKey), TuningPattern>>,
}

impl InMemoryPatternStore {
    pub fn new() -> Self {
        Self {
            patterns: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for InMemoryPatternStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TuningPatternStore for InMemoryPatternStore {
    async fn get(&self, tenant: &TenantId, key: &PatternKey) -> StoreResult<Option<TuningPattern>> {
        Ok(self
            .patterns
            .get(&(tenant.clone(), key.clone()))
            .map(|p| p.value().clone()))
    }

    async fn upsert(
        &self,
        mut pattern: TuningPattern,
        expected_version: u64,
    ) -> StoreResult<TuningPattern> {
        let map_key = (pattern.tenant.clone(), pattern.key.clone());
        match self.patterns.entry(map_key) {
            Entry::Occupied(mut slot) => {
                let actual = slot.get().version;
                if actual != expected_version {
                    return Err(StoreError::VersionConflict {
                        key: pattern.key.to_string(),
                        expected: expected_version,
                        actual,
                    });
                }
                pattern.version = actual + 1;
                slot.insert(pattern.clone());
            }
            Entry::Vacant(slot) => {
                if expected_version != 0 {
                    return Err(StoreError::VersionConflict {
                        key: pattern.key.to_string(),
                        expected: expected_version,
                        actual: 0,
                    });
                }
                pattern.version = 1;
                slot.insert(pattern.clone());
            }
        }
        Ok(pattern)
    }

    async fn list(&self, tenant: &TenantId) -> StoreResult<Vec<TuningPattern>> {
        let mut patterns: Vec<_> = self
            .patterns
            .iter()
            .filter(|e| &e.key().0 == tenant)
            .map(|e| e.value().clone())
            .collect();
        patterns.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(patterns)
    }

    async fn delete(&self, tenant: &TenantId, key: &PatternKey) -> StoreResult<bool> {
        Ok(self
            .patterns
            .remove(&(tenant.clone(), key.clone()))
            .is_some())
    }
}
