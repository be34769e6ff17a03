//! Generation rules
//!
//! A rule maps each item reference to the expression that computes its
//! quantity. Labor items are keyed by labor-rate code, materials by SKU.
//! Rules are read-only during generation and change only through the
//! administrative write path.

use crate::{ItemKind, RuleKey, TenantId, TypesError, TypesResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tenant-scoped quantity rule for one `room|finish` combination
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationRule {
    pub tenant: TenantId,
    pub key: RuleKey,
    /// Labor-rate code → quantity expression
    #[serde(default)]
    pub labor: BTreeMap<String, String>,
    /// Material SKU → quantity expression
    #[serde(default)]
    pub materials: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GenerationRule {
    pub fn new(tenant: TenantId, key: RuleKey) -> Self {
        let now = Utc::now();
        Self {
            tenant,
            key,
            labor: BTreeMap::new(),
            materials: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_labor(mut self, code: impl Into<String>, expression: impl Into<String>) -> Self {
        self.labor.insert(code.into(), expression.into());
        self
    }

    pub fn with_material(mut self, sku: impl Into<String>, expression: impl Into<String>) -> Self {
        self.materials.insert(sku.into(), expression.into());
        self
    }

    /// All `(kind, item_ref, expression)` entries, labor first, each section sorted by ref
    pub fn entries(&self) -> impl Iterator<Item = (ItemKind, &str, &str)> {
        let labor = self
            .labor
            .iter()
            .map(|(r, e)| (ItemKind::Labor, r.as_str(), e.as_str()));
        let materials = self
            .materials
            .iter()
            .map(|(r, e)| (ItemKind::Material, r.as_str(), e.as_str()));
        labor.chain(materials)
    }

    pub fn item_count(&self) -> usize {
        self.labor.len() + self.materials.len()
    }

    /// Structural validation; expressions are compiled separately
    pub fn validate(&self) -> TypesResult<()> {
        if self.labor.is_empty() && self.materials.is_empty() {
            return Err(TypesError::InvalidRule(format!(
                "rule '{}' must define at least one labor or materials item",
                self.key
            )));
        }

        for (kind, item_ref, expression) in self.entries() {
            if item_ref.trim().is_empty() || item_ref.contains('|') {
                return Err(TypesError::InvalidRule(format!(
                    "{} item ref '{}' must be non-empty and must not contain '|'",
                    kind, item_ref
                )));
            }
            if expression.trim().is_empty() {
                return Err(TypesError::InvalidRule(format!(
                    "{} item '{}' has an empty expression",
                    kind, item_ref
                )));
            }
        }

        if let Some(dup) = self.labor.keys().find(|r| self.materials.contains_key(*r)) {
            return Err(TypesError::InvalidRule(format!(
                "item ref '{}' appears in both labor and materials",
                dup
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FinishLevel, RoomType};

    fn rule() -> GenerationRule {
        GenerationRule::new(
            TenantId::new("acme"),
            RuleKey::new(RoomType::Bathroom, FinishLevel::Basic),
        )
    }

    #[test]
    fn test_entries_order_labor_first() {
        let r = rule()
            .with_material("adhesive", "ceil(areaM2/3)")
            .with_labor("tiling", "8 + 2*areaM2")
            .with_labor("demolition", "areaM2");

        let refs: Vec<_> = r.entries().map(|(k, r, _)| (k, r)).collect();
        assert_eq!(
            refs,
            vec![
                (ItemKind::Labor, "demolition"),
                (ItemKind::Labor, "tiling"),
                (ItemKind::Material, "adhesive"),
            ]
        );
        assert_eq!(r.item_count(), 3);
    }

    #[test]
    fn test_validate_requires_items() {
        assert!(rule().validate().is_err());
        assert!(rule().with_labor("tiling", "areaM2").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_expression() {
        let err = rule().with_labor("tiling", "  ").validate().unwrap_err();
        assert!(err.to_string().contains("empty expression"));
    }

    #[test]
    fn test_validate_rejects_duplicate_refs() {
        let r = rule().with_labor("grout", "1").with_material("grout", "2");
        assert!(r.validate().is_err());
    }
}
