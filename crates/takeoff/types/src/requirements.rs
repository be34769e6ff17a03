//! Project requirements: the structured inputs a rule is evaluated against

use crate::{Bindings, FinishLevel, RoomType, RuleKey, TypesError, TypesResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Variable names exposed to rule expressions
pub mod vars {
    pub const AREA_M2: &str = "areaM2";
    pub const HAS_PLUMBING_WORK: &str = "hasPlumbingWork";
    pub const HAS_ELECTRICAL_WORK: &str = "hasElectricalWork";
    pub const ROOM_TYPE: &str = "roomType";
    pub const FINISH_LEVEL: &str = "finishLevel";
}

/// Inputs describing the renovation project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectRequirements {
    pub room_type: RoomType,
    pub finish_level: FinishLevel,
    /// Floor area in square metres, strictly positive
    pub area_m2: Decimal,
    #[serde(default)]
    pub has_plumbing_work: bool,
    #[serde(default)]
    pub has_electrical_work: bool,
    /// Additional numeric inputs made visible to rules under their own names
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Decimal>,
}

impl ProjectRequirements {
    pub fn new(room_type: RoomType, finish_level: FinishLevel, area_m2: Decimal) -> Self {
        Self {
            room_type,
            finish_level,
            area_m2,
            has_plumbing_work: false,
            has_electrical_work: false,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_plumbing(mut self, yes: bool) -> Self {
        self.has_plumbing_work = yes;
        self
    }

    pub fn with_electrical(mut self, yes: bool) -> Self {
        self.has_electrical_work = yes;
        self
    }

    pub fn with_extra(mut self, name: impl Into<String>, value: Decimal) -> Self {
        self.extra.insert(name.into(), value);
        self
    }

    pub fn rule_key(&self) -> RuleKey {
        RuleKey::new(self.room_type, self.finish_level)
    }

    pub fn validate(&self) -> TypesResult<()> {
        if self.area_m2 <= Decimal::ZERO {
            return Err(TypesError::InvalidValue {
                field: "area_m2".into(),
                message: format!("must be greater than 0, got {}", self.area_m2),
            });
        }
        for name in self.extra.keys() {
            let valid = name
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(TypesError::InvalidValue {
                    field: format!("extra.{}", name),
                    message: "variable names must be ASCII identifiers".into(),
                });
            }
        }
        Ok(())
    }

    /// Bindings seen by rule expressions
    ///
    /// Booleans bind as 0/1 and enum fields as tags. Extra values never shadow
    /// the built-in names.
    pub fn bindings(&self) -> Bindings {
        let mut bindings = Bindings::new();
        for (name, value) in &self.extra {
            bindings.insert(name.clone(), *value);
        }
        bindings
            .with(vars::AREA_M2, self.area_m2)
            .with(vars::HAS_PLUMBING_WORK, self.has_plumbing_work)
            .with(vars::HAS_ELECTRICAL_WORK, self.has_electrical_work)
            .with_tag(vars::ROOM_TYPE, self.room_type.as_str())
            .with_tag(vars::FINISH_LEVEL, self.finish_level.as_str())
    }
}
