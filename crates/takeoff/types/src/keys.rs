//! Rule and pattern keys
//!
//! A [`RuleKey`] (`room_type|finish_level`) selects a generation rule. A
//! [`PatternKey`] (`room_type|finish_level|item_ref`) names one learned tuning
//! statistic. Both have a canonical string form used in storage and JSON.

use crate::{TypesError, TypesResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const SEPARATOR: char = '|';

/// Kind of room being renovated
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Bathroom,
    Kitchen,
    Flooring,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bathroom => "bathroom",
            Self::Kitchen => "kitchen",
            Self::Flooring => "flooring",
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = TypesError;

    fn from_str(s: &str) -> TypesResult<Self> {
        match s {
            "bathroom" => Ok(Self::Bathroom),
            "kitchen" => Ok(Self::Kitchen),
            "flooring" => Ok(Self::Flooring),
            other => Err(TypesError::UnknownRoomType(other.to_string())),
        }
    }
}

/// Finish level requested by the customer
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishLevel {
    Basic,
    Standard,
    Premium,
}

impl FinishLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }
}

impl std::fmt::Display for FinishLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinishLevel {
    type Err = TypesError;

    fn from_str(s: &str) -> TypesResult<Self> {
        match s {
            "basic" => Ok(Self::Basic),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            other => Err(TypesError::UnknownFinishLevel(other.to_string())),
        }
    }
}

// ── Rule key ─────────────────────────────────────────────────────────

/// Selects a generation rule: `room_type|finish_level`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleKey {
    pub room_type: RoomType,
    pub finish_level: FinishLevel,
}

impl RuleKey {
    pub fn new(room_type: RoomType, finish_level: FinishLevel) -> Self {
        Self {
            room_type,
            finish_level,
        }
    }

    /// Pattern key for one item generated under this rule
    pub fn pattern(&self, item_ref: impl Into<String>) -> TypesResult<PatternKey> {
        PatternKey::new(*self, item_ref)
    }
}

impl std::fmt::Display for RuleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.room_type, SEPARATOR, self.finish_level)
    }
}

impl FromStr for RuleKey {
    type Err = TypesError;

    fn from_str(s: &str) -> TypesResult<Self> {
        let invalid = |message: String| TypesError::InvalidRuleKey {
            key: s.to_string(),
            message,
        };

        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        if parts.len() != 2 {
            return Err(invalid(
                "expected exactly one '|' in the form roomType|finishLevel".into(),
            ));
        }

        let room_type = parts[0]
            .parse::<RoomType>()
            .map_err(|e| invalid(e.to_string()))?;
        let finish_level = parts[1]
            .parse::<FinishLevel>()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self::new(room_type, finish_level))
    }
}

impl TryFrom<String> for RuleKey {
    type Error = TypesError;

    fn try_from(value: String) -> TypesResult<Self> {
        value.parse()
    }
}

impl From<RuleKey> for String {
    fn from(key: RuleKey) -> Self {
        key.to_string()
    }
}

// ── Pattern key ──────────────────────────────────────────────────────

/// Names one learned statistic: `room_type|finish_level|item_ref`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatternKey {
    rule_key: RuleKey,
    item_ref: String,
}

impl PatternKey {
    pub fn new(rule_key: RuleKey, item_ref: impl Into<String>) -> TypesResult<Self> {
        let item_ref = item_ref.into();
        if item_ref.trim().is_empty() || item_ref.contains(SEPARATOR) {
            return Err(TypesError::InvalidPatternKey {
                key: format!("{}{}{}", rule_key, SEPARATOR, item_ref),
                message: "item ref must be non-empty and must not contain '|'".into(),
            });
        }
        Ok(Self { rule_key, item_ref })
    }

    pub fn rule_key(&self) -> RuleKey {
        self.rule_key
    }

    pub fn room_type(&self) -> RoomType {
        self.rule_key.room_type
    }

    pub fn finish_level(&self) -> FinishLevel {
        self.rule_key.finish_level
    }

    pub fn item_ref(&self) -> &str {
        &self.item_ref
    }
}

impl std::fmt::Display for PatternKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.rule_key, SEPARATOR, self.item_ref)
    }
}

impl FromStr for PatternKey {
    type Err = TypesError;

    fn from_str(s: &str) -> TypesResult<Self> {
        let mut parts = s.splitn(3, SEPARATOR);
        let (Some(room), Some(finish), Some(item_ref)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(TypesError::InvalidPatternKey {
                key: s.to_string(),
                message: "expected roomType|finishLevel|itemRef".into(),
            });
        };

        let rule_key: RuleKey = format!("{}{}{}", room, SEPARATOR, finish)
            .parse()
            .map_err(|e: TypesError| TypesError::InvalidPatternKey {
                key: s.to_string(),
                message: e.to_string(),
            })?;

        Self::new(rule_key, item_ref)
    }
}

impl TryFrom<String> for PatternKey {
    type Error = TypesError;

    fn try_from(value: String) -> TypesResult<Self> {
        value.parse()
    }
}

impl From<PatternKey> for String {
    fn from(key: PatternKey) -> Self {
        key.to_string()
    }
}
