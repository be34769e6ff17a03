//! Variable bindings for expression evaluation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value bound to an expression variable
///
/// Tags carry enum fields (room type, finish level) so rules can see them, but
/// they never take part in arithmetic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Binding {
    Number(Decimal),
    Tag(String),
}

impl Binding {
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Tag(_) => None,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Self::Tag(_))
    }
}

impl From<Decimal> for Binding {
    fn from(value: Decimal) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Binding {
    fn from(value: bool) -> Self {
        Self::Number(if value { Decimal::ONE } else { Decimal::ZERO })
    }
}

impl From<i64> for Binding {
    fn from(value: i64) -> Self {
        Self::Number(Decimal::from(value))
    }
}

/// Variable name → bound value
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings(BTreeMap<String, Binding>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Binding>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        self.0.insert(name.into(), Binding::Tag(tag.into()));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Binding>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Binding)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Binding)> for Bindings {
    fn from_iter<T: IntoIterator<Item = (String, Binding)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
