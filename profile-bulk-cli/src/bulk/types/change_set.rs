//! Proposed field values extracted from one row

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::field::Field;

/// A proposed value: plain text, or a list for multi-valued fields (tags)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Convert to JSON for stored workflow requests and profile payloads
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Text(s) => JsonValue::String(s.clone()),
            FieldValue::List(items) => {
                JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
            }
        }
    }

    /// Case-insensitive comparison against a value stored in a pending request
    pub fn matches_ignore_case(&self, pending: &JsonValue) -> bool {
        match (self, pending) {
            (FieldValue::Text(proposed), JsonValue::String(target)) => {
                proposed.to_lowercase() == target.to_lowercase()
            }
            (FieldValue::Text(proposed), JsonValue::Number(n)) => *proposed == n.to_string(),
            (FieldValue::List(proposed), JsonValue::Array(targets)) => {
                proposed.len() == targets.len()
                    && proposed.iter().zip(targets).all(|(p, t)| {
                        t.as_str()
                            .is_some_and(|t| p.to_lowercase() == t.to_lowercase())
                    })
            }
            _ => false,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// Field-keyed proposals for one user, owned by a single row's processing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    entries: BTreeMap<Field, FieldValue>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, value: FieldValue) {
        self.entries.insert(field, value);
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.entries.get(&field)
    }

    /// Remove by profile key, returning the removed proposal
    pub fn remove_key(&mut self, key: &str) -> Option<FieldValue> {
        Field::from_key(key).and_then(|f| self.entries.remove(&f))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in field declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&Field, &FieldValue)> {
        self.entries.iter()
    }

    pub fn fields(&self) -> Vec<Field> {
        self.entries.keys().copied().collect()
    }
}

impl FromIterator<(Field, FieldValue)> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (Field, FieldValue)>>(iter: I) -> Self {
        ChangeSet {
            entries: iter.into_iter().collect(),
        }
    }
}
