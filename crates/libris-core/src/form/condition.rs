//! Dependency-based field visibility

use serde::{Deserialize, Serialize};

use super::value::{FieldValue, FormValues};

/// Comparison against a sibling field's current value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", content = "value", rename_all = "snake_case")]
pub enum Condition {
    Equals(FieldValue),
    NotEquals(FieldValue),
    Contains(String),
    GreaterThan(f64),
    LessThan(f64),
}

impl Condition {
    /// Evaluate against the sibling's value (`Empty` when it has none)
    pub fn matches(&self, value: &FieldValue) -> bool {
        match self {
            Condition::Equals(expected) => loosely_equal(value, expected),
            Condition::NotEquals(expected) => !loosely_equal(value, expected),
            Condition::Contains(needle) => match value {
                FieldValue::List(items) => items.iter().any(|i| i == needle),
                other => other.as_text().contains(needle.as_str()),
            },
            Condition::GreaterThan(bound) => value.as_number().is_some_and(|n| n > *bound),
            Condition::LessThan(bound) => value.as_number().is_some_and(|n| n < *bound),
        }
    }
}

/// Numbers compare numerically, booleans as booleans, everything else as text
fn loosely_equal(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::Bool(x), other) | (other, FieldValue::Bool(x)) => *x == other.as_bool(),
        _ => match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_text() == b.as_text(),
        },
    }
}

/// Visibility rule of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    /// Name of the sibling field
    pub field: String,
    pub condition: Condition,
}

impl Dependency {
    pub fn is_met(&self, values: &FormValues) -> bool {
        let empty = FieldValue::Empty;
        let value = values.get(&self.field).unwrap_or(&empty);
        self.condition.matches(value)
    }
}
