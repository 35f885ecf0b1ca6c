//! Bound form values

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::record::display_text;

/// Values of a form keyed by field name
pub type FormValues = BTreeMap<String, FieldValue>;

/// A file picked in a file input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub size: u64,
    pub mime: String,
    /// Backend path once uploaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Committed value of one field
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    Files(Vec<FileRef>),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        FieldValue::Text(s.into())
    }

    /// True when nothing meaningful was entered
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Files(files) => files.is_empty(),
            FieldValue::Bool(_) | FieldValue::Number(_) => false,
        }
    }

    /// Text form, as shown in an input box
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(", "),
            FieldValue::Files(files) => files
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Text(s) => s == "true",
            _ => false,
        }
    }

    /// JSON payload form, as sent to the backend
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Empty => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => {
                Value::Number(Number::from(*n as i64))
            }
            FieldValue::Number(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
            FieldValue::Files(files) => serde_json::to_value(files).unwrap_or(Value::Null),
        }
    }

    /// Best-effort conversion from a backend value
    ///
    /// Objects carrying an `id` (e.g. a nested category) bind by that id.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Empty,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or_default(),
            Value::String(s) => FieldValue::Text(s.clone()),
            Value::Array(items) => FieldValue::List(
                items
                    .iter()
                    .map(|v| match v.get("id") {
                        Some(id) => display_text(id),
                        None => display_text(v),
                    })
                    .collect(),
            ),
            Value::Object(map) => match map.get("id") {
                Some(id) => FieldValue::Text(display_text(id)),
                None => FieldValue::Text(value.to_string()),
            },
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Serialize bound values as a JSON object payload
pub fn values_to_json(values: &FormValues) -> Value {
    Value::Object(
        values
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_values() {
        assert!(FieldValue::Empty.is_blank());
        assert!(FieldValue::text("  ").is_blank());
        assert!(FieldValue::List(vec![]).is_blank());
        assert!(!FieldValue::Bool(false).is_blank());
        assert!(!FieldValue::Number(0.0).is_blank());
    }

    #[test]
    fn test_to_json_integers_stay_integers() {
        assert_eq!(FieldValue::Number(3.0).to_json(), json!(3));
        assert_eq!(FieldValue::Number(2.5).to_json(), json!(2.5));
        assert_eq!(FieldValue::Empty.to_json(), Value::Null);
    }

    #[test]
    fn test_from_json_binds_nested_id() {
        assert_eq!(
            FieldValue::from_json(&json!({"id": 4, "name": "Poetry"})),
            FieldValue::text("4")
        );
        assert_eq!(
            FieldValue::from_json(&json!([{"id": 1}, {"id": 2}])),
            FieldValue::List(vec!["1".into(), "2".into()])
        );
    }

    #[test]
    fn test_untagged_serde() {
        let values: FormValues = serde_json::from_value(json!({
            "title": "Kutadgu Bilig",
            "pages": 320,
            "available": true,
            "tags": ["classic"],
            "note": null
        }))
        .unwrap();
        assert_eq!(values["pages"], FieldValue::Number(320.0));
        assert_eq!(values["available"], FieldValue::Bool(true));
        assert_eq!(values["note"], FieldValue::Empty);
        assert_eq!(values_to_json(&values)["pages"], json!(320));
    }
}
