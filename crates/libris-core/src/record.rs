//! Records and typed field projection
//!
//! Backend responses are arbitrary JSON objects. Tables and forms read them
//! through a [`KeyPath`], which resolves nested fields and array indices and
//! yields `None` for anything that is not there. Projection never panics.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One backend entity (book, copy, student, booking, ...) as a JSON object
pub type Record = Map<String, Value>;

/// Convert any serializable value into a [`Record`]
///
/// Non-object values are wrapped under a single `value` key so that they can
/// still be projected.
pub fn to_record<T: Serialize>(value: &T) -> crate::Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            Ok(map)
        }
    }
}

// ============================================================================
// Key Paths
// ============================================================================

/// Path to a (possibly nested) field of a [`Record`]
///
/// Written as dot-separated segments: `"title"`, `"category.name"`,
/// `"authors.0.name"`. Numeric segments index into arrays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a dot-separated path. Empty segments are dropped.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Build a path from explicit segments
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve this path against a record
    pub fn resolve<'a>(&self, record: &'a Record) -> Option<&'a Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = record.get(first)?;
        for segment in rest {
            current = step(current, segment)?;
        }
        Some(current)
    }

    /// Resolve and render as display text (empty when absent)
    pub fn text(&self, record: &Record) -> String {
        self.resolve(record).map(display_text).unwrap_or_default()
    }
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

impl From<&str> for KeyPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for KeyPath {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl From<KeyPath> for String {
    fn from(path: KeyPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

// ============================================================================
// Display Helpers
// ============================================================================

/// Render a JSON value the way a table cell shows it
///
/// `null` renders empty, strings render without quotes, arrays are joined with
/// `", "`, and objects fall back to their JSON text.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(display_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Numeric view of a value, if it has one
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_resolve_nested_path() {
        let r = record(json!({"book": {"category": {"name": "Fiction"}}}));
        let path = KeyPath::parse("book.category.name");
        assert_eq!(path.resolve(&r), Some(&json!("Fiction")));
    }

    #[test]
    fn test_resolve_array_index() {
        let r = record(json!({"authors": [{"name": "Navoi"}, {"name": "Qodiriy"}]}));
        assert_eq!(KeyPath::parse("authors.1.name").text(&r), "Qodiriy");
        assert_eq!(KeyPath::parse("authors.5.name").resolve(&r), None);
    }

    #[test]
    fn test_missing_path_is_empty() {
        let r = record(json!({"title": "Boburnoma"}));
        assert_eq!(KeyPath::parse("publisher.name").resolve(&r), None);
        assert_eq!(KeyPath::parse("title.length").resolve(&r), None);
        assert_eq!(KeyPath::parse("publisher.name").text(&r), "");
        assert_eq!(KeyPath::parse("").resolve(&r), None);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(display_text(&Value::Null), "");
        assert_eq!(display_text(&json!("x")), "x");
        assert_eq!(display_text(&json!(42)), "42");
        assert_eq!(display_text(&json!(["a", null, "b"])), "a, b");
    }

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&json!(3)), Some(3.0));
        assert_eq!(as_number(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(as_number(&json!("abc")), None);
    }

    #[test]
    fn test_keypath_serde_roundtrip_as_string() {
        let path: KeyPath = serde_json::from_value(json!("a.b")).unwrap();
        assert_eq!(path.segments(), ["a", "b"]);
        assert_eq!(serde_json::to_value(&path).unwrap(), json!("a.b"));
    }
}
