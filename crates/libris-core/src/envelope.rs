//! Response envelope normalization
//!
//! The backend wraps payloads inconsistently: `{data: X}`, `{data: {data: X}}`
//! and `{data: {data: {data: X}}}` all occur, and paged lists report their
//! total as `totalElements`, `total` or `totalCount`. Everything is normalized
//! here, at the client boundary, into [`Paged`] for lists and the bare payload
//! for single items.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Keys that wrap a payload one level deeper
const WRAPPER_KEYS: [&str; 3] = ["data", "content", "items"];

const TOTAL_KEYS: [&str; 4] = ["totalElements", "total", "totalCount", "total_elements"];
const PAGES_KEYS: [&str; 2] = ["totalPages", "total_pages"];
const CURRENT_KEYS: [&str; 3] = ["currentPage", "current_page", "page"];

/// Canonical paged list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    /// As reported by the backend; 1 when absent
    pub current_page: u64,
}

impl<T> Paged<T> {
    /// Unpaged list
    pub fn from_items(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self {
            items,
            total_elements: total,
            total_pages: u64::from(total > 0),
            current_page: 1,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            current_page: self.current_page,
        }
    }
}

impl<T> Default for Paged<T> {
    fn default() -> Self {
        Self::from_items(Vec::new())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct PageMeta {
    total: Option<u64>,
    pages: Option<u64>,
    current: Option<u64>,
}

impl PageMeta {
    fn read(map: &serde_json::Map<String, Value>) -> Self {
        let first = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k).and_then(Value::as_u64));
        Self {
            total: first(&TOTAL_KEYS),
            pages: first(&PAGES_KEYS),
            current: first(&CURRENT_KEYS),
        }
    }

    fn is_empty(&self) -> bool {
        self.total.is_none() && self.pages.is_none() && self.current.is_none()
    }
}

fn wrapped(map: &serde_json::Map<String, Value>) -> Option<&Value> {
    WRAPPER_KEYS.iter().find_map(|k| map.get(*k))
}

/// Peel wrapper layers off a single-item response
pub fn unwrap_item(value: Value) -> Value {
    let mut current = value;
    loop {
        match current {
            Value::Object(mut map) if map.contains_key("data") && map.len() <= 3 => {
                current = map.remove("data").unwrap_or(Value::Null);
            }
            other => return other,
        }
    }
}

/// Decode a single item through the envelope
pub fn decode_item<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(unwrap_item(value))?)
}

/// Normalize a list response into [`Paged`]
///
/// Paging metadata is taken from the innermost level that carries any.
pub fn normalize_list(value: Value) -> Result<Paged<Value>> {
    let mut meta = PageMeta::default();
    let mut current = &value;
    loop {
        match current {
            Value::Array(items) => {
                let total = meta.total.unwrap_or(items.len() as u64);
                return Ok(Paged {
                    items: items.clone(),
                    total_elements: total,
                    total_pages: meta.pages.unwrap_or(u64::from(total > 0)),
                    current_page: meta.current.unwrap_or(1),
                });
            }
            Value::Object(map) => {
                let level = PageMeta::read(map);
                if !level.is_empty() {
                    meta = level;
                }
                current = wrapped(map).ok_or_else(|| {
                    Error::InvalidEnvelope(format!(
                        "expected a list, found object with keys [{}]",
                        map.keys().cloned().collect::<Vec<_>>().join(", ")
                    ))
                })?;
            }
            Value::Null => return Ok(Paged::default()),
            other => {
                return Err(Error::InvalidEnvelope(format!(
                    "expected a list, found {}",
                    other
                )))
            }
        }
    }
}

/// Normalize and decode a list response
pub fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Paged<T>> {
    let page = normalize_list(value)?;
    let items = page
        .items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<Vec<T>, _>>()?;
    Ok(Paged {
        items,
        total_elements: page.total_elements,
        total_pages: page.total_pages,
        current_page: page.current_page,
    })
}

/// Backend error message, if the body carries one
pub fn error_message(value: &Value) -> Option<String> {
    ["message", "error", "detail"]
        .iter()
        .find_map(|k| value.get(*k))
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(crate::record::display_text)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            _ => None,
        })
        .or_else(|| value.get("data").and_then(error_message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_data_array() {
        let page = normalize_list(json!({"data": [{"id": 1}, {"id": 2}]})).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_elements, 2);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
    }

    #[test]
    fn test_nested_paged_with_total_elements() {
        let page = normalize_list(json!({
            "data": {
                "data": [{"id": 1}],
                "totalElements": 41,
                "totalPages": 5,
                "currentPage": 2
            }
        }))
        .unwrap();
        assert_eq!(page.items, vec![json!({"id": 1})]);
        assert_eq!(page.total_elements, 41);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn test_triple_nesting_with_plain_total() {
        let page = normalize_list(json!({
            "data": {"data": {"data": [1, 2, 3], "total": 30}}
        }))
        .unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total_elements, 30);
    }

    #[test]
    fn test_bare_array_and_null() {
        assert_eq!(normalize_list(json!([1])).unwrap().total_elements, 1);
        let empty = normalize_list(json!({"data": null})).unwrap();
        assert!(empty.items.is_empty());
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_invalid_envelope() {
        assert!(matches!(
            normalize_list(json!({"message": "ok"})),
            Err(Error::InvalidEnvelope(_))
        ));
        assert!(normalize_list(json!("text")).is_err());
    }

    #[test]
    fn test_unwrap_item() {
        assert_eq!(
            unwrap_item(json!({"data": {"data": {"id": 5, "title": "X"}}})),
            json!({"id": 5, "title": "X"})
        );
        assert_eq!(unwrap_item(json!({"id": 5})), json!({"id": 5}));
        assert_eq!(unwrap_item(json!({"data": "uploads/a.png"})), json!("uploads/a.png"));
    }

    #[test]
    fn test_decode_list_typed() {
        #[derive(Deserialize)]
        struct Item {
            id: u32,
        }
        let page: Paged<Item> = decode_list(json!({"data": [{"id": 3}]})).unwrap();
        assert_eq!(page.items[0].id, 3);
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(&json!({"message": "Book not found"})),
            Some("Book not found".to_string())
        );
        assert_eq!(
            error_message(&json!({"data": {"message": ["a", "b"]}})),
            Some("a; b".to_string())
        );
        assert_eq!(error_message(&json!({"status": 500})), None);
    }
}
