//! Query cache
//!
//! One entry per distinct [`QueryKey`] (entity + canonical parameters). The
//! cache is written only by the fetch path (`begin`/`resolve`/`fail`) and by
//! invalidation after mutations. Concurrent fetches of the same key are
//! deduplicated; otherwise the last response to arrive wins.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

// ============================================================================
// Keys
// ============================================================================

/// Cache key: entity name plus canonical (sorted) query parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryKey {
    entity: String,
    params: BTreeMap<String, String>,
}

impl QueryKey {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter; empty values are omitted so that "no filter" and
    /// "empty filter" share one entry
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        let value = value.to_string();
        if !value.is_empty() {
            self.params.insert(name.into(), value);
        }
        self
    }

    /// Add a parameter only when present
    pub fn param_opt<V: ToString>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.param(name, v),
            None => self,
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// `a=1&b=x%20y`, in key order
    pub fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            write!(f, "{}", self.entity)
        } else {
            write!(f, "{}?{}", self.entity, self.query_string())
        }
    }
}

// ============================================================================
// Entries
// ============================================================================

/// Fetch status of an entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

/// One cached response
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheEntry {
    /// Last successful payload; kept while refetching or after an error
    pub data: Option<Value>,
    pub status: QueryStatus,
    /// Invalidated and due for a refetch
    pub stale: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            QueryStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

// ============================================================================
// Cache
// ============================================================================

/// In-memory query cache
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    pub fn data(&self, key: &QueryKey) -> Option<&Value> {
        self.entries.get(key).and_then(|e| e.data.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a read of `key` needs the network
    pub fn needs_fetch(&self, key: &QueryKey) -> bool {
        match self.entries.get(key) {
            None => true,
            Some(entry) => match entry.status {
                QueryStatus::Loading => false,
                QueryStatus::Success => entry.stale,
                QueryStatus::Idle | QueryStatus::Error(_) => true,
            },
        }
    }

    /// Mark a fetch as started
    ///
    /// Returns `false` when the same key is already in flight; the caller then
    /// waits for that fetch instead of issuing another.
    pub fn begin(&mut self, key: &QueryKey) -> bool {
        let entry = self.entries.entry(key.clone()).or_default();
        if entry.is_loading() {
            debug!(key = %key, "Query already in flight");
            return false;
        }
        entry.status = QueryStatus::Loading;
        true
    }

    /// Store a successful response
    pub fn resolve(&mut self, key: &QueryKey, data: Value, now: DateTime<Utc>) {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.data = Some(data);
        entry.status = QueryStatus::Success;
        entry.stale = false;
        entry.updated_at = Some(now);
        debug!(key = %key, "Query resolved");
    }

    /// Record a failed fetch; previous data is kept
    pub fn fail(&mut self, key: &QueryKey, message: impl Into<String>) {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.status = QueryStatus::Error(message.into());
    }

    /// Mark every entry of an entity stale; returns how many were marked
    pub fn invalidate(&mut self, entity: &str) -> usize {
        let mut count = 0;
        for (key, entry) in self.entries.iter_mut() {
            if key.entity == entity {
                entry.stale = true;
                count += 1;
            }
        }
        debug!(entity, count, "Invalidated queries");
        count
    }

    pub fn invalidate_key(&mut self, key: &QueryKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.stale = true;
        }
    }

    /// Keys of an entity that are stale
    pub fn stale_keys(&self, entity: &str) -> Vec<QueryKey> {
        self.entries
            .iter()
            .filter(|(k, e)| k.entity == entity && e.stale)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Drop every entry of an entity
    pub fn remove(&mut self, entity: &str) {
        self.entries.retain(|k, _| k.entity != entity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn books(page: u32) -> QueryKey {
        QueryKey::new("books").param("page", page).param("size", 10)
    }

    #[test]
    fn test_key_is_canonical() {
        let a = QueryKey::new("books").param("size", 10).param("page", 1);
        let b = QueryKey::new("books").param("page", 1).param("size", 10);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "books?page=1&size=10");
        assert_eq!(
            QueryKey::new("books").param("search", "").param_opt::<u32>("category", None),
            QueryKey::new("books")
        );
    }

    #[test]
    fn test_query_string_is_encoded() {
        let key = QueryKey::new("students").param("search", "Ali Valiyev&co");
        assert_eq!(key.query_string(), "search=Ali%20Valiyev%26co");
    }

    #[test]
    fn test_one_entry_per_key() {
        let mut cache = QueryCache::new();
        cache.resolve(&books(1), json!([1]), Utc::now());
        cache.resolve(&books(1), json!([2]), Utc::now());
        cache.resolve(&books(2), json!([3]), Utc::now());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.data(&books(1)), Some(&json!([2])));
    }

    #[test]
    fn test_begin_deduplicates_in_flight() {
        let mut cache = QueryCache::new();
        assert!(cache.needs_fetch(&books(1)));
        assert!(cache.begin(&books(1)));
        assert!(!cache.begin(&books(1)));
        assert!(!cache.needs_fetch(&books(1)));

        cache.resolve(&books(1), json!([]), Utc::now());
        assert!(!cache.needs_fetch(&books(1)));
        assert!(cache.begin(&books(1)));
    }

    #[test]
    fn test_invalidate_marks_entity_stale() {
        let mut cache = QueryCache::new();
        let now = Utc::now();
        cache.resolve(&books(1), json!([]), now);
        cache.resolve(&books(2), json!([]), now);
        cache.resolve(&QueryKey::new("categories"), json!([]), now);

        assert_eq!(cache.invalidate("books"), 2);
        assert!(cache.needs_fetch(&books(1)));
        assert!(!cache.needs_fetch(&QueryKey::new("categories")));
        assert_eq!(cache.stale_keys("books").len(), 2);
        assert_eq!(cache.data(&books(1)), Some(&json!([])));

        cache.resolve(&books(1), json!([1]), now);
        assert_eq!(cache.stale_keys("books"), vec![books(2)]);
    }

    #[test]
    fn test_fail_keeps_previous_data() {
        let mut cache = QueryCache::new();
        cache.resolve(&books(1), json!([1]), Utc::now());
        cache.begin(&books(1));
        cache.fail(&books(1), "HTTP error: 500");
        let entry = cache.get(&books(1)).unwrap();
        assert_eq!(entry.error(), Some("HTTP error: 500"));
        assert_eq!(entry.data, Some(json!([1])));
        assert!(cache.needs_fetch(&books(1)));
    }

    #[test]
    fn test_remove_entity() {
        let mut cache = QueryCache::new();
        cache.resolve(&books(1), json!([]), Utc::now());
        cache.resolve(&QueryKey::new("categories"), json!([]), Utc::now());
        cache.remove("books");
        assert_eq!(cache.len(), 1);
    }
}
