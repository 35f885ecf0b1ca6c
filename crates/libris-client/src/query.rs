//! Cache-aware data fetching
//!
//! [`QueryClient`] sits between the console's hooks and [`ApiClient`]. Reads
//! go through the shared [`QueryCache`]; mutations invalidate the entities they
//! declare, and subscribers are told which keys changed so mounted views can
//! refetch.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use libris_core::{CacheEntry, QueryCache, QueryKey};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::transport::{Body, Method};
use crate::Result;

type Listener = Arc<dyn Fn(&QueryKey)>;

/// Handle returned by [`QueryClient::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, Listener>,
}

/// Outcome of a read
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// Fresh from the network
    Fresh(Value),
    /// Served from a non-stale cache entry
    Cached(Value),
    /// Another fetch of the same key is running; subscribers hear when it lands
    InFlight,
}

impl Fetched {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Fetched::Fresh(v) | Fetched::Cached(v) => Some(v),
            Fetched::InFlight => None,
        }
    }
}

/// A write with the entities it makes stale
#[derive(Debug, Clone)]
pub struct Mutation {
    pub method: Method,
    pub path: String,
    pub body: Body,
    pub invalidates: Vec<&'static str>,
}

impl Mutation {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Body::Empty,
            invalidates: Vec::new(),
        }
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn invalidates(mut self, entity: &'static str) -> Self {
        self.invalidates.push(entity);
        self
    }
}

/// Shared client for hooks: one cache, many views
#[derive(Clone)]
pub struct QueryClient {
    api: ApiClient,
    cache: Arc<RwLock<QueryCache>>,
    listeners: Arc<RwLock<Listeners>>,
}

impl QueryClient {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cache: Arc::new(RwLock::new(QueryCache::new())),
            listeners: Arc::new(RwLock::new(Listeners::default())),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Snapshot of an entry
    pub fn entry(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.cache.read().get(key).cloned()
    }

    pub fn data(&self, key: &QueryKey) -> Option<Value> {
        self.cache.read().data(key).cloned()
    }

    /// Run `f` whenever a key's entry changes
    pub fn subscribe(&self, f: impl Fn(&QueryKey) + 'static) -> SubscriptionId {
        let mut listeners = self.listeners.write();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(id, Arc::new(f));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.write().entries.remove(&id.0);
    }

    fn notify(&self, key: &QueryKey) {
        // Callbacks may read the cache or subscribe, so no lock is held here
        let listeners: Vec<Listener> = self.listeners.read().entries.values().cloned().collect();
        for listener in listeners {
            listener(key);
        }
    }

    /// Read through the cache
    ///
    /// The network is used when the entry is missing, stale or failed.
    /// Concurrent reads of the same key share one request.
    pub async fn fetch(&self, key: &QueryKey, path: &str) -> Result<Fetched> {
        self.fetch_with(key, path, Some(key)).await
    }

    /// Like [`fetch`](Self::fetch), sending `query` instead of the key's parameters
    pub async fn fetch_with(&self, key: &QueryKey, path: &str, query: Option<&QueryKey>) -> Result<Fetched> {
        {
            let mut cache = self.cache.write();
            if !cache.needs_fetch(key) {
                return Ok(match cache.data(key) {
                    Some(data) => Fetched::Cached(data.clone()),
                    None => Fetched::InFlight,
                });
            }
            if !cache.begin(key) {
                return Ok(Fetched::InFlight);
            }
        }
        self.notify(key);

        let result = self.api.get(path, query).await;
        match &result {
            Ok(value) => self.cache.write().resolve(key, value.clone(), Utc::now()),
            Err(e) => {
                warn!(key = %key, error = %e, "Query failed");
                self.cache.write().fail(key, e.to_string());
            }
        }
        self.notify(key);
        result.map(Fetched::Fresh)
    }

    /// Run a write; on success mark its entities stale and notify
    ///
    /// Nothing is invalidated when the write fails.
    pub async fn mutate(&self, mutation: Mutation) -> Result<Value> {
        let value = self
            .api
            .request(mutation.method, &mutation.path, None, mutation.body)
            .await?;
        for entity in &mutation.invalidates {
            self.invalidate(entity);
        }
        Ok(value)
    }

    /// Mark an entity's entries stale and notify their subscribers
    pub fn invalidate(&self, entity: &str) {
        let stale = {
            let mut cache = self.cache.write();
            cache.invalidate(entity);
            cache.stale_keys(entity)
        };
        debug!(entity, keys = stale.len(), "Invalidated entity");
        for key in &stale {
            self.notify(key);
        }
    }

    /// Drop every cached entry, e.g. on logout
    pub fn clear(&self) {
        self.cache.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HttpRequest, HttpResponse, Transport};
    use async_trait::async_trait;
    use libris_core::ClientConfig;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct Counting {
        calls: Rc<Cell<usize>>,
    }

    #[async_trait(?Send)]
    impl Transport for Counting {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse> {
            self.calls.set(self.calls.get() + 1);
            Ok(HttpResponse::json(200, &json!({"data": [self.calls.get()]})))
        }
    }

    fn query_client() -> (QueryClient, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let api = ApiClient::new(
            ClientConfig::new().with_api_base_url("http://api.local"),
            Counting {
                calls: calls.clone(),
            },
        );
        (QueryClient::new(api), calls)
    }

    #[tokio::test]
    async fn test_fetch_then_cached() {
        let (client, calls) = query_client();
        let key = QueryKey::new("categories");

        let first = client.fetch(&key, "/categories").await.unwrap();
        assert_eq!(first, Fetched::Fresh(json!({"data": [1]})));
        let second = client.fetch(&key, "/categories").await.unwrap();
        assert_eq!(second, Fetched::Cached(json!({"data": [1]})));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_triggers_refetch_and_notifies() {
        let (client, calls) = query_client();
        let key = QueryKey::new("books").param("page", 0);
        client.fetch(&key, "/books").await.unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = client.subscribe(move |k| sink.borrow_mut().push(k.clone()));

        client.invalidate("books");
        assert_eq!(*seen.borrow(), vec![key.clone()]);
        assert!(client.entry(&key).unwrap().stale);

        let again = client.fetch(&key, "/books").await.unwrap();
        assert_eq!(again, Fetched::Fresh(json!({"data": [2]})));
        assert_eq!(calls.get(), 2);

        client.unsubscribe(id);
        client.invalidate("books");
        assert_eq!(seen.borrow().len(), 3);
    }

    #[tokio::test]
    async fn test_in_flight_is_shared() {
        let (client, calls) = query_client();
        let key = QueryKey::new("students");
        assert!(client.cache.write().begin(&key));
        assert_eq!(client.fetch(&key, "/students").await.unwrap(), Fetched::InFlight);
        assert_eq!(calls.get(), 0);
    }
}
