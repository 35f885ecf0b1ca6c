//! Data-fetch hooks
//!
//! Hooks bind [`QueryClient`] reads to signals. A hook subscribes to cache
//! notifications for its key: when another view's mutation invalidates the
//! entity, the hook refetches and the view re-renders.

use std::future::Future;

use leptos::*;
use libris_client::{ApiError, ListParams, QueryClient, Resource, Result};
use libris_core::{Paged, QueryKey, QueryStatus};

use crate::state::AppContext;

/// Reactive result of a read
pub struct Query<T: 'static> {
    pub data: RwSignal<Option<T>>,
    pub loading: RwSignal<bool>,
    pub error: RwSignal<Option<String>>,
    key: Memo<QueryKey>,
    client: StoredValue<QueryClient>,
}

impl<T: 'static> Clone for Query<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: 'static> Copy for Query<T> {}

impl<T: Clone + 'static> Query<T> {
    /// Current data or `default`
    pub fn get_or(&self, default: T) -> T {
        self.data.get().unwrap_or(default)
    }

    /// Mark the key's entity stale; mounted hooks refetch
    pub fn refetch(&self) {
        let entity = self.key.get_untracked().entity().to_string();
        self.client.with_value(|c| c.invalidate(&entity));
    }
}

/// Generic cached read
///
/// `params` is tracked; `fetch` returns `Ok(None)` when an identical request
/// is already running, in which case the hook waits for its notification.
pub fn use_query<P, T, K, F, Fut>(params: impl Fn() -> P + 'static, key_of: K, fetch: F) -> Query<T>
where
    P: Clone + PartialEq + 'static,
    T: 'static,
    K: Fn(&P) -> QueryKey + 'static,
    F: Fn(QueryClient, P) -> Fut + 'static,
    Fut: Future<Output = Result<Option<T>>> + 'static,
{
    let ctx = expect_context::<AppContext>();
    let params = create_memo(move |_| params());
    let key = create_memo(move |_| params.with(|p| key_of(p)));

    let data = create_rw_signal(None);
    let loading = create_rw_signal(true);
    let error = create_rw_signal(None::<String>);
    let version = create_rw_signal(0u64);

    let client = ctx.query.clone();
    let subscription = ctx.query.subscribe(move |changed| {
        if key.try_with_untracked(|k| k == changed) != Some(true) {
            return;
        }
        match client.entry(changed).map(|e| e.status) {
            Some(QueryStatus::Loading) => loading.set(true),
            Some(QueryStatus::Error(message)) => {
                error.set(Some(message));
                loading.set(false);
            }
            _ => version.update(|v| *v += 1),
        }
    });
    let client = ctx.query.clone();
    on_cleanup(move || client.unsubscribe(subscription));

    let fetch = store_value(fetch);
    let query_client = store_value(ctx.query.clone());
    create_effect(move |_| {
        version.track();
        let p = params.get();
        let ctx = ctx.clone();
        let pending = fetch.with_value(|f| f(ctx.query.clone(), p));
        spawn_local(async move {
            match pending.await {
                Ok(Some(value)) => {
                    data.try_set(Some(value));
                    error.try_set(None);
                    loading.try_set(false);
                }
                Ok(None) => {}
                Err(e) => {
                    if e.is_unauthorized() {
                        ctx.report_error(&e);
                    }
                    error.try_set(Some(e.to_string()));
                    loading.try_set(false);
                }
            }
        });
    });

    Query {
        data,
        loading,
        error,
        key,
        client: query_client,
    }
}

/// Paged list of a resource
pub fn use_list<R>(params: impl Fn() -> ListParams + 'static) -> Query<Paged<R>>
where
    R: Resource + Clone,
{
    use_query(
        params,
        |p: &ListParams| p.key(R::ENTITY),
        |client, p| async move { client.list::<R>(&p).await },
    )
}

/// Single resource by id
pub fn use_item<R>(id: impl Fn() -> u64 + 'static) -> Query<R>
where
    R: Resource + Clone,
{
    use_query(
        id,
        |id: &u64| QueryKey::new(R::ENTITY).param("id", id),
        |client, id| async move { client.get::<R>(id).await },
    )
}

/// Write through the query client
///
/// Failures are reported through the application context before the result
/// reaches the caller.
pub fn use_mutation<I, O, F, Fut>(f: F) -> Action<I, std::result::Result<O, ApiError>>
where
    I: 'static,
    O: 'static,
    F: Fn(QueryClient, &I) -> Fut + 'static,
    Fut: Future<Output = Result<O>> + 'static,
{
    let ctx = expect_context::<AppContext>();
    create_action(move |input: &I| {
        let pending = f(ctx.query.clone(), input);
        let ctx = ctx.clone();
        async move {
            let result = pending.await;
            if let Err(e) = &result {
                ctx.report_error(e);
            }
            result
        }
    })
}
