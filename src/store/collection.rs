//! コレクション取得の状態機械
//!
//! キャッシュ即表示 → 必要なら裏で再取得（stale-while-revalidate）。
//! 1インスタンス = 1マウント。`start()` は一度だけ有効で、`dispose()` 後は状態を更新しない。

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::future::LocalBoxFuture;

use crate::config::{AppConfig, GasEndpoint};
use crate::error::{ConfigError, FetchError};
use crate::models::{decode_rows, Collection};
use crate::utils::cache::{now_ms, CollectionCache};
use crate::utils::gas::{CancelToken, Fetcher};
use crate::utils::storage::FallbackStore;

/// フックが返す状態 `{items, loading, error}`
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: String,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self { items: Vec::new(), loading: true, error: String::new() }
    }
}

type Listener<T> = Rc<dyn Fn(&CollectionState<T>)>;

struct Inner<T: Collection> {
    endpoint: Result<GasEndpoint, ConfigError>,
    cache: CollectionCache<T>,
    ttl: Duration,
    fetcher: Rc<dyn Fetcher>,
    state: RefCell<CollectionState<T>>,
    started: Cell<bool>,
    disposed: Cell<bool>,
    seq: Cell<u64>,
    in_flight: RefCell<Option<CancelToken>>,
    listeners: RefCell<Vec<Listener<T>>>,
}

pub struct CollectionResource<T: Collection> {
    inner: Rc<Inner<T>>,
}

impl<T: Collection> Clone for CollectionResource<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Collection> CollectionResource<T> {
    pub fn new(config: &AppConfig, store: FallbackStore, fetcher: Rc<dyn Fetcher>) -> Self {
        let endpoint = config.validate();
        let endpoint_str = endpoint.as_ref().map(GasEndpoint::as_str).unwrap_or_default();
        let cache = CollectionCache::new(store, &config.cache_version, endpoint_str);
        Self {
            inner: Rc::new(Inner {
                endpoint,
                cache,
                ttl: config.cache_ttl,
                fetcher,
                state: RefCell::new(CollectionState::default()),
                started: Cell::new(false),
                disposed: Cell::new(false),
                seq: Cell::new(0),
                in_flight: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn state(&self) -> CollectionState<T> {
        self.inner.state.borrow().clone()
    }

    /// 状態変化の通知先を登録
    pub fn subscribe(&self, f: impl Fn(&CollectionState<T>) + 'static) {
        self.inner.listeners.borrow_mut().push(Rc::new(f));
    }

    /// 初回起動。キャッシュ反映までは同期で行い、フェッチが必要な場合だけFutureを返す
    ///
    /// 2回目以降の呼び出しは何もしない。
    pub fn start(&self, force_refresh: bool) -> Option<LocalBoxFuture<'static, ()>> {
        let inner = &self.inner;
        if inner.started.replace(true) || inner.disposed.get() {
            return None;
        }

        if let Err(e) = &inner.endpoint {
            tracing::warn!(collection = T::TAG, error = %e, "endpoint not configured");
            let message = e.to_string();
            self.update(|s| {
                s.loading = false;
                s.error = message;
            });
            return None;
        }

        if let Some(cached) = inner.cache.read() {
            let fresh = cached.is_fresh(now_ms(), inner.ttl);
            tracing::debug!(collection = T::TAG, count = cached.items.len(), fresh, "cache hit");
            self.update(|s| s.items = cached.items);
            if fresh && !force_refresh {
                self.update(|s| {
                    s.loading = false;
                    s.error.clear();
                });
                return None;
            }
        }

        self.begin_fetch()
    }

    /// 鮮度に関係なく再取得する。進行中のフェッチは破棄される
    pub fn refresh(&self) -> Option<LocalBoxFuture<'static, ()>> {
        if !self.inner.started.get() {
            return self.start(true);
        }
        if self.inner.disposed.get() || self.inner.endpoint.is_err() {
            return None;
        }
        self.begin_fetch()
    }

    /// 破棄。進行中のフェッチをキャンセルし、以降の状態更新を止める
    pub fn dispose(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        if let Some(token) = self.inner.in_flight.borrow_mut().take() {
            token.cancel();
        }
        tracing::debug!(collection = T::TAG, "resource disposed");
    }

    fn begin_fetch(&self) -> Option<LocalBoxFuture<'static, ()>> {
        let inner = &self.inner;
        let url = inner.endpoint.as_ref().ok()?.collection_url(T::TAG);

        let seq = inner.seq.get() + 1;
        inner.seq.set(seq);
        let token = CancelToken::new();
        if let Some(previous) = inner.in_flight.borrow_mut().replace(token.clone()) {
            previous.cancel();
        }

        // 表示中のitemsは消さない
        self.update(|s| {
            s.loading = true;
            s.error.clear();
        });

        tracing::debug!(collection = T::TAG, seq, %url, "fetch start");
        let request = inner.fetcher.fetch(&url, &token);
        let this = self.clone();
        Some(Box::pin(async move {
            let result = request.await;
            this.finish(seq, &token, result);
        }))
    }

    fn finish(&self, seq: u64, token: &CancelToken, result: Result<serde_json::Value, FetchError>) {
        let inner = &self.inner;
        if token.is_cancelled() || inner.disposed.get() || inner.seq.get() != seq {
            tracing::debug!(collection = T::TAG, seq, "discarding superseded result");
            return;
        }
        inner.in_flight.borrow_mut().take();

        match result {
            Ok(body) => {
                let items: Vec<T> = decode_rows(body);
                inner.cache.write(&items, now_ms());
                tracing::info!(collection = T::TAG, count = items.len(), "fetched");
                self.update(|s| {
                    s.items = items;
                    s.loading = false;
                    s.error.clear();
                });
            }
            Err(FetchError::Aborted) => {}
            Err(e) => {
                tracing::error!(collection = T::TAG, error = %e, "fetch failed");
                self.update(|s| {
                    s.loading = false;
                    s.error = T::FETCH_ERROR.to_string();
                });
            }
        }
    }

    fn update(&self, f: impl FnOnce(&mut CollectionState<T>)) {
        let snapshot = {
            let mut state = self.inner.state.borrow_mut();
            f(&mut state);
            state.clone()
        };
        let listeners: Vec<_> = self.inner.listeners.borrow().iter().cloned().collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MockFetcher;
    use super::*;
    use crate::models::{Magazine, Prize};
    use crate::utils::cache::make_cache_key;
    use crate::utils::storage::{KeyValueStore, MemoryStore};
    use futures::executor::block_on;
    use serde_json::json;

    const GAS: &str = "https://script.google.com/macros/s/abc/exec";

    struct Fixture {
        session: Rc<MemoryStore>,
        local: Rc<MemoryStore>,
        config: AppConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                session: Rc::new(MemoryStore::new()),
                local: Rc::new(MemoryStore::new()),
                config: AppConfig::default().with_gas_url(GAS),
            }
        }

        fn store(&self) -> FallbackStore {
            FallbackStore::new(vec![self.session.clone(), self.local.clone()])
        }

        fn resource<T: Collection>(&self, fetcher: &Rc<MockFetcher>) -> CollectionResource<T> {
            CollectionResource::new(&self.config, self.store(), fetcher.clone())
        }

        fn seed_cache(&self, tag: &str, saved_at: i64, data: serde_json::Value) {
            let key = make_cache_key(tag, "v2", GAS);
            let payload = json!({"v": "v2", "savedAt": saved_at, "data": data});
            self.session.set(&key, &payload.to_string()).unwrap();
        }
    }

    #[test]
    fn test_missing_config_reports_error_without_fetch() {
        let mut fx = Fixture::new();
        fx.config = fx.config.without_gas_url();
        let fetcher = Rc::new(MockFetcher::new());
        let resource = fx.resource::<Magazine>(&fetcher);

        assert!(resource.start(false).is_none());
        let state = resource.state();
        assert!(state.items.is_empty());
        assert!(!state.loading);
        assert_eq!(state.error, ConfigError::MissingEndpoint.to_string());
        assert_eq!(fetcher.calls(), 0);
    }

    #[test]
    fn test_fresh_cache_served_without_fetch() {
        let fx = Fixture::new();
        fx.seed_cache("magazines", now_ms(), json!([{"magazine_id": "m1", "タイトル": "X"}]));
        let fetcher = Rc::new(MockFetcher::new());
        let resource = fx.resource::<Magazine>(&fetcher);

        assert!(resource.start(false).is_none());
        let state = resource.state();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].magazine_id, "m1");
        assert_eq!(state.items[0].title, "X");
        assert!(!state.loading);
        assert_eq!(state.error, "");
        assert_eq!(fetcher.calls(), 0);
    }

    #[test]
    fn test_corrupt_saved_at_revalidates() {
        let fx = Fixture::new();
        fx.seed_cache("magazines", i64::MIN, json!([{"magazine_id": "m1"}]));
        let fetcher = Rc::new(MockFetcher::new().reply(Ok(json!([{"magazine_id": "m2"}]))));
        let resource = fx.resource::<Magazine>(&fetcher);

        let fut = resource.start(false).expect("corrupt timestamp is stale");
        assert_eq!(resource.state().items[0].magazine_id, "m1");
        assert!(resource.state().loading);

        block_on(fut);
        let state = resource.state();
        assert_eq!(state.items[0].magazine_id, "m2");
        assert!(!state.loading);
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_mismatched_version_is_cache_miss() {
        let fx = Fixture::new();
        let key = make_cache_key("magazines", "v2", GAS);
        let payload = json!({"v": "v1", "savedAt": now_ms(), "data": [{"magazine_id": "old"}]});
        fx.session.set(&key, &payload.to_string()).unwrap();

        let fetcher = Rc::new(MockFetcher::new().reply(Ok(json!([]))));
        let resource = fx.resource::<Magazine>(&fetcher);
        let fut = resource.start(false).expect("should fetch");
        assert!(resource.state().items.is_empty());
        assert!(resource.state().loading);
        block_on(fut);
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_no_cache_fetches_and_writes_through() {
        let fx = Fixture::new();
        let fetcher = Rc::new(MockFetcher::new().reply(Ok(json!([{"magazine_id": "m1", "発売日": "2026/01/05"}]))));
        let resource = fx.resource::<Magazine>(&fetcher);

        let fut = resource.start(false).expect("should fetch");
        assert!(resource.state().loading);
        block_on(fut);

        let state = resource.state();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].release_date, "2026/01/05");
        assert!(!state.loading);
        assert_eq!(state.error, "");
        assert_eq!(fetcher.urls.borrow()[0], format!("{}?type=magazines", GAS));

        let key = make_cache_key("magazines", "v2", GAS);
        let raw = fx.session.get(&key).unwrap().expect("written to cache");
        let payload: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(payload["v"], "v2");
        assert_eq!(payload["data"][0]["magazine_id"], "m1");
    }

    #[test]
    fn test_stale_cache_shown_while_revalidating() {
        let fx = Fixture::new();
        fx.seed_cache("prizes", 0, json!([{"prize_id": "old"}]));
        let fetcher = Rc::new(MockFetcher::new().reply(Ok(json!([{"prize_id": "new"}]))));
        let resource = fx.resource::<Prize>(&fetcher);

        let fut = resource.start(false).expect("stale cache should revalidate");
        let state = resource.state();
        assert_eq!(state.items[0].prize_id, "old");
        assert!(state.loading);

        block_on(fut);
        let state = resource.state();
        assert_eq!(state.items[0].prize_id, "new");
        assert!(!state.loading);
    }

    #[test]
    fn test_force_refresh_bypasses_fresh_cache() {
        let fx = Fixture::new();
        fx.seed_cache("magazines", now_ms(), json!([{"magazine_id": "m1"}]));
        let fetcher = Rc::new(MockFetcher::new().reply(Ok(json!([{"magazine_id": "m2"}]))));
        let resource = fx.resource::<Magazine>(&fetcher);

        let fut = resource.start(true).expect("forced refresh fetches");
        assert_eq!(resource.state().items[0].magazine_id, "m1");
        block_on(fut);
        assert_eq!(resource.state().items[0].magazine_id, "m2");
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_http_error_sets_message_and_keeps_items() {
        let fx = Fixture::new();
        let fetcher = Rc::new(MockFetcher::new().reply(Err(FetchError::RequestFailed(500))));
        let resource = fx.resource::<Magazine>(&fetcher);
        block_on(resource.start(false).unwrap());
        let state = resource.state();
        assert!(state.items.is_empty());
        assert!(!state.loading);
        assert_eq!(state.error, Magazine::FETCH_ERROR);

        let fx = Fixture::new();
        fx.seed_cache("magazines", 0, json!([{"magazine_id": "cached"}]));
        let fetcher = Rc::new(MockFetcher::new().reply(Err(FetchError::Timeout)));
        let resource = fx.resource::<Magazine>(&fetcher);
        block_on(resource.start(false).unwrap());
        let state = resource.state();
        assert_eq!(state.items[0].magazine_id, "cached");
        assert!(!state.error.is_empty());
        assert!(!state.loading);
    }

    #[test]
    fn test_non_array_response_is_empty_not_error() {
        let fx = Fixture::new();
        let fetcher = Rc::new(MockFetcher::new().reply(Ok(json!({"error": "sheet not found"}))));
        let resource = fx.resource::<Prize>(&fetcher);
        block_on(resource.start(false).unwrap());
        let state = resource.state();
        assert!(state.items.is_empty());
        assert_eq!(state.error, "");
        assert!(!state.loading);
    }

    #[test]
    fn test_start_runs_once() {
        let fx = Fixture::new();
        let fetcher = Rc::new(MockFetcher::new().reply(Ok(json!([]))));
        let resource = fx.resource::<Magazine>(&fetcher);
        let first = resource.start(false);
        assert!(first.is_some());
        assert!(resource.start(false).is_none());
        assert!(resource.start(true).is_none());
        block_on(first.unwrap());
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_dispose_suppresses_updates() {
        let fx = Fixture::new();
        let fetcher = Rc::new(MockFetcher::new());
        let tx = fetcher.deferred();
        let resource = fx.resource::<Magazine>(&fetcher);
        let fut = resource.start(false).unwrap();

        resource.dispose();
        tx.send(Ok(json!([{"magazine_id": "late"}]))).unwrap();
        block_on(fut);

        let state = resource.state();
        assert!(state.items.is_empty());
        assert!(state.loading);
        assert!(fx.session.is_empty());
        assert!(resource.refresh().is_none());
    }

    #[test]
    fn test_out_of_order_refresh_keeps_latest() {
        let fx = Fixture::new();
        let fetcher = Rc::new(MockFetcher::new());
        let slow = fetcher.deferred();
        let fast = fetcher.deferred();
        let resource = fx.resource::<Magazine>(&fetcher);

        let first = resource.start(false).unwrap();
        let second = resource.refresh().unwrap();

        fast.send(Ok(json!([{"magazine_id": "newest"}]))).unwrap();
        block_on(second);
        slow.send(Ok(json!([{"magazine_id": "stale"}]))).unwrap();
        block_on(first);

        let state = resource.state();
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].magazine_id, "newest");
        assert!(!state.loading);
        assert_eq!(fetcher.calls(), 2);
    }

    #[test]
    fn test_listeners_receive_updates() {
        let fx = Fixture::new();
        let fetcher = Rc::new(MockFetcher::new().reply(Ok(json!([{"magazine_id": "m1"}]))));
        let resource = fx.resource::<Magazine>(&fetcher);
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            resource.subscribe(move |s: &CollectionState<Magazine>| seen.borrow_mut().push((s.items.len(), s.loading)));
        }
        block_on(resource.start(false).unwrap());
        assert_eq!(seen.borrow().first(), Some(&(0, true)));
        assert_eq!(seen.borrow().last(), Some(&(1, false)));
    }

    #[test]
    fn test_storage_unavailable_still_fetches() {
        let config = AppConfig::default().with_gas_url(GAS);
        let store = FallbackStore::new(vec![Rc::new(MemoryStore::unavailable())]);
        let fetcher = Rc::new(MockFetcher::new().reply(Ok(json!([{"magazine_id": "m1"}]))));
        let resource = CollectionResource::<Magazine>::new(&config, store, fetcher.clone());
        block_on(resource.start(false).unwrap());
        assert_eq!(resource.state().items.len(), 1);
        assert_eq!(resource.state().error, "");
    }
}
