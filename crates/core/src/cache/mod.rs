//! In-memory query cache.
//!
//! Memoizes read operations by [`QueryKey`] and owns the freshness and retry
//! policy so callers never implement their own:
//!
//! - **Fresh** entries are served without touching the network.
//! - **Stale** entries (older than `stale_time`, or invalidated) are served
//!   immediately while a background refresh runs. A failed refresh keeps the
//!   old value and records the error on the entry.
//! - **Absent** entries are fetched inline, with retry and backoff.
//! - Entries unused for longer than `gc_time` are evicted.
//!
//! At most one fetch per key is in flight at any time; concurrent readers
//! share it. Fetches run on spawned tasks, so a reader that gives up does
//! not cancel the work and the result still lands in the cache.

pub mod entry;
pub mod key;
pub mod retry;

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;

use crate::Error;
use entry::{CacheEntry, Value};

pub use entry::QueryState;
pub use key::{KeyPart, QueryKey};
pub use retry::RetryPolicy;

/// Default age after which a cached value is stale (5 minutes).
const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Default idle time after which an entry is evicted (10 minutes).
const DEFAULT_GC_TIME: Duration = Duration::from_secs(10 * 60);

/// Shortest sweep period accepted by [`QueryCache::spawn_gc`].
pub const MIN_GC_PERIOD: Duration = Duration::from_millis(1);

type SharedFetch = Shared<BoxFuture<'static, Result<Value, Error>>>;

/// Query cache configuration.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Age after which a value is served stale while refreshing.
    pub stale_time: Duration,
    /// Idle time after which an entry is evicted.
    pub gc_time: Duration,
    /// Retry policy for fetches issued by the cache.
    pub retry: RetryPolicy,
    /// Whether [`QueryCache::focus_regained`] marks entries stale.
    pub refetch_on_focus: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
            retry: RetryPolicy::default(),
            refetch_on_focus: false,
        }
    }
}

struct InFlight {
    fetch: SharedFetch,
    abort: AbortHandle,
}

#[derive(Default)]
struct State {
    entries: HashMap<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, InFlight>,
}

struct Inner {
    state: Mutex<State>,
    options: CacheOptions,
    gc_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

/// Shared handle to a query cache.
///
/// Cloning is cheap; all clones see the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl QueryCache {
    pub fn new(options: CacheOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                options,
                gc_task: std::sync::Mutex::new(None),
            }),
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.inner.options
    }

    /// Read `key`, fetching with `fetch` when needed.
    ///
    /// Fresh values return at once. Stale values return at once and start a
    /// background refresh. Missing values are fetched inline with the retry
    /// policy; the error is returned once retries are exhausted.
    ///
    /// # Errors
    ///
    /// Returns the fetch error for a missing entry, or
    /// `Error::TypeMismatch` if `key` holds a value of another type.
    pub async fn read<T, F, Fut>(&self, key: &QueryKey, fetch: F) -> Result<T, Error>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let options = &self.inner.options;
        let pending = {
            let mut state = self.inner.state.lock().await;
            let now = Instant::now();

            if state.entries.get(key).is_some_and(|e| e.is_idle(now, options.gc_time)) {
                tracing::debug!(%key, "evicting idle entry");
                state.entries.remove(key);
            }

            if let Some(entry) = state.entries.get_mut(key) {
                entry.last_accessed = now;
                let value = downcast::<T>(key, &entry.value)?;
                let stale = entry.is_stale(now, options.stale_time);

                if !stale {
                    tracing::debug!(%key, "cache hit");
                } else if !state.in_flight.contains_key(key) {
                    tracing::debug!(%key, "cache stale, refreshing in background");
                    let _refresh = self.start_fetch(&mut state, key, fetch);
                }
                return Ok(value);
            }

            match state.in_flight.get(key) {
                Some(in_flight) => {
                    tracing::debug!(%key, "joining in-flight fetch");
                    in_flight.fetch.clone()
                }
                None => {
                    tracing::debug!(%key, "cache miss");
                    self.start_fetch(&mut state, key, fetch)
                }
            }
        };

        let value = pending.await?;
        downcast(key, &value)
    }

    /// Fetch `key` now and wait for the result, joining an in-flight fetch
    /// if there is one.
    pub async fn refetch<T, F, Fut>(&self, key: &QueryKey, fetch: F) -> Result<T, Error>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let pending = {
            let mut state = self.inner.state.lock().await;
            match state.in_flight.get(key) {
                Some(in_flight) => in_flight.fetch.clone(),
                None => self.start_fetch(&mut state, key, fetch),
            }
        };

        let value = pending.await?;
        downcast(key, &value)
    }

    /// Wait for the in-flight fetch of `key`, if any.
    ///
    /// The outcome is ignored; check [`QueryCache::state`] for errors.
    pub async fn settled(&self, key: &QueryKey) {
        let pending = {
            let state = self.inner.state.lock().await;
            state.in_flight.get(key).map(|f| f.fetch.clone())
        };
        if let Some(pending) = pending {
            let _ = pending.await;
        }
    }

    /// Mark `key` stale. Returns whether an entry was marked.
    pub async fn invalidate(&self, key: &QueryKey) -> bool {
        let mut state = self.inner.state.lock().await;
        match state.entries.get_mut(key) {
            Some(entry) => {
                entry.invalidate();
                tracing::debug!(%key, "invalidated");
                true
            }
            None => false,
        }
    }

    /// Mark every key starting with `prefix` stale. Returns the count.
    pub async fn invalidate_prefix(&self, prefix: &QueryKey) -> usize {
        let mut state = self.inner.state.lock().await;
        let mut count = 0;
        for (key, entry) in state.entries.iter_mut() {
            if prefix.is_prefix_of(key) {
                entry.invalidate();
                count += 1;
            }
        }
        tracing::debug!(%prefix, count, "invalidated by prefix");
        count
    }

    /// Mark every entry stale. Returns the count.
    pub async fn invalidate_all(&self) -> usize {
        self.invalidate_prefix(&QueryKey::default()).await
    }

    /// Called when the host application regains focus.
    ///
    /// Marks all entries stale when `refetch_on_focus` is set, so the next
    /// read of each refreshes it. Returns the number of entries marked.
    pub async fn focus_regained(&self) -> usize {
        if !self.inner.options.refetch_on_focus {
            return 0;
        }
        self.invalidate_all().await
    }

    /// Drop the entry for `key`. An in-flight fetch still completes and
    /// repopulates it.
    pub async fn remove(&self, key: &QueryKey) -> bool {
        self.inner.state.lock().await.entries.remove(key).is_some()
    }

    /// Drop all entries.
    pub async fn clear(&self) {
        self.inner.state.lock().await.entries.clear();
    }

    /// The cached value for `key`, if any, without fetching or counting as
    /// a use.
    ///
    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` if `key` holds a value of another type.
    pub async fn peek<T: Clone + 'static>(&self, key: &QueryKey) -> Result<Option<T>, Error> {
        let state = self.inner.state.lock().await;
        state.entries.get(key).map(|entry| downcast(key, &entry.value)).transpose()
    }

    pub async fn state(&self, key: &QueryKey) -> Option<QueryState> {
        let state = self.inner.state.lock().await;
        let is_fetching = state.in_flight.contains_key(key);
        state
            .entries
            .get(key)
            .map(|entry| entry.state(Instant::now(), self.inner.options.stale_time, is_fetching))
    }

    pub async fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner.state.lock().await.in_flight.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Evict entries unused for longer than `gc_time`. Returns the count.
    pub async fn collect_garbage(&self) -> usize {
        self.inner.collect_garbage().await
    }

    /// Run [`QueryCache::collect_garbage`] every `period` until
    /// [`QueryCache::shutdown`] or the last handle is dropped.
    ///
    /// A zero `period` is raised to [`MIN_GC_PERIOD`].
    pub fn spawn_gc(&self, period: Duration) {
        if period.is_zero() {
            tracing::warn!(min_ms = MIN_GC_PERIOD.as_millis() as u64, "gc period of 0 raised to minimum");
        }
        let period = period.max(MIN_GC_PERIOD);
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                interval.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                inner.collect_garbage().await;
            }
        });

        let mut slot = self.inner.gc_task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(handle) {
            previous.abort();
        }
    }

    /// Stop the eviction sweep, abort in-flight fetches and drop all
    /// entries. Readers waiting on an aborted fetch get `Error::Aborted`.
    pub async fn shutdown(&self) {
        let gc = self.inner.gc_task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(gc) = gc {
            gc.abort();
        }

        let mut state = self.inner.state.lock().await;
        for (_, in_flight) in state.in_flight.drain() {
            in_flight.abort.abort();
        }
        state.entries.clear();
        tracing::debug!("query cache shut down");
    }

    /// Spawn the fetch for `key` and register it as in flight.
    fn start_fetch<T, F, Fut>(&self, state: &mut State, key: &QueryKey, fetch: F) -> SharedFetch
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let generation = state.entries.get(key).map_or(0, |e| e.generation);

        let task = tokio::spawn(async move {
            let start = Instant::now();
            let attempt = inner.options.retry.run(&task_key, || fetch());
            let result = match AssertUnwindSafe(attempt).catch_unwind().await {
                Ok(result) => result.map(|value| Arc::new(value) as Value),
                Err(_) => Err(Error::Aborted(format!("fetch for {task_key} panicked"))),
            };
            tracing::debug!(
                key = %task_key,
                elapsed_ms = start.elapsed().as_millis() as u64,
                ok = result.is_ok(),
                "fetch settled"
            );
            inner.settle(&task_key, &result, generation).await;
            result
        });

        let abort = task.abort_handle();
        let fetch = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(Error::Aborted(e.to_string())),
            }
        }
        .boxed()
        .shared();

        state.in_flight.insert(key.clone(), InFlight { fetch: fetch.clone(), abort });
        fetch
    }
}

impl Inner {
    /// Store the outcome of a fetch that started at entry `generation` and
    /// clear its in-flight marker.
    async fn settle(&self, key: &QueryKey, result: &Result<Value, Error>, generation: u64) {
        let mut state = self.state.lock().await;
        state.in_flight.remove(key);
        let now = Instant::now();

        match (result, state.entries.get_mut(key)) {
            (Ok(value), Some(entry)) => entry.refresh(Arc::clone(value), now, generation),
            (Ok(value), None) => {
                state.entries.insert(key.clone(), CacheEntry::new(Arc::clone(value), now));
            }
            (Err(err), Some(entry)) => {
                tracing::warn!(%key, "background refresh failed, keeping cached value: {}", err);
                entry.background_error = Some(err.clone());
            }
            (Err(err), None) => {
                tracing::debug!(%key, "fetch failed, nothing cached: {}", err);
            }
        }
    }

    async fn collect_garbage(&self) -> usize {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let gc_time = self.options.gc_time;
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_idle(now, gc_time));
        let evicted = before - state.entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, remaining = state.entries.len(), "evicted idle cache entries");
        }
        evicted
    }
}

fn downcast<T: Clone + 'static>(key: &QueryKey, value: &Value) -> Result<T, Error> {
    value.as_ref().downcast_ref::<T>().cloned().ok_or_else(|| {
        Error::TypeMismatch(format!("{key} does not hold a {}", std::any::type_name::<T>()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_key;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn options() -> CacheOptions {
        CacheOptions {
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(600),
            retry: RetryPolicy::exponential(3, Duration::from_millis(1_000), Duration::from_millis(30_000)),
            refetch_on_focus: false,
        }
    }

    /// Fetch function returning the call number and counting calls.
    fn counting(
        calls: &Arc<AtomicU32>,
    ) -> impl Fn() -> BoxFuture<'static, Result<u32, Error>> + Send + Sync + use<> {
        let calls = Arc::clone(calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok(n) }.boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_then_hit() {
        let cache = QueryCache::new(options());
        let calls = Arc::new(AtomicU32::new(0));
        let key = query_key!["stories", "top", 20];

        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(1));
        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_served_while_refreshing() {
        let cache = QueryCache::new(options());
        let calls = Arc::new(AtomicU32::new(0));
        let key = query_key!["stories", "top", 20];

        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(1));
        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(1));
        cache.settled(&key).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_background_refresh_keeps_value() {
        let cache = QueryCache::new(CacheOptions { retry: RetryPolicy::none(), ..options() });
        let key = query_key!["stories", "all"];

        cache.read(&key, || async { Ok::<_, Error>(5_u32) }).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;

        let served = cache.read(&key, || async { Err::<u32, _>(Error::Transport("status 503".into())) }).await;
        assert_eq!(served, Ok(5));
        cache.settled(&key).await;

        let state = cache.state(&key).await.unwrap();
        assert_eq!(state.error, Some(Error::Transport("status 503".into())));
        assert!(!state.is_fetching);

        let again: Result<u32, Error> = cache.read(&key, || async { Ok(6) }).await;
        assert_eq!(again, Ok(5));
        cache.settled(&key).await;
        assert!(cache.state(&key).await.unwrap().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_inline_fetch_retries_then_fails() {
        let cache = QueryCache::new(options());
        let calls = Arc::new(AtomicU32::new(0));
        let key = query_key!["stories", "top", 5];
        let start = Instant::now();

        let counter = Arc::clone(&calls);
        let result: Result<u32, Error> = cache
            .read(&key, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Transport("connection refused".into())) }
            })
            .await;

        assert_eq!(result, Err(Error::Transport("connection refused".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(start.elapsed() >= Duration::from_secs(7));
        assert!(cache.is_empty().await);
        assert!(!cache.is_fetching(&key).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_reads_share_one_fetch() {
        let cache = QueryCache::new(options());
        let calls = Arc::new(AtomicU32::new(0));
        let key = query_key!["stories", "top", 20];

        let slow = {
            let calls = Arc::clone(&calls);
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok::<_, Error>(vec![1_u64, 2, 3])
                }
            }
        };

        let reads = (0..8).map(|_| cache.read(&key, slow.clone()));
        let results = futures::future::join_all(reads).await;

        assert!(results.iter().all(|r| r.as_deref() == Ok(&[1, 2, 3][..])));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_read_still_populates_cache() {
        let cache = QueryCache::new(options());
        let key = query_key!["item", 1];

        let read = cache.read(&key, || async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok::<_, Error>(42_u32)
        });
        let abandoned = tokio::time::timeout(Duration::from_millis(10), read).await;
        assert!(abandoned.is_err());

        cache.settled(&key).await;
        let cached: Result<u32, Error> = cache.read(&key, || async { Ok(0) }).await;
        assert_eq!(cached, Ok(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_triggers_fresh_fetch() {
        let cache = QueryCache::new(options());
        let calls = Arc::new(AtomicU32::new(0));
        let key = query_key!["stories", "all"];

        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(1));
        assert!(cache.invalidate(&key).await);
        assert!(cache.state(&key).await.unwrap().is_stale);

        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(1));
        cache.settled(&key).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(2));
        assert!(!cache.state(&key).await.unwrap().is_stale);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_prefix() {
        let cache = QueryCache::new(options());
        for key in [query_key!["stories", "top", 10], query_key!["stories", "new", 10], query_key!["item", 1]] {
            cache.read(&key, || async { Ok::<_, Error>(0_u8) }).await.unwrap();
        }

        assert_eq!(cache.invalidate_prefix(&query_key!["stories"]).await, 2);
        assert!(!cache.state(&query_key!["item", 1]).await.unwrap().is_stale);
        assert!(!cache.invalidate(&query_key!["missing"]).await);
        assert_eq!(cache.invalidate_all().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gc_evicts_idle_entries() {
        let cache = QueryCache::new(options());
        let calls = Arc::new(AtomicU32::new(0));
        let idle = query_key!["idle"];
        let busy = query_key!["busy"];

        cache.read(&idle, counting(&calls)).await.unwrap();
        cache.read(&busy, counting(&calls)).await.unwrap();

        tokio::time::advance(Duration::from_secs(400)).await;
        cache.read(&busy, counting(&calls)).await.unwrap();
        cache.settled(&busy).await;
        tokio::time::advance(Duration::from_secs(201)).await;

        assert_eq!(cache.collect_garbage().await, 1);
        assert!(cache.state(&idle).await.is_none());
        assert!(cache.state(&busy).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_entry_is_refetched_inline() {
        let cache = QueryCache::new(options());
        let calls = Arc::new(AtomicU32::new(0));
        let key = query_key!["stories", "top", 3];

        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(1));
        tokio::time::advance(Duration::from_secs(601)).await;
        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_gc_sweeps() {
        let cache = QueryCache::new(options());
        cache.read(&query_key!["a"], || async { Ok::<_, Error>(1_u8) }).await.unwrap();
        cache.spawn_gc(Duration::from_secs(60));

        tokio::time::sleep(Duration::from_secs(700)).await;
        assert!(cache.is_empty().await);

        cache.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_gc_with_zero_period() {
        let cache = QueryCache::new(CacheOptions { gc_time: Duration::from_secs(1), ..options() });
        cache.read(&query_key!["a"], || async { Ok::<_, Error>(1_u8) }).await.unwrap();
        cache.spawn_gc(Duration::ZERO);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(cache.is_empty().await);

        cache.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_type_mismatch() {
        let cache = QueryCache::new(options());
        let key = query_key!["item", 7];
        cache.read(&key, || async { Ok::<_, Error>(1_u32) }).await.unwrap();

        let wrong: Result<String, Error> = cache.read(&key, || async { Ok(String::new()) }).await;
        assert!(matches!(wrong, Err(Error::TypeMismatch(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_peek() {
        let cache = QueryCache::new(options());
        let key = query_key!["item", 3];
        assert_eq!(cache.peek::<u32>(&key).await, Ok(None));

        cache.read(&key, || async { Ok::<_, Error>(3_u32) }).await.unwrap();
        assert_eq!(cache.peek::<u32>(&key).await, Ok(Some(3)));
        assert!(matches!(cache.peek::<String>(&key).await, Err(Error::TypeMismatch(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_forces_fetch() {
        let cache = QueryCache::new(options());
        let calls = Arc::new(AtomicU32::new(0));
        let key = query_key!["stories", "top", 1];

        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(1));
        assert_eq!(cache.refetch(&key, counting(&calls)).await, Ok(2));
        assert_eq!(cache.read(&key, counting(&calls)).await, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_regained() {
        let key = query_key!["stories", "top", 1];

        let cache = QueryCache::new(options());
        cache.read(&key, || async { Ok::<_, Error>(1_u8) }).await.unwrap();
        assert_eq!(cache.focus_regained().await, 0);

        let cache = QueryCache::new(CacheOptions { refetch_on_focus: true, ..options() });
        cache.read(&key, || async { Ok::<_, Error>(1_u8) }).await.unwrap();
        assert_eq!(cache.focus_regained().await, 1);
        assert!(cache.state(&key).await.unwrap().is_stale);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_clears_and_aborts() {
        let cache = QueryCache::new(options());
        let key = query_key!["slow"];
        cache.read(&query_key!["done"], || async { Ok::<_, Error>(1_u8) }).await.unwrap();

        let waiter = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .read(&key, || async {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Ok::<_, Error>(1_u8)
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;
        while !cache.is_fetching(&key).await {
            tokio::task::yield_now().await;
        }

        cache.shutdown().await;
        assert!(cache.is_empty().await);
        assert!(matches!(waiter.await.unwrap(), Err(Error::Aborted(_))));
    }
}
