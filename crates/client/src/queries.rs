//! Cache-backed query and mutation handles.
//!
//! Each handle pairs a [`QueryKey`] with the fetch that fills it, so callers
//! only choose *what* to read. Freshness, dedup and retry come from the
//! shared [`QueryCache`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::BoxFuture;

use pulse_core::{ContentUpload, Error, Item, QueryCache, QueryKey, Story, UploadReceipt, mutate, query_key};

use crate::hn::{HnApi, StoryFeed};
use crate::stories::fetch_stories;
use crate::upload::Uploader;

/// Outcome of a cache-backed read.
///
/// `data` and `error` can both be set: the cached value is still served when
/// its last refresh failed, in the background or through `refetch`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    pub data: Option<T>,
    pub error: Option<Error>,
    /// No data yet and a fetch is running.
    pub is_loading: bool,
    /// A fetch for this key is running.
    pub is_fetching: bool,
    pub is_stale: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T: Clone + 'static> QueryResult<T> {
    async fn settle(cache: &QueryCache, key: &QueryKey, result: Result<T, Error>) -> Self {
        let state = cache.state(key).await;
        let is_fetching = state.as_ref().is_some_and(|s| s.is_fetching);
        let is_stale = state.as_ref().is_some_and(|s| s.is_stale);
        let updated_at = state.as_ref().map(|s| s.updated_at);

        match result {
            Ok(data) => Self {
                data: Some(data),
                error: state.and_then(|s| s.error),
                is_loading: false,
                is_fetching,
                is_stale,
                updated_at,
            },
            Err(err) => {
                let data = cache.peek::<T>(key).await.ok().flatten();
                let is_loading = data.is_none() && is_fetching;
                Self { data, error: Some(err), is_loading, is_fetching, is_stale, updated_at }
            }
        }
    }
}

impl<T> QueryResult<T> {
    /// The data, or the error when there is none.
    pub fn into_result(self) -> Result<T, Error> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(err)) => Err(err),
            (None, None) => Err(Error::Aborted("query produced no data".into())),
        }
    }
}

/// Outcome of a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult<T> {
    pub data: Option<T>,
    pub error: Option<Error>,
}

impl<T> MutationResult<T> {
    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }

    pub fn into_result(self) -> Result<T, Error> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(err)) => Err(err),
            (None, None) => Err(Error::Aborted("mutation produced no data".into())),
        }
    }
}

impl<T> From<Result<T, Error>> for MutationResult<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(data) => Self { data: Some(data), error: None },
            Err(err) => Self { data: None, error: Some(err) },
        }
    }
}

/// Ranked stories of one feed, cached under `["stories", feed, limit]`.
pub struct TopStoriesQuery<A: ?Sized> {
    cache: QueryCache,
    api: Arc<A>,
    feed: StoryFeed,
    limit: usize,
    key: QueryKey,
}

impl<A: HnApi + ?Sized + 'static> TopStoriesQuery<A> {
    /// Top stories, key `["stories", "top", limit]`.
    pub fn new(cache: QueryCache, api: Arc<A>, limit: usize) -> Self {
        Self::for_feed(cache, api, StoryFeed::Top, limit)
    }

    pub fn for_feed(cache: QueryCache, api: Arc<A>, feed: StoryFeed, limit: usize) -> Self {
        let key = query_key!["stories", feed.as_str(), limit];
        Self { cache, api, feed, limit, key }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Read through the cache.
    pub async fn fetch(&self) -> QueryResult<Vec<Story>> {
        let result = self.cache.read(&self.key, self.fetcher()).await;
        QueryResult::settle(&self.cache, &self.key, result).await
    }

    /// Fetch now regardless of freshness and wait for it.
    pub async fn refetch(&self) -> QueryResult<Vec<Story>> {
        let result = self.cache.refetch(&self.key, self.fetcher()).await;
        QueryResult::settle(&self.cache, &self.key, result).await
    }

    fn fetcher(&self) -> impl Fn() -> BoxFuture<'static, Result<Vec<Story>, Error>> + Send + Sync + 'static {
        let api = Arc::clone(&self.api);
        let (feed, limit) = (self.feed, self.limit);
        move || {
            let api = Arc::clone(&api);
            Box::pin(async move { fetch_stories(api.as_ref(), feed, limit).await.map_err(Error::from) })
        }
    }
}

/// A single item, cached under `["item", id]`.
pub struct ItemQuery<A: ?Sized> {
    cache: QueryCache,
    api: Arc<A>,
    id: u64,
    key: QueryKey,
}

impl<A: HnApi + ?Sized + 'static> ItemQuery<A> {
    pub fn new(cache: QueryCache, api: Arc<A>, id: u64) -> Self {
        Self { cache, api, id, key: query_key!["item", id] }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub async fn fetch(&self) -> QueryResult<Item> {
        let api = Arc::clone(&self.api);
        let id = self.id;
        let result = self
            .cache
            .read(&self.key, move || {
                let api = Arc::clone(&api);
                async move { api.item(id).await.map_err(Error::from) }
            })
            .await;
        QueryResult::settle(&self.cache, &self.key, result).await
    }
}

/// Uploads content, then marks content and story queries stale.
pub struct UploadContentMutation<U: ?Sized> {
    cache: QueryCache,
    uploader: Arc<U>,
}

impl<U: Uploader + ?Sized> UploadContentMutation<U> {
    pub fn new(cache: QueryCache, uploader: Arc<U>) -> Self {
        Self { cache, uploader }
    }

    /// Key prefixes invalidated by a successful upload.
    pub fn affected_keys() -> [QueryKey; 2] {
        [query_key!["content"], query_key!["stories"]]
    }

    /// Validate and send `content`. Invalid content never reaches the
    /// uploader.
    pub async fn upload(&self, content: ContentUpload) -> MutationResult<UploadReceipt> {
        if let Err(err) = content.validate() {
            return MutationResult { data: None, error: Some(err) };
        }

        let write = async { self.uploader.upload(&content).await.map_err(Error::from) };
        mutate(&self.cache, write, &Self::affected_keys()).await.into()
    }
}
