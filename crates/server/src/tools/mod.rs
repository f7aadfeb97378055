//! MCP tool implementations.
//!
//! This module contains all tools exposed by the hn-pulse server.

pub mod cache_invalidate;
pub mod get_item;
pub mod helpers;
pub mod top_stories;
pub mod upload_content;

pub use cache_invalidate::{CacheInvalidateParams, invalidate_impl};
pub use get_item::{GetItemParams, get_item_impl};
pub use helpers::{DomainFromUrlParams, TimeAgoParams, domain_impl, time_ago_impl};
pub use top_stories::{TopStoriesParams, top_stories_impl};
pub use upload_content::{UploadContentParams, upload_impl};

use pulse_client::QueryResult;
use pulse_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Cache status attached to read tool outputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheInfo {
    /// The value is older than the stale time or was invalidated.
    pub stale: bool,
    /// A fetch for this query is running.
    pub fetching: bool,
    /// RFC 3339 time of the last successful fetch.
    pub updated_at: Option<String>,
    /// Error from the last failed background refresh, if any.
    pub background_error: Option<String>,
}

impl CacheInfo {
    pub fn from_result<T>(result: &QueryResult<T>) -> Self {
        Self {
            stale: result.is_stale,
            fetching: result.is_fetching,
            updated_at: result.updated_at.map(|t| t.to_rfc3339()),
            background_error: result.data.as_ref().and(result.error.as_ref()).map(ToString::to_string),
        }
    }
}

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod testing {
    use pulse_client::{HnApi, HnError, StoryFeed};
    use pulse_core::{AppConfig, CacheOptions, Item, ItemKind, QueryCache, RetryPolicy};
    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// In-memory Hacker News API.
    #[derive(Default)]
    pub struct FakeApi {
        pub ids: Vec<u64>,
        pub items: HashMap<u64, Item>,
        pub list_fails: bool,
        pub list_calls: AtomicU32,
    }

    impl FakeApi {
        pub fn with_stories(stories: &[(u64, u64)]) -> Self {
            Self {
                ids: stories.iter().map(|(id, _)| *id).collect(),
                items: stories.iter().map(|&(id, score)| (id, story(id, score))).collect(),
                ..Default::default()
            }
        }
    }

    pub fn story(id: u64, score: u64) -> Item {
        Item {
            id,
            kind: ItemKind::Story,
            title: Some(format!("Story {id}")),
            url: Some(format!("https://www.example.com/{id}")),
            score,
            by: Some("pg".into()),
            time: Some(chrono::Utc::now().timestamp() - 7200),
            descendants: Some(3),
            kids: None,
            text: None,
            deleted: false,
            dead: false,
        }
    }

    #[async_trait::async_trait]
    impl HnApi for FakeApi {
        async fn story_ids(&self, _feed: StoryFeed) -> Result<Vec<u64>, HnError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.list_fails {
                return Err(HnError::HttpError { status: 503 });
            }
            Ok(self.ids.clone())
        }

        async fn item(&self, id: u64) -> Result<Item, HnError> {
            self.items.get(&id).cloned().ok_or(HnError::NotFound { id })
        }
    }

    pub fn cache() -> QueryCache {
        QueryCache::new(CacheOptions {
            stale_time: Duration::from_secs(60),
            gc_time: Duration::from_secs(600),
            retry: RetryPolicy::none(),
            refetch_on_focus: false,
        })
    }

    pub fn config() -> AppConfig {
        AppConfig::default()
    }

    /// Parse the JSON text content of a tool result.
    pub fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
