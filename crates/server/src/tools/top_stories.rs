//! top_stories tool implementation.
//!
//! Reads a ranked story list through the query cache and decorates each
//! story with its domain and a relative age.

use std::sync::Arc;

use chrono::Utc;
use pulse_client::{HnApi, StoryFeed, TopStoriesQuery, domain_from_url, format_time_ago};
use pulse_core::{AppConfig, QueryCache, Story};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{CacheInfo, json_result};

/// Input parameters for top_stories tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TopStoriesParams {
    /// Maximum number of stories (default 30, capped at the configured maximum).
    #[serde(default)]
    pub limit: Option<usize>,

    /// Which list to rank (default: "top").
    #[serde(default)]
    pub feed: StoryFeed,
}

/// A ranked story as shown to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StoryView {
    pub id: u64,
    pub title: String,
    pub url: String,
    /// Host of `url` without a leading `www.`.
    pub domain: Option<String>,
    pub score: u64,
    pub by: String,
    /// Unix seconds.
    pub time: i64,
    /// Relative age such as "5m ago".
    pub time_ago: String,
    /// Comment count.
    pub descendants: u64,
}

impl StoryView {
    fn new(story: Story, now: i64) -> Self {
        Self {
            domain: domain_from_url(&story.url),
            time_ago: format_time_ago(story.time, now),
            id: story.id,
            title: story.title,
            url: story.url,
            score: story.score,
            by: story.by,
            time: story.time,
            descendants: story.descendants,
        }
    }
}

/// Output structure for top_stories tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TopStoriesOutput {
    pub feed: StoryFeed,
    /// Limit actually applied.
    pub limit: usize,
    /// Number of stories returned; may be below `limit`.
    pub count: usize,
    pub stories: Vec<StoryView>,
    #[serde(flatten)]
    pub cache: CacheInfo,
}

/// Implementation of the top_stories tool.
pub async fn top_stories_impl(
    cache: &QueryCache, api: Arc<dyn HnApi>, config: &AppConfig, params: TopStoriesParams,
) -> Result<CallToolResult, McpError> {
    let limit = config.effective_limit(params.limit);
    let query = TopStoriesQuery::for_feed(cache.clone(), api, params.feed, limit);

    let result = query.fetch().await;
    let info = CacheInfo::from_result(&result);
    let stories = result.into_result()?;

    let now = Utc::now().timestamp();
    let stories: Vec<StoryView> = stories.into_iter().map(|s| StoryView::new(s, now)).collect();

    tracing::debug!(feed = ?params.feed, limit, count = stories.len(), stale = info.stale, "top_stories served");

    json_result(&TopStoriesOutput { feed: params.feed, limit, count: stories.len(), stories, cache: info })
}
