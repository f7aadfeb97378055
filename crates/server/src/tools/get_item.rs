//! get_item tool implementation.
//!
//! Fetches a single Hacker News item through the query cache under
//! `["item", id]`.

use std::sync::Arc;

use chrono::Utc;
use pulse_client::{HnApi, ItemQuery, domain_from_url, format_time_ago};
use pulse_core::{Error, Item, QueryCache};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{CacheInfo, json_result};

/// Input parameters for get_item tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetItemParams {
    /// Item id (positive).
    pub id: u64,
}

/// Output structure for get_item tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetItemOutput {
    pub id: u64,
    /// story, comment, job, poll or pollopt.
    pub kind: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub by: Option<String>,
    pub score: u64,
    /// Unix seconds; absent on some deleted items.
    pub time: Option<i64>,
    pub time_ago: Option<String>,
    pub descendants: Option<u64>,
    /// Child comment ids in upstream order.
    pub kids: Vec<u64>,
    pub text: Option<String>,
    pub deleted: bool,
    pub dead: bool,
    #[serde(flatten)]
    pub cache: CacheInfo,
}

impl GetItemOutput {
    fn new(item: Item, cache: CacheInfo) -> Self {
        Self {
            kind: item.kind.as_str().to_string(),
            domain: item.url.as_deref().and_then(domain_from_url),
            time_ago: item.time.map(|t| format_time_ago(t, Utc::now().timestamp())),
            id: item.id,
            title: item.title,
            url: item.url,
            by: item.by,
            score: item.score,
            time: item.time,
            descendants: item.descendants,
            kids: item.kids.unwrap_or_default(),
            text: item.text,
            deleted: item.deleted,
            dead: item.dead,
            cache,
        }
    }
}

/// Implementation of the get_item tool.
pub async fn get_item_impl(
    cache: &QueryCache, api: Arc<dyn HnApi>, params: GetItemParams,
) -> Result<CallToolResult, McpError> {
    if params.id == 0 {
        return Err(Error::InvalidInput("id must be a positive integer".into()).into());
    }

    let result = ItemQuery::new(cache.clone(), api, params.id).fetch().await;
    let info = CacheInfo::from_result(&result);
    let item = result.into_result()?;

    json_result(&GetItemOutput::new(item, info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FakeApi, cache, output};

    #[tokio::test]
    async fn test_get_item() {
        let api = Arc::new(FakeApi::with_stories(&[(8863, 111)]));
        let result = get_item_impl(&cache(), api, GetItemParams { id: 8863 }).await.unwrap();

        let out: GetItemOutput = output(&result);
        assert_eq!(out.id, 8863);
        assert_eq!(out.kind, "story");
        assert_eq!(out.score, 111);
        assert_eq!(out.domain.as_deref(), Some("example.com"));
        assert_eq!(out.time_ago.as_deref(), Some("2h ago"));
        assert!(out.kids.is_empty());
    }

    #[tokio::test]
    async fn test_get_item_zero_id() {
        let result = get_item_impl(&cache(), Arc::new(FakeApi::default()), GetItemParams { id: 0 }).await;
        assert_eq!(result.unwrap_err().code.0, -32602);
    }

    #[tokio::test]
    async fn test_get_item_not_found() {
        let result = get_item_impl(&cache(), Arc::new(FakeApi::default()), GetItemParams { id: 404 }).await;
        let err = result.unwrap_err();
        assert_eq!(err.code.0, -32001);
        assert!(err.message.contains("404"));
    }
}
