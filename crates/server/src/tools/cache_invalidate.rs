//! cache_invalidate tool implementation.
//!
//! Marks cached queries stale so the next read refreshes them. Nothing is
//! fetched here.

use pulse_core::{Error, QueryCache, QueryKey};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateParams {
    /// Query key parts, e.g. `["stories"]` or `["stories", "top", 30]`.
    /// An empty key matches every query.
    pub key: Vec<serde_json::Value>,

    /// Match the key exactly instead of as a prefix.
    #[serde(default)]
    pub exact: bool,
}

/// Output from the cache_invalidate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheInvalidateOutput {
    pub key: String,
    /// Number of entries marked stale.
    pub marked: usize,
}

/// Implementation of the cache_invalidate tool.
pub async fn invalidate_impl(cache: &QueryCache, params: CacheInvalidateParams) -> Result<CallToolResult, McpError> {
    let key: QueryKey = serde_json::from_value(serde_json::Value::Array(params.key))
        .map_err(|e| Error::InvalidInput(format!("key parts must be strings or integers: {e}")))?;

    let marked =
        if params.exact { usize::from(cache.invalidate(&key).await) } else { cache.invalidate_prefix(&key).await };

    json_result(&CacheInvalidateOutput { key: key.to_string(), marked })
}
