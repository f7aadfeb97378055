//! domain_from_url and time_ago tools.
//!
//! Pure formatting helpers. No network I/O, no cache.

use pulse_client::{domain_from_url, format_time_ago, time_ago};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for domain_from_url tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DomainFromUrlParams {
    /// Absolute http(s) URL.
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DomainFromUrlOutput {
    /// Host without a leading `www.`; null when the URL does not parse.
    pub domain: Option<String>,
}

/// Input parameters for time_ago tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TimeAgoParams {
    /// Unix timestamp in seconds.
    pub time: i64,

    /// Reference time in unix seconds (default: now).
    #[serde(default)]
    pub now: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TimeAgoOutput {
    pub time_ago: String,
}

pub async fn domain_impl(params: DomainFromUrlParams) -> Result<CallToolResult, McpError> {
    json_result(&DomainFromUrlOutput { domain: domain_from_url(&params.url) })
}

pub async fn time_ago_impl(params: TimeAgoParams) -> Result<CallToolResult, McpError> {
    let label = match params.now {
        Some(now) => format_time_ago(params.time, now),
        None => time_ago(params.time),
    };
    json_result(&TimeAgoOutput { time_ago: label })
}
