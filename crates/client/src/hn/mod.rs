//! Hacker News Firebase API client.
//!
//! ### Endpoints
//!
//! - `GET {base}/topstories.json` (and `new`, `best`, `ask`, `show`, `job`
//!   lists): ordered array of item ids.
//! - `GET {base}/item/{id}.json`: item record, or `null` when absent.
//!
//! No caching or retry happens here; both belong to the query cache.

pub mod error;

pub use error::HnError;

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::{StatusCode, header};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use pulse_core::{AppConfig, Item};

/// Default base URL for the Hacker News API.
const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default user agent.
const DEFAULT_USER_AGENT: &str = "hn-pulse/0.1";

/// Story lists published by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoryFeed {
    #[default]
    Top,
    New,
    Best,
    Ask,
    Show,
    Job,
}

impl StoryFeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryFeed::Top => "top",
            StoryFeed::New => "new",
            StoryFeed::Best => "best",
            StoryFeed::Ask => "ask",
            StoryFeed::Show => "show",
            StoryFeed::Job => "job",
        }
    }

    fn path(&self) -> String {
        format!("{}stories.json", self.as_str())
    }
}

impl fmt::Display for StoryFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of story ids and items.
///
/// [`HnClient`] talks to the real API; the ranking pipeline only needs this
/// trait.
#[async_trait::async_trait]
pub trait HnApi: Send + Sync {
    /// Ordered candidate ids for `feed`.
    async fn story_ids(&self, feed: StoryFeed) -> Result<Vec<u64>, HnError>;

    /// A single item by id.
    async fn item(&self, id: u64) -> Result<Item, HnError>;

    async fn top_story_ids(&self) -> Result<Vec<u64>, HnError> {
        self.story_ids(StoryFeed::Top).await
    }
}

/// Hacker News client configuration.
#[derive(Debug, Clone)]
pub struct HnConfig {
    /// Base URL (default: https://hacker-news.firebaseio.com/v0).
    pub base_url: String,
    /// Request timeout (default: 10s).
    pub timeout: Duration,
    /// User-agent string (default: hn-pulse/0.x).
    pub user_agent: String,
}

impl Default for HnConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl From<&AppConfig> for HnConfig {
    fn from(config: &AppConfig) -> Self {
        Self { base_url: config.api_base_url.clone(), timeout: config.timeout(), user_agent: config.user_agent.clone() }
    }
}

/// Hacker News API client.
#[derive(Debug, Clone)]
pub struct HnClient {
    http: reqwest::Client,
    config: HnConfig,
}

impl HnClient {
    /// Create a new client with the given configuration.
    pub fn new(config: HnConfig) -> Result<Self, HnError> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .build()?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &HnConfig {
        &self.config
    }

    /// GET a JSON document. `Ok(None)` for a 404 or a `null` body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, HnError> {
        let start = Instant::now();
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        let response = self.http.get(&url).header(header::ACCEPT, "application/json").send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("{} returned 404", url);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(HnError::HttpError { status: status.as_u16() });
        }

        let bytes = response.bytes().await?;
        let value: Option<T> = serde_json::from_slice(&bytes).map_err(|e| HnError::Parse(e.to_string()))?;

        tracing::debug!("fetched {} in {:?} ({} bytes)", url, start.elapsed(), bytes.len());

        Ok(value)
    }
}

#[async_trait::async_trait]
impl HnApi for HnClient {
    async fn story_ids(&self, feed: StoryFeed) -> Result<Vec<u64>, HnError> {
        self.get_json(&feed.path())
            .await?
            .ok_or_else(|| HnError::Parse(format!("{feed} stories returned no id list")))
    }

    async fn item(&self, id: u64) -> Result<Item, HnError> {
        if id == 0 {
            return Err(HnError::InvalidId);
        }

        self.get_json(&format!("item/{id}.json")).await?.ok_or(HnError::NotFound { id })
    }
}
