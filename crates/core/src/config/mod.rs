//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (HN_PULSE_*)
//! 2. TOML config file (if HN_PULSE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheOptions, RetryPolicy};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (HN_PULSE_*)
/// 2. TOML config file (if HN_PULSE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the Hacker News API.
    ///
    /// Set via HN_PULSE_API_BASE_URL environment variable.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Endpoint receiving content uploads.
    ///
    /// Set via HN_PULSE_UPLOAD_URL environment variable.
    #[serde(default)]
    pub upload_url: Option<String>,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via HN_PULSE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via HN_PULSE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Number of stories returned when the caller gives no limit.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper bound accepted for a story limit.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Age after which a cached value is served stale while refreshing.
    #[serde(default = "default_stale_time_ms")]
    pub stale_time_ms: u64,

    /// Idle time after which a cache entry is evicted.
    #[serde(default = "default_gc_time_ms")]
    pub gc_time_ms: u64,

    /// Interval of the background eviction sweep.
    #[serde(default = "default_gc_interval_ms")]
    pub gc_interval_ms: u64,

    /// Automatic retries for a failed cache fetch.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Delay before the first retry; doubles per attempt.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Cap on the retry delay.
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    /// Whether regaining focus marks every cached query stale.
    #[serde(default)]
    pub refetch_on_focus: bool,
}

fn default_api_base_url() -> String {
    "https://hacker-news.firebaseio.com/v0".into()
}

fn default_user_agent() -> String {
    "hn-pulse/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_limit() -> usize {
    30
}

fn default_max_limit() -> usize {
    500
}

fn default_stale_time_ms() -> u64 {
    5 * 60 * 1000
}

fn default_gc_time_ms() -> u64 {
    10 * 60 * 1000
}

fn default_gc_interval_ms() -> u64 {
    60 * 1000
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1_000
}

fn default_retry_max_delay_ms() -> u64 {
    30_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            upload_url: None,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            stale_time_ms: default_stale_time_ms(),
            gc_time_ms: default_gc_time_ms(),
            gc_interval_ms: default_gc_interval_ms(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            refetch_on_focus: false,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Interval of the eviction sweep.
    pub fn gc_interval(&self) -> Duration {
        Duration::from_millis(self.gc_interval_ms)
    }

    /// Query cache options derived from this configuration.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            stale_time: Duration::from_millis(self.stale_time_ms),
            gc_time: Duration::from_millis(self.gc_time_ms),
            retry: RetryPolicy::exponential(
                self.retry_count,
                Duration::from_millis(self.retry_base_delay_ms),
                Duration::from_millis(self.retry_max_delay_ms),
            ),
            refetch_on_focus: self.refetch_on_focus,
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `HN_PULSE_`
    /// 2. TOML file from `HN_PULSE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("HN_PULSE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("HN_PULSE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Upload endpoint, required only when content is uploaded.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no upload URL is configured.
    pub fn require_upload_url(&self) -> Result<&str, ConfigError> {
        self.upload_url.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "upload_url".into(),
            hint: "Set HN_PULSE_UPLOAD_URL environment variable".into(),
        })
    }

    /// Clamp a requested story limit to the configured bounds.
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}
