//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `api_base_url` is not an http(s) URL
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - `default_limit` is 0 or above `max_limit`
    /// - `gc_time_ms` is shorter than `stale_time_ms`
    /// - `gc_interval_ms` is 0
    /// - `retry_base_delay_ms` exceeds `retry_max_delay_ms`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid { field: "api_base_url".into(), reason: "must be an http(s) URL".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::Invalid {
                field: "default_limit".into(),
                reason: format!("must be between 1 and max_limit ({})", self.max_limit),
            });
        }

        if self.gc_time_ms < self.stale_time_ms {
            return Err(ConfigError::Invalid {
                field: "gc_time_ms".into(),
                reason: "must not be shorter than stale_time_ms".into(),
            });
        }

        if self.gc_interval_ms == 0 {
            return Err(ConfigError::Invalid { field: "gc_interval_ms".into(), reason: "must be greater than 0".into() });
        }

        if self.retry_base_delay_ms > self.retry_max_delay_ms {
            return Err(ConfigError::Invalid {
                field: "retry_base_delay_ms".into(),
                reason: "must not exceed retry_max_delay_ms".into(),
            });
        }

        if self.retry_count > 10 {
            tracing::warn!(
                retry_count = self.retry_count,
                "retry_count is unusually high; failed reads will block for a long time"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_base_url() {
        let config = AppConfig { api_base_url: "ftp://example.com".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "api_base_url"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_default_limit_bounds() {
        let config = AppConfig { default_limit: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "default_limit"));

        let config = AppConfig { default_limit: 20, max_limit: 10, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "default_limit"));
    }

    #[test]
    fn test_validate_gc_shorter_than_stale() {
        let config = AppConfig { stale_time_ms: 10_000, gc_time_ms: 5_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "gc_time_ms"));
    }

    #[test]
    fn test_validate_zero_gc_interval() {
        let config = AppConfig { gc_interval_ms: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "gc_interval_ms"));
    }

    #[test]
    fn test_validate_retry_delays() {
        let config = AppConfig { retry_base_delay_ms: 60_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "retry_base_delay_ms"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { timeout_ms: 100, stale_time_ms: 0, gc_time_ms: 0, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
