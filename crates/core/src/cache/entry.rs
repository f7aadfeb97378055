//! Cache entries and their freshness rules.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use crate::Error;

/// Type-erased cached value.
pub(crate) type Value = Arc<dyn Any + Send + Sync>;

/// A cached query result.
pub(crate) struct CacheEntry {
    pub(crate) value: Value,
    pub(crate) fetched_at: Instant,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) last_accessed: Instant,
    pub(crate) invalidated: bool,
    /// Bumped by every invalidation.
    pub(crate) generation: u64,
    pub(crate) background_error: Option<Error>,
}

impl CacheEntry {
    pub(crate) fn new(value: Value, now: Instant) -> Self {
        Self {
            value,
            fetched_at: now,
            updated_at: Utc::now(),
            last_accessed: now,
            invalidated: false,
            generation: 0,
            background_error: None,
        }
    }

    pub(crate) fn invalidate(&mut self) {
        self.invalidated = true;
        self.generation += 1;
    }

    /// Replace the value after a successful fetch that started at
    /// `generation`. An invalidation since then keeps the entry stale.
    pub(crate) fn refresh(&mut self, value: Value, now: Instant, generation: u64) {
        self.value = value;
        self.fetched_at = now;
        self.updated_at = Utc::now();
        self.invalidated = self.generation != generation;
        self.background_error = None;
    }

    /// Stale once invalidated or older than `stale_time`.
    pub(crate) fn is_stale(&self, now: Instant, stale_time: Duration) -> bool {
        self.invalidated || now.saturating_duration_since(self.fetched_at) >= stale_time
    }

    /// Evictable once unused for longer than `gc_time`.
    pub(crate) fn is_idle(&self, now: Instant, gc_time: Duration) -> bool {
        now.saturating_duration_since(self.last_accessed) > gc_time
    }

    pub(crate) fn state(&self, now: Instant, stale_time: Duration, is_fetching: bool) -> QueryState {
        QueryState {
            updated_at: self.updated_at,
            age_ms: now.saturating_duration_since(self.fetched_at).as_millis() as u64,
            is_stale: self.is_stale(now, stale_time),
            is_invalidated: self.invalidated,
            is_fetching,
            error: self.background_error.clone(),
        }
    }
}

/// Snapshot of a cached query, for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryState {
    pub updated_at: DateTime<Utc>,
    pub age_ms: u64,
    pub is_stale: bool,
    pub is_invalidated: bool,
    pub is_fetching: bool,
    /// Last failed background refresh, cleared by the next success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Error>,
}
