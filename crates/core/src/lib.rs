//! Core types and shared functionality for hn-pulse.
//!
//! This crate provides:
//! - Hacker News item and story model
//! - In-memory query cache with staleness, eviction, retry and dedup
//! - Mutation helper that invalidates cached queries
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod mutation;

pub use cache::{CacheOptions, KeyPart, QueryCache, QueryKey, QueryState, RetryPolicy};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use model::{ContentUpload, Item, ItemKind, Story, UploadReceipt};
pub use mutation::mutate;
