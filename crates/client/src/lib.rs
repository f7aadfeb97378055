//! Client code for hn-pulse.
//!
//! This crate provides the Hacker News fetchers, story ranking, the content
//! upload client, display helpers and the cache-backed query handles shared
//! by the server.

pub mod format;
pub mod hn;
pub mod queries;
pub mod stories;
pub mod upload;

pub use format::{domain_from_url, format_time_ago, time_ago};
pub use hn::{HnApi, HnClient, HnConfig, HnError, StoryFeed};
pub use queries::{ItemQuery, MutationResult, QueryResult, TopStoriesQuery, UploadContentMutation};
pub use stories::{fetch_stories, fetch_top_stories, rank};
pub use upload::{ContentClient, UploadError, Uploader};
