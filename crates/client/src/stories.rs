//! Story list retrieval and ranking.
//!
//! Fetches a feed's candidate ids, loads the first `limit` items
//! concurrently, keeps the ones that are stories and sorts them by score.
//! A failed item lookup drops that item only; the list as a whole fails
//! only when the id list itself cannot be fetched.

use std::time::Instant;

use futures_util::future::join_all;

use pulse_core::Story;

use crate::hn::{HnApi, HnError, StoryFeed};

/// Top stories ranked by score, at most `limit` of them.
pub async fn fetch_top_stories<A: HnApi + ?Sized>(api: &A, limit: usize) -> Result<Vec<Story>, HnError> {
    fetch_stories(api, StoryFeed::Top, limit).await
}

/// Stories from `feed` ranked by score, at most `limit` of them.
///
/// The result is shorter than `limit` when the feed is short, when item
/// lookups fail, or when items are not stories.
pub async fn fetch_stories<A: HnApi + ?Sized>(api: &A, feed: StoryFeed, limit: usize) -> Result<Vec<Story>, HnError> {
    let start = Instant::now();
    let mut ids = api.story_ids(feed).await?;
    ids.truncate(limit);

    let results = join_all(ids.iter().map(|&id| api.item(id))).await;

    let mut failed = 0;
    let mut skipped = 0;
    let mut stories: Vec<Story> = results
        .into_iter()
        .zip(&ids)
        .filter_map(|(result, id)| match result {
            Ok(item) => match Story::try_from(item) {
                Ok(story) => Some(story),
                Err(reason) => {
                    tracing::debug!("skipping item {}: {}", id, reason);
                    skipped += 1;
                    None
                }
            },
            Err(e) => {
                tracing::warn!("dropping item {} from {} stories: {}", id, feed, e);
                failed += 1;
                None
            }
        })
        .collect();

    rank(&mut stories);

    tracing::debug!(
        %feed,
        requested = limit,
        returned = stories.len(),
        failed,
        skipped,
        "ranked stories in {:?}",
        start.elapsed()
    );

    Ok(stories)
}

/// Sort by score, highest first. Equal scores keep their relative order.
pub fn rank(stories: &mut [Story]) {
    stories.sort_by(|a, b| b.score.cmp(&a.score));
}
