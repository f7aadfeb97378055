//! Write operations that invalidate cached reads.

use std::future::Future;

use crate::cache::{QueryCache, QueryKey};

/// Run a write, then mark the affected queries stale.
///
/// Each affected key is matched as a prefix, so `["stories"]` covers every
/// story list. Nothing is refetched here; the next read of a marked key
/// serves the old value and refreshes in the background.
///
/// The write runs exactly once. On failure no key is touched and the error
/// is returned as is.
pub async fn mutate<T, E, Fut>(cache: &QueryCache, write: Fut, affected: &[QueryKey]) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    let value = write.await?;

    let mut marked = 0;
    for key in affected {
        marked += cache.invalidate_prefix(key).await;
    }
    tracing::debug!(keys = affected.len(), marked, "mutation succeeded, queries invalidated");

    Ok(value)
}
