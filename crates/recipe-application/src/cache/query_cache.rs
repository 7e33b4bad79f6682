use recipe_core::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::key::{CacheKey, CacheTarget};

/// Freshness and retry policy for a [`QueryCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Entries older than this are refetched on the next read.
    pub stale_after: Duration,
    /// Extra attempts after a failed fetch. Zero disables retries.
    pub retries: u32,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(300),
            retries: 0,
        }
    }
}

struct CacheEntry<V> {
    value: V,
    fetched_at: Instant,
    stale: bool,
}

impl<V> CacheEntry<V> {
    fn fresh(value: V) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            stale: false,
        }
    }

    fn is_stale(&self, policy: &CachePolicy) -> bool {
        self.stale || self.fetched_at.elapsed() >= policy.stale_after
    }
}

/// Keyed store of remote results.
///
/// Holds at most one entry per [`CacheKey`]. A read serves the entry while it
/// is fresh and otherwise runs the fetcher and overwrites the entry with the
/// result. Invalidation only flags entries stale, so their last value stays
/// available through [`QueryCache::peek`] until a refetch replaces it.
pub struct QueryCache<V> {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry<V>>>>,
    policy: CachePolicy,
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates an empty cache with the default policy.
    pub fn new() -> Self {
        Self::with_policy(CachePolicy::default())
    }

    pub fn with_policy(policy: CachePolicy) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            policy,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Returns the cached value for `key` when fresh, otherwise fetches it.
    ///
    /// A failed fetch leaves any previous entry in place and returns the
    /// error unchanged once the configured retries are exhausted.
    pub async fn read<F, Fut>(&self, key: CacheKey, mut fetcher: F) -> Result<V>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        if let Some(value) = self.fresh(&key).await {
            tracing::debug!("[QueryCache] hit: {:?}", key);
            return Ok(value);
        }

        tracing::debug!("[QueryCache] miss: {:?}", key);
        let mut attempt = 0;
        loop {
            match fetcher().await {
                Ok(value) => {
                    self.set(key, value.clone()).await;
                    return Ok(value);
                }
                Err(err) if attempt < self.policy.retries => {
                    attempt += 1;
                    tracing::warn!(
                        "[QueryCache] fetch failed for {:?} (attempt {}): {}",
                        key,
                        attempt,
                        err
                    );
                }
                Err(err) => {
                    tracing::debug!("[QueryCache] fetch failed for {:?}: {}", key, err);
                    return Err(err);
                }
            }
        }
    }

    /// Writes a value directly, marking it fresh.
    pub async fn set(&self, key: CacheKey, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(key, CacheEntry::fresh(value));
    }

    /// Returns the last stored value regardless of freshness.
    pub async fn peek(&self, key: &CacheKey) -> Option<V> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// `Some(true)` when the entry exists but would be refetched.
    pub async fn is_stale(&self, key: &CacheKey) -> Option<bool> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.is_stale(&self.policy))
    }

    /// Flags every entry matching `target` stale. Returns how many matched.
    pub async fn invalidate(&self, target: &CacheTarget) -> usize {
        let mut entries = self.entries.write().await;
        let mut count = 0;
        for (key, entry) in entries.iter_mut() {
            if target.matches(key) {
                entry.stale = true;
                count += 1;
            }
        }
        tracing::debug!("[QueryCache] invalidated {} entries for {:?}", count, target);
        count
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn fresh(&self, key: &CacheKey) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_stale(&self.policy))
            .map(|entry| entry.value.clone())
    }
}

impl<V> Default for QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::key::RecipeKeys;
    use recipe_core::error::RecipeError;
    use recipe_core::search::SearchParams;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: &'static str,
    ) -> impl FnMut() -> std::future::Ready<Result<String>> {
        let calls = calls.clone();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(value.to_string()))
        }
    }

    #[tokio::test]
    async fn test_read_caches_first_result() {
        let cache = QueryCache::new();
        let key = RecipeKeys::default().detail(1);
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.read(key.clone(), counting_fetch(&calls, "a")).await.unwrap();
        let second = cache.read(key, counting_fetch(&calls, "b")).await.unwrap();

        assert_eq!(first, "a");
        assert_eq!(second, "a");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidated_entry_is_refetched() {
        let cache = QueryCache::new();
        let keys = RecipeKeys::default();
        let key = keys.list(&SearchParams::default());
        let calls = Arc::new(AtomicUsize::new(0));

        cache.read(key.clone(), counting_fetch(&calls, "old")).await.unwrap();
        assert_eq!(cache.invalidate(&keys.lists()).await, 1);
        assert_eq!(cache.is_stale(&key).await, Some(true));

        let value = cache.read(key.clone(), counting_fetch(&calls, "new")).await.unwrap();
        assert_eq!(value, "new");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.is_stale(&key).await, Some(false));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_value() {
        let cache = QueryCache::new();
        let key = RecipeKeys::default().detail(3);
        cache.set(key.clone(), "kept".to_string()).await;
        cache.invalidate(&CacheTarget::Exact(key.clone())).await;

        let result = cache
            .read(key.clone(), || async { Err::<String, _>(RecipeError::http(503, "down")) })
            .await;

        assert_eq!(result.unwrap_err(), RecipeError::http(503, "down"));
        assert_eq!(cache.peek(&key).await.as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_failed_fetch_creates_no_entry() {
        let cache: QueryCache<String> = QueryCache::new();
        let key = RecipeKeys::default().detail(4);

        let result = cache
            .read(key.clone(), || async { Err(RecipeError::transport("offline")) })
            .await;

        assert!(result.is_err());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let cache: QueryCache<String> = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let _ = cache
            .read(RecipeKeys::default().detail(5), move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(RecipeError::transport("offline")) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_follow_policy() {
        let cache = QueryCache::with_policy(CachePolicy {
            retries: 2,
            ..Default::default()
        });
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let value = cache
            .read(RecipeKeys::default().detail(6), move || {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(RecipeError::transport("flaky"))
                    } else {
                        Ok("third time".to_string())
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "third time");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_stale_window() {
        let cache = QueryCache::with_policy(CachePolicy {
            stale_after: Duration::from_secs(60),
            retries: 0,
        });
        let key = RecipeKeys::default().detail(8);
        cache.set(key.clone(), "v1".to_string()).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.is_stale(&key).await, Some(false));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.is_stale(&key).await, Some(true));
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let cache = QueryCache::new();
        let keys = RecipeKeys::default();
        cache.set(keys.detail(1), 1u32).await;
        cache.set(keys.list(&SearchParams::default()), 2u32).await;

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }
}
