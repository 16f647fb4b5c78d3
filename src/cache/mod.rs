//! Expiring in-memory cache for search results.
//!
//! One instance sits in front of each kind's repository. Entries live for a
//! fixed TTL; an expired entry is evicted by the `get` that finds it.
//!
//! `invalidate_all` also bumps a generation counter. A reader that captured
//! the generation before querying the store stores its result with
//! `put_if_generation`, which refuses the write once the cache has been
//! invalidated in between.

use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::constants::cache::DEFAULT_TTL_SECONDS;

pub const DEFAULT_TTL: Duration = Duration::from_secs(DEFAULT_TTL_SECONDS);

#[async_trait]
pub trait SearchCache<K, V>: Send + Sync
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// `None` when the key was never stored or its entry has expired.
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores `value`, replacing any entry for `key` and restarting its TTL.
    async fn put(&self, key: K, value: V);

    /// Stores `value` only if no `invalidate_all` happened since
    /// `generation` was read. Returns whether the entry was stored.
    async fn put_if_generation(&self, key: K, value: V, generation: u64) -> bool;

    /// Current invalidation generation.
    async fn generation(&self) -> u64;

    async fn invalidate(&self, key: &K);

    /// Drops every entry and starts a new generation.
    async fn invalidate_all(&self);

    /// Stored entries, including expired ones not yet evicted.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

pub struct InMemorySearchCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    /// Only changed while `entries` is locked.
    generation: AtomicU64,
    ttl: Duration,
}

impl<K, V> InMemorySearchCache<K, V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            ttl,
        }
    }
}

impl<K, V> Default for InMemorySearchCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl<K, V> SearchCache<K, V> for InMemorySearchCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
            return None;
        }

        entries.get(key).map(|entry| entry.value.clone())
    }

    async fn put(&self, key: K, value: V) {
        let expires_at = Instant::now() + self.ttl;
        self.entries
            .lock()
            .await
            .insert(key, CacheEntry { value, expires_at });
    }

    async fn put_if_generation(&self, key: K, value: V, generation: u64) -> bool {
        let mut entries = self.entries.lock().await;
        if self.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        let expires_at = Instant::now() + self.ttl;
        entries.insert(key, CacheEntry { value, expires_at });
        true
    }

    async fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    async fn invalidate(&self, key: &K) {
        self.entries.lock().await.remove(key);
    }

    async fn invalidate_all(&self) {
        let mut entries = self.entries.lock().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        entries.clear();
    }

    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cache() -> InMemorySearchCache<String, u32> {
        InMemorySearchCache::new(Duration::from_secs(600))
    }

    #[tokio::test]
    async fn get_returns_what_was_put() {
        let cache = cache();
        assert_eq!(cache.get(&"a".to_string()).await, None);

        cache.put("a".to_string(), 1).await;
        assert_eq!(cache.get(&"a".to_string()).await, Some(1));

        cache.put("a".to_string(), 2).await;
        assert_eq!(cache.get(&"a".to_string()).await, Some(2));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_at_ttl_and_is_evicted() {
        let cache = cache();
        cache.put("a".to_string(), 1).await;

        tokio::time::advance(Duration::from_secs(599)).await;
        assert_eq!(cache.get(&"a".to_string()).await, Some(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&"a".to_string()).await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn put_restarts_ttl() {
        let cache = cache();
        cache.put("a".to_string(), 1).await;
        tokio::time::advance(Duration::from_secs(500)).await;
        cache.put("a".to_string(), 2).await;
        tokio::time::advance(Duration::from_secs(500)).await;

        assert_eq!(cache.get(&"a".to_string()).await, Some(2));
    }

    #[tokio::test]
    async fn invalidation_removes_entries() {
        let cache = cache();
        cache.put("a".to_string(), 1).await;
        cache.put("b".to_string(), 2).await;

        cache.invalidate(&"a".to_string()).await;
        assert_eq!(cache.get(&"a".to_string()).await, None);
        assert_eq!(cache.get(&"b".to_string()).await, Some(2));

        cache.invalidate_all().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn put_after_invalidation_is_refused() {
        let cache = cache();
        let generation = cache.generation().await;

        assert!(cache.put_if_generation("a".to_string(), 1, generation).await);
        cache.invalidate_all().await;
        assert!(!cache.put_if_generation("b".to_string(), 2, generation).await);
        assert!(cache.is_empty().await);

        let current = cache.generation().await;
        assert_ne!(current, generation);
        assert!(cache.put_if_generation("b".to_string(), 2, current).await);
        assert_eq!(cache.get(&"b".to_string()).await, Some(2));
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_lose_entries() {
        let cache = Arc::new(cache());
        let mut handles = Vec::new();
        for i in 0..32u32 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.put(format!("k{i}"), i).await;
                cache.get(&format!("k{i}")).await
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap(), Some(u32::try_from(i).unwrap()));
        }
        assert_eq!(cache.len().await, 32);
    }
}
