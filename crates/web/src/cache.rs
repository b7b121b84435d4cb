//! Bounded in-memory cache with a TTL per entry.
//!
//! Each entry carries its own time-to-live. A read after the TTL has elapsed
//! misses, and moka also reclaims expired entries during its own maintenance.
//! Capacity is bounded by entry count.

use std::hash::Hash;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    ttl: Duration,
}

/// Expiry policy that reads the TTL stored with each entry.
struct PerEntryTtl;

impl<K, V> Expiry<K, Entry<V>> for PerEntryTtl {
    fn expire_after_create(&self, _key: &K, entry: &Entry<V>, _now: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &K,
        entry: &Entry<V>,
        _now: Instant,
        _remaining: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// A concurrent TTL cache keyed by `K` (`String` by default).
#[derive(Clone)]
pub struct TtlCache<V, K = String>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Cache<K, Entry<V>>,
}

impl<V, K> TtlCache<V, K>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache holding at most `max_capacity` entries.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { inner }
    }

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    pub async fn set(&self, key: K, value: V, ttl: Duration) {
        self.inner.insert(key, Entry { value, ttl }).await;
    }

    /// The value under `key`, if present and not expired.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.inner.get(key).await.map(|entry| entry.value)
    }

    /// Remove one entry.
    pub async fn delete(&self, key: &K) {
        self.inner.invalidate(key).await;
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        self.inner.invalidate_all();
        self.inner.run_pending_tasks().await;
    }

    /// Approximate number of live entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_before_ttl_returns_value() {
        let cache: TtlCache<String> = TtlCache::new(10);
        cache
            .set("restaurant-settings".to_owned(), "مطعمنا".to_owned(), Duration::from_secs(60))
            .await;

        assert_eq!(
            cache.get(&"restaurant-settings".to_owned()).await.as_deref(),
            Some("مطعمنا")
        );
    }

    #[tokio::test]
    async fn test_get_after_ttl_misses() {
        let cache: TtlCache<u32> = TtlCache::new(10);
        cache.set("short".to_owned(), 1, Duration::from_millis(50)).await;
        cache.set("long".to_owned(), 2, Duration::from_secs(60)).await;

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get(&"short".to_owned()).await, None);
        assert_eq!(cache.get(&"long".to_owned()).await, Some(2));
    }

    #[tokio::test]
    async fn test_set_replaces_value_and_ttl() {
        let cache: TtlCache<u32> = TtlCache::new(10);
        cache.set("k".to_owned(), 1, Duration::from_millis(50)).await;
        cache.set("k".to_owned(), 2, Duration::from_secs(60)).await;

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get(&"k".to_owned()).await, Some(2));
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache: TtlCache<u32> = TtlCache::new(10);
        for (i, key) in ["a", "b", "c"].into_iter().enumerate() {
            cache
                .set(key.to_owned(), u32::try_from(i).unwrap(), Duration::from_secs(60))
                .await;
        }

        cache.delete(&"a".to_owned()).await;
        assert_eq!(cache.get(&"a".to_owned()).await, None);
        assert_eq!(cache.get(&"b".to_owned()).await, Some(1));

        cache.clear().await;
        assert_eq!(cache.get(&"b".to_owned()).await, None);
        assert_eq!(cache.get(&"c".to_owned()).await, None);
    }
}
