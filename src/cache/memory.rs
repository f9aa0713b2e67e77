//! In-process result cache.
//!
//! An LRU map guarded by a `parking_lot` lock, with a deadline stored next
//! to each value. Expired entries are dropped lazily on access. Suitable for
//! single-instance deployments and tests.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::RwLock;

use super::{CacheError, CacheKey, ResultCache};

/// Configuration for the in-process cache.
#[derive(Debug, Clone)]
pub struct MemoryCacheConfig {
    /// Maximum number of entries in the cache.
    pub max_entries: usize,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process result cache with per-entry expiration.
pub struct InMemoryResultCache {
    entries: RwLock<LruCache<CacheKey, Entry>>,
}

impl InMemoryResultCache {
    /// Create a cache with default configuration.
    pub fn new() -> Self {
        Self::with_config(MemoryCacheConfig::default())
    }

    /// Create a cache with custom configuration.
    pub fn with_config(config: MemoryCacheConfig) -> Self {
        let size = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: RwLock::new(LruCache::new(size)),
        }
    }

    /// Get cache statistics.
    ///
    /// `len` may include expired entries not yet evicted.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        CacheStats {
            len: entries.len(),
            cap: entries.cap().get(),
        }
    }

    /// Remaining lifetime of `key`, if present and unexpired.
    pub fn ttl(&self, key: &CacheKey) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .peek(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at - now)
    }
}

impl Default for InMemoryResultCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultCache for InMemoryResultCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write();

        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.write().put(key.clone(), entry);
        Ok(())
    }

    async fn refresh_ttl(&self, key: &CacheKey, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write();

        if let Some(entry) = entries.peek_mut(key) {
            if !entry.is_expired(now) {
                entry.expires_at = now + ttl;
            }
        }
        Ok(())
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        self.entries.write().clear();
        Ok(())
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    /// Current number of entries in the cache.
    pub len: usize,
    /// Maximum capacity of the cache.
    pub cap: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AirportCode;

    fn key(a: &str, b: &str) -> CacheKey {
        CacheKey::for_pair(&AirportCode::parse(a).unwrap(), &AirportCode::parse(b).unwrap())
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = InMemoryResultCache::new();
        let k = key("JFK", "LAX");

        assert_eq!(cache.get(&k).await.unwrap(), None);
        cache.set(&k, "[\"JFK\",\"LAX\"]", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get(&k).await.unwrap().as_deref(), Some("[\"JFK\",\"LAX\"]"));
        assert_eq!(cache.stats().len, 1);
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let cache = InMemoryResultCache::new();
        let k = key("JFK", "LAX");

        cache.set(&k, "v", Duration::from_millis(20)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(cache.get(&k).await.unwrap(), None);
        assert_eq!(cache.stats().len, 0);
    }

    #[tokio::test]
    async fn test_refresh_extends_lifetime() {
        let cache = InMemoryResultCache::new();
        let k = key("JFK", "LAX");

        cache.set(&k, "v", Duration::from_millis(10)).await.unwrap();
        cache.refresh_ttl(&k, Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.get(&k).await.unwrap().as_deref(), Some("v"));
        assert!(cache.ttl(&k).unwrap() > Duration::from_secs(50));
    }

    #[tokio::test]
    async fn test_refresh_absent_key_is_noop() {
        let cache = InMemoryResultCache::new();
        cache.refresh_ttl(&key("JFK", "LAX"), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.stats().len, 0);
    }

    #[tokio::test]
    async fn test_flush_all() {
        let cache = InMemoryResultCache::new();
        cache.set(&key("JFK", "LAX"), "a", Duration::from_secs(60)).await.unwrap();
        cache.set(&key("SFO", "BOS"), "b", Duration::from_secs(60)).await.unwrap();

        cache.flush_all().await.unwrap();
        assert_eq!(cache.stats().len, 0);
    }

    #[test]
    fn test_custom_capacity() {
        let cache = InMemoryResultCache::with_config(MemoryCacheConfig { max_entries: 5 });
        assert_eq!(cache.stats().cap, 5);

        let zero = InMemoryResultCache::with_config(MemoryCacheConfig { max_entries: 0 });
        assert_eq!(zero.stats().cap, 1);
    }
}
