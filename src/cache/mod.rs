//! Result cache backends.
//!
//! ## Cache Key Design
//!
//! A resolved route is keyed by the *unordered* pair of its endpoints:
//! the lexicographically smaller code, a `:`, then the larger code. Queries
//! for `JFK → LAX` and `LAX → JFK` therefore share one entry.
//!
//! ## Failure Policy
//!
//! Every method returns a `Result`. Callers inspect it, log failures, and
//! carry on as if the cache had missed. A cache can make a route stale
//! within its TTL; it can never make a request fail.

pub mod memory;

#[cfg(feature = "redis")]
pub mod redis;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

use crate::types::AirportCode;

/// Errors surfaced by a result cache backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Backend is unavailable, timing out, or rejected the command.
    #[error("Route cache backend failure: {0}")]
    Backend(String),
    /// A cached value could not be encoded or decoded.
    #[error("Route cache serialization failed: {0}")]
    Serialization(String),
}

/// Symmetric key for a route between two airports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for the unordered pair `{a, b}`.
    pub fn for_pair(a: &AirportCode, b: &AirportCode) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{lo}:{hi}"))
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key-value store with per-key expiration.
///
/// Object safe, so the resolver can hold any backend behind
/// `Arc<dyn ResultCache>`.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Read the value stored under `key`, if present and unexpired.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Reset the expiration of `key` to `ttl` from now. No-op if absent.
    async fn refresh_ttl(&self, key: &CacheKey, ttl: Duration) -> Result<(), CacheError>;

    /// Remove every entry in the cache's namespace.
    async fn flush_all(&self) -> Result<(), CacheError>;
}

pub use memory::{InMemoryResultCache, MemoryCacheConfig, CacheStats};

#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisResultCache};
