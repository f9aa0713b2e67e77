//! Redis result cache for production use.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `REDIS_HOST`: Redis host (default: localhost)
//! - `REDIS_PORT`: Redis port (default: 6379)
//! - `REDIS_DB`: Logical database number (default: 0)
//! - `REDIS_POOL_SIZE`: Maximum pooled connections (default: 8)
//! - `REDIS_CONNECT_TIMEOUT_SECS`: Connection timeout (default: 2)
//! - `REDIS_KEY_PREFIX`: Namespace for keys (default: unset)
//!
//! ## Flush Scope
//!
//! Without a key prefix the database is assumed to belong to this service
//! and `flush_all` issues `FLUSHDB`. With a prefix only keys under the
//! prefix are deleted.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::bb8::{Pool, PooledConnection};
use bb8_redis::redis::cmd;
use bb8_redis::RedisConnectionManager;

use super::{CacheError, CacheKey, ResultCache};

const SCAN_BATCH: usize = 500;

/// Configuration for the Redis connection pool.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis host.
    pub host: String,
    /// Redis port.
    pub port: u16,
    /// Logical database number.
    pub db: u32,
    /// Maximum pooled connections (default: 8).
    pub pool_size: u32,
    /// Connection timeout in seconds (default: 2).
    pub connect_timeout_secs: u64,
    /// Optional key namespace. `None` means the database is dedicated.
    pub key_prefix: Option<String>,
}

impl RedisConfig {
    /// Load configuration from environment variables with production defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("REDIS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(6379),
            db: std::env::var("REDIS_DB")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            pool_size: std::env::var("REDIS_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
            connect_timeout_secs: std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            key_prefix: std::env::var("REDIS_KEY_PREFIX")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }

    /// Connection URL for the configured host, port, and database.
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn backend<E: std::fmt::Display>(e: E) -> CacheError {
    CacheError::Backend(e.to_string())
}

/// Redis-backed result cache.
pub struct RedisResultCache {
    pool: Pool<RedisConnectionManager>,
    key_prefix: Option<String>,
}

impl RedisResultCache {
    /// Build the pool and verify the server answers `PING`.
    pub async fn connect(config: RedisConfig) -> Result<Self, CacheError> {
        tracing::info!(
            host = %config.host,
            port = config.port,
            db = config.db,
            pool_size = config.pool_size,
            key_prefix = ?config.key_prefix,
            "Initializing Redis connection pool"
        );

        let manager = RedisConnectionManager::new(config.url()).map_err(backend)?;
        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build(manager)
            .await
            .map_err(backend)?;

        let cache = Self {
            pool,
            key_prefix: config.key_prefix,
        };
        cache.ping().await?;
        Ok(cache)
    }

    /// Create a cache from environment variables.
    pub async fn from_env() -> Result<Self, CacheError> {
        Self::connect(RedisConfig::from_env()).await
    }

    /// Round-trip a `PING`.
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let _: String = cmd("PING").query_async(&mut *conn).await.map_err(backend)?;
        Ok(())
    }

    async fn conn(&self) -> Result<PooledConnection<'_, RedisConnectionManager>, CacheError> {
        self.pool.get().await.map_err(backend)
    }

    fn full_key(&self, key: &CacheKey) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{prefix}{key}"),
            None => key.to_string(),
        }
    }

    async fn delete_prefixed(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut conn = self.conn().await?;
        let pattern = format!("{}*", escape_glob(prefix));
        let mut cursor: u64 = 0;
        let mut deleted = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut *conn)
                .await
                .map_err(backend)?;

            if !keys.is_empty() {
                let removed: usize = cmd("DEL")
                    .arg(&keys)
                    .query_async(&mut *conn)
                    .await
                    .map_err(backend)?;
                deleted += removed;
            }

            if next == 0 {
                return Ok(deleted);
            }
            cursor = next;
        }
    }
}

/// Escape `SCAN MATCH` glob metacharacters so a prefix matches literally.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Whole seconds for `EXPIRE`/`SET EX`, which reject zero.
fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl ResultCache for RedisResultCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let mut conn = self.conn().await?;
        cmd("GET")
            .arg(self.full_key(key))
            .query_async(&mut *conn)
            .await
            .map_err(backend)
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let _: () = cmd("SET")
            .arg(self.full_key(key))
            .arg(value)
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut *conn)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn refresh_ttl(&self, key: &CacheKey, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn().await?;
        let _: i64 = cmd("EXPIRE")
            .arg(self.full_key(key))
            .arg(ttl_secs(ttl))
            .query_async(&mut *conn)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        match &self.key_prefix {
            Some(prefix) => {
                let deleted = self.delete_prefixed(prefix).await?;
                tracing::debug!(prefix = %prefix, deleted, "Flushed prefixed cache keys");
            }
            None => {
                let mut conn = self.conn().await?;
                let _: () = cmd("FLUSHDB").query_async(&mut *conn).await.map_err(backend)?;
                tracing::debug!("Flushed cache database");
            }
        }
        Ok(())
    }
}
