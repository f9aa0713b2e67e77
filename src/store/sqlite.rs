//! SQLite edge store for production use.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `DATABASE_URL`: SQLite connection string (default: `sqlite://routes.db`)
//! - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 5)
//! - `DB_CONNECT_TIMEOUT_SECS`: Connection timeout (default: 10)
//!
//! ## Schema
//!
//! One `routes` table keyed by `(origin, destination)`. Each undirected
//! route occupies two rows.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;

use crate::types::{AirportCode, RouteEdge};
use super::EdgeStore;

const CREATE_ROUTES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS routes (
        origin TEXT NOT NULL,
        destination TEXT NOT NULL,
        PRIMARY KEY (origin, destination)
    )
"#;

/// Configuration for the SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum connections in pool (default: 5).
    pub max_connections: u32,
    /// Connection acquire timeout in seconds (default: 10).
    pub connect_timeout_secs: u64,
}

impl SqliteConfig {
    /// Load configuration from environment variables with production defaults.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://routes.db".to_string()),
            max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Private in-memory database, for tests.
    ///
    /// Uses a single connection since every SQLite in-memory connection
    /// opens its own database.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Error type for SQLite store.
#[derive(Debug, thiserror::Error)]
pub enum SqliteStoreError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A stored code could not be read back as an airport code.
    #[error("Corrupt route row: {0}")]
    CorruptRow(String),
}

/// SQLite edge store.
pub struct SqliteEdgeStore {
    pool: SqlitePool,
}

impl SqliteEdgeStore {
    /// Open (creating if missing) the database and ensure the schema exists.
    pub async fn new(config: SqliteConfig) -> Result<Self, SqliteStoreError> {
        tracing::info!(
            database_url = %config.database_url,
            max_connections = config.max_connections,
            connect_timeout_secs = config.connect_timeout_secs,
            "Initializing SQLite connection pool"
        );

        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_with(options)
            .await?;

        sqlx::query(CREATE_ROUTES_TABLE).execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a store from environment variables.
    pub async fn from_env() -> Result<Self, SqliteStoreError> {
        Self::new(SqliteConfig::from_env()).await
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check if the database is reachable.
    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }

    fn parse_edge_row(row: &sqlx::sqlite::SqliteRow) -> Result<RouteEdge, SqliteStoreError> {
        let origin: String = row.try_get("origin")?;
        let destination: String = row.try_get("destination")?;

        let origin = AirportCode::parse(&origin)
            .map_err(|e| SqliteStoreError::CorruptRow(e.to_string()))?;
        let destination = AirportCode::parse(&destination)
            .map_err(|e| SqliteStoreError::CorruptRow(e.to_string()))?;

        Ok(RouteEdge::new(origin, destination))
    }
}

#[async_trait]
impl EdgeStore for SqliteEdgeStore {
    type Error = SqliteStoreError;

    async fn scan_all(&self) -> Result<Vec<RouteEdge>, Self::Error> {
        let rows = sqlx::query(
            r#"
            SELECT origin, destination
            FROM routes
            ORDER BY origin, destination
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::parse_edge_row).collect()
    }

    async fn exists_directed(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
    ) -> Result<bool, Self::Error> {
        let row = sqlx::query(
            r#"
            SELECT 1
            FROM routes
            WHERE origin = ?1 AND destination = ?2
            "#
        )
        .bind(origin.as_str())
        .bind(destination.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn insert_if_absent(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
    ) -> Result<bool, Self::Error> {
        let mut tx = self.pool.begin().await?;

        // The primary key makes the forward insert the existence check.
        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO routes (origin, destination) VALUES (?1, ?2)"
        )
        .bind(origin.as_str())
        .bind(destination.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if inserted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT OR IGNORE INTO routes (origin, destination) VALUES (?1, ?2)"
        )
        .bind(destination.as_str())
        .bind(origin.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn delete_all(&self) -> Result<(), Self::Error> {
        let deleted = sqlx::query("DELETE FROM routes")
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::debug!(deleted_rows = deleted, "Deleted all route rows");
        Ok(())
    }
}
