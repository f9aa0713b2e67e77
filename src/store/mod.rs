//! Durable edge storage backends.

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use async_trait::async_trait;
use crate::types::{AirportCode, RouteEdge};

/// Trait for edge storage backends.
///
/// Every undirected route is held as two directed rows. Mutating methods
/// must be transactional: either both rows are written or neither is.
/// `scan_all` must return rows in a deterministic order.
#[async_trait]
pub trait EdgeStore: Send + Sync {
    /// Error type for store operations.
    type Error: std::error::Error + Send + Sync;

    /// Fetch every directed row.
    async fn scan_all(&self) -> Result<Vec<RouteEdge>, Self::Error>;

    /// Check whether the directed row `origin → destination` exists.
    async fn exists_directed(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
    ) -> Result<bool, Self::Error>;

    /// Insert both directed rows in one transaction unless
    /// `origin → destination` is already present.
    ///
    /// Returns `true` if the rows were inserted, `false` if the edge existed.
    /// Concurrent calls for the same edge must yield at most one `true`.
    async fn insert_if_absent(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
    ) -> Result<bool, Self::Error>;

    /// Delete every row.
    async fn delete_all(&self) -> Result<(), Self::Error>;
}

pub use memory::InMemoryEdgeStore;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConfig, SqliteEdgeStore};
