//! In-memory edge store for testing and embedding.

use std::collections::BTreeSet;
use std::convert::Infallible;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::types::{AirportCode, RouteEdge};
use super::EdgeStore;

/// In-memory edge store.
///
/// Uses a BTreeSet for deterministic scan order. A single mutex makes
/// check-and-insert atomic.
#[derive(Debug, Default)]
pub struct InMemoryEdgeStore {
    rows: Mutex<BTreeSet<RouteEdge>>,
}

impl InMemoryEdgeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with undirected routes.
    ///
    /// Each pair is stored as both directed rows.
    pub fn with_routes<'a, I>(routes: I) -> Self
    where
        I: IntoIterator<Item = (&'a AirportCode, &'a AirportCode)>,
    {
        let store = Self::new();
        {
            let mut rows = store.rows.lock();
            for (a, b) in routes {
                rows.insert(RouteEdge::new(a.clone(), b.clone()));
                rows.insert(RouteEdge::new(b.clone(), a.clone()));
            }
        }
        store
    }

    /// Insert a single directed row without its reverse.
    ///
    /// Lets tests reproduce stores written by other tools.
    pub fn insert_directed(&self, edge: RouteEdge) {
        self.rows.lock().insert(edge);
    }

    /// Get number of directed rows.
    pub fn num_rows(&self) -> usize {
        self.rows.lock().len()
    }
}

#[async_trait]
impl EdgeStore for InMemoryEdgeStore {
    type Error = Infallible;

    async fn scan_all(&self) -> Result<Vec<RouteEdge>, Self::Error> {
        Ok(self.rows.lock().iter().cloned().collect())
    }

    async fn exists_directed(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
    ) -> Result<bool, Self::Error> {
        let probe = RouteEdge::new(origin.clone(), destination.clone());
        Ok(self.rows.lock().contains(&probe))
    }

    async fn insert_if_absent(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
    ) -> Result<bool, Self::Error> {
        let forward = RouteEdge::new(origin.clone(), destination.clone());
        let mut rows = self.rows.lock();
        if rows.contains(&forward) {
            return Ok(false);
        }
        rows.insert(forward.reversed());
        rows.insert(forward);
        Ok(true)
    }

    async fn delete_all(&self) -> Result<(), Self::Error> {
        self.rows.lock().clear();
        Ok(())
    }
}
