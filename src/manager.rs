//! Route manager: the composition root.
//!
//! Owns the shared graph, the edge store, and the optional result cache,
//! and keeps the three consistent:
//!
//! - adds write to the store first and touch the graph only after commit
//! - clears go store, then graph, then cache; a store failure stops the
//!   clear before anything in memory changes
//! - cache failures are logged and never abort an operation
//!
//! ## Write Gate
//!
//! Adds and lookups hold the gate shared; a clear holds it exclusively from
//! the store delete through the cache flush. A clear therefore never lands
//! between an add's commit and its graph update, and no lookup that started
//! before a clear can write its route back into the flushed cache.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::ResultCache;
use crate::error::{AddOutcome, RouteError};
use crate::graph::RouteGraph;
use crate::resolver::{PathResolver, ResolvedRoute, ResolverConfig, ResolverStats};
use crate::store::EdgeStore;
use crate::types::AirportCode;

/// Snapshot of graph size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct GraphStats {
    /// Number of airports.
    pub airports: usize,
    /// Number of undirected routes.
    pub routes: usize,
}

/// Route manager over an edge store and optional result cache.
pub struct RouteManager<S: EdgeStore> {
    store: Arc<S>,
    graph: Arc<RwLock<RouteGraph>>,
    cache: Option<Arc<dyn ResultCache>>,
    resolver: PathResolver,
    gate: tokio::sync::RwLock<()>,
}

impl<S: EdgeStore + 'static> RouteManager<S> {
    /// Build a manager, loading every persisted edge into a fresh graph.
    ///
    /// A store that cannot be scanned is a fatal initialization error.
    pub async fn load(
        store: S,
        cache: Option<Arc<dyn ResultCache>>,
        config: ResolverConfig,
    ) -> Result<Self, RouteError> {
        let store = Arc::new(store);
        let rows = store.scan_all().await.map_err(RouteError::from_store)?;
        let graph = RouteGraph::from_edges(&rows);

        tracing::info!(
            rows = rows.len(),
            airports = graph.node_count(),
            routes = graph.edge_count(),
            cache_enabled = cache.is_some(),
            cache_ttl_secs = config.cache_ttl.as_secs(),
            "Route graph loaded"
        );

        let graph = Arc::new(RwLock::new(graph));
        let resolver = PathResolver::new(Arc::clone(&graph), cache.clone(), config);

        Ok(Self {
            store,
            graph,
            cache,
            resolver,
            gate: tokio::sync::RwLock::new(()),
        })
    }

    /// Add the undirected route `a`–`b`.
    ///
    /// Returns [`AddOutcome::AlreadyExists`] if the directed edge `a → b`
    /// is already stored. The graph only changes after the store commits.
    pub async fn add_route(
        &self,
        a: &AirportCode,
        b: &AirportCode,
    ) -> Result<AddOutcome, RouteError> {
        let _gate = self.gate.read().await;

        if self
            .store
            .exists_directed(a, b)
            .await
            .map_err(RouteError::from_store)?
        {
            tracing::debug!(%a, %b, "Route already exists");
            return Ok(AddOutcome::AlreadyExists);
        }

        let inserted = self
            .store
            .insert_if_absent(a, b)
            .await
            .map_err(|e| {
                tracing::error!(%a, %b, error = %e, "Route insert failed");
                RouteError::from_store(e)
            })?;

        if !inserted {
            tracing::debug!(%a, %b, "Route added concurrently by another caller");
            return Ok(AddOutcome::AlreadyExists);
        }

        self.graph.write().add_edge(a, b);
        tracing::info!(%a, %b, "Route added");
        Ok(AddOutcome::Added)
    }

    /// Remove every route from the store, the graph, and the cache.
    pub async fn clear_routes(&self) -> Result<(), RouteError> {
        let _gate = self.gate.write().await;

        self.store.delete_all().await.map_err(|e| {
            tracing::error!(error = %e, "Route delete failed, graph and cache left untouched");
            RouteError::from_store(e)
        })?;

        self.graph.write().clear();

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.flush_all().await {
                tracing::warn!(error = %e, "Route cache flush failed");
            }
        }

        tracing::info!("All routes removed");
        Ok(())
    }

    /// Find the shortest route from `start` to `end`.
    pub async fn find_path(
        &self,
        start: &AirportCode,
        end: &AirportCode,
    ) -> Result<ResolvedRoute, RouteError> {
        let _gate = self.gate.read().await;
        self.resolver.find_path(start, end).await
    }

    /// Airports adjacent to `airport`, sorted.
    pub fn neighbors(&self, airport: &AirportCode) -> Vec<AirportCode> {
        self.graph.read().neighbors(airport).iter().cloned().collect()
    }

    /// Whether `airport` is a node of the graph.
    pub fn has_airport(&self, airport: &AirportCode) -> bool {
        self.graph.read().has_node(airport)
    }

    /// Current graph size.
    pub fn graph_stats(&self) -> GraphStats {
        let graph = self.graph.read();
        GraphStats {
            airports: graph.node_count(),
            routes: graph.edge_count(),
        }
    }

    /// Resolution counters.
    pub fn resolver_stats(&self) -> ResolverStats {
        self.resolver.stats()
    }

    /// Whether a result cache is configured.
    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }
}
