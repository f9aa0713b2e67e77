//! Shortest-route resolution.
//!
//! Breadth-first search over the shared [`RouteGraph`], fronted by an
//! optional cache-aside [`ResultCache`].
//!
//! ## Algorithm
//!
//! 1. Identical endpoints resolve to the one-airport route without touching
//!    the cache or the graph search
//! 2. Both endpoints must be nodes of the graph
//! 3. Probe the cache under the symmetric key; on hit extend the entry's
//!    TTL and return it, oriented from the requested origin
//! 4. On miss, BFS from the origin: pop the front of a FIFO of
//!    `(airport, route so far)`, return on reaching the destination, skip
//!    airports already visited, otherwise mark and enqueue all unvisited
//!    neighbors
//! 5. Write the found route back to the cache
//!
//! The visited check happens at pop time, so one airport may sit in the
//! queue more than once. The first time the destination is popped is
//! still via a minimum-hop route.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::cache::{CacheKey, ResultCache};
use crate::error::RouteError;
use crate::graph::RouteGraph;
use crate::types::{AirportCode, Route};

/// Default sliding expiration for cached routes (30 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(1800);

/// Configuration for the path resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// TTL applied when a route is cached and on every cache hit.
    pub cache_ttl: Duration,
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `ROUTE_CACHE_TTL_SECS` (default: 1800).
    pub fn from_env() -> Self {
        let cache_ttl = std::env::var("ROUTE_CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CACHE_TTL);
        Self { cache_ttl }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

/// A resolved route and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// The shortest route found.
    pub route: Route,
    /// Whether this result came from cache.
    pub cache_hit: bool,
}

/// Resolution counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResolverStats {
    /// Queries answered from the cache.
    pub cache_hits: u64,
    /// Queries that had to search (cache absent, empty, or failing).
    pub cache_misses: u64,
    /// Breadth-first searches run, including ones that found nothing.
    pub searches: u64,
}

#[derive(Debug, Default)]
struct Counters {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    searches: AtomicU64,
}

/// Breadth-first shortest route between two airports.
///
/// Returns `None` when `end` is unreachable from `start`. Neighbors are
/// expanded in the graph's (sorted) order, so ties break the same way on
/// every run.
pub fn breadth_first_route(
    graph: &RouteGraph,
    start: &AirportCode,
    end: &AirportCode,
) -> Option<Route> {
    let mut queue: VecDeque<(&AirportCode, Vec<AirportCode>)> = VecDeque::new();
    let mut visited: HashSet<&AirportCode> = HashSet::new();

    queue.push_back((start, vec![start.clone()]));

    while let Some((node, path)) = queue.pop_front() {
        if node == end {
            return Route::from_airports(path);
        }
        if !visited.insert(node) {
            continue;
        }

        for neighbor in graph.neighbors(node) {
            if !visited.contains(neighbor) {
                let mut next = path.clone();
                next.push(neighbor.clone());
                queue.push_back((neighbor, next));
            }
        }
    }

    None
}

/// Cache-aside shortest-route resolver.
pub struct PathResolver {
    graph: Arc<RwLock<RouteGraph>>,
    cache: Option<Arc<dyn ResultCache>>,
    config: ResolverConfig,
    counters: Counters,
}

impl PathResolver {
    /// Create a resolver over a shared graph.
    ///
    /// Pass `None` for `cache` to always search.
    pub fn new(
        graph: Arc<RwLock<RouteGraph>>,
        cache: Option<Arc<dyn ResultCache>>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            graph,
            cache,
            config,
            counters: Counters::default(),
        }
    }

    /// Find the shortest route from `start` to `end`.
    ///
    /// Fails with [`RouteError::NotFound`] when either airport is unknown or
    /// no route connects them. Cache failures are logged and never returned.
    pub async fn find_path(
        &self,
        start: &AirportCode,
        end: &AirportCode,
    ) -> Result<ResolvedRoute, RouteError> {
        if start == end {
            return Ok(ResolvedRoute {
                route: Route::single(start.clone()),
                cache_hit: false,
            });
        }

        {
            let graph = self.graph.read();
            if !graph.has_node(start) || !graph.has_node(end) {
                tracing::debug!(%start, %end, "Route endpoint not in graph");
                return Err(RouteError::not_found(start, end));
            }
        }

        let key = CacheKey::for_pair(start, end);

        if let Some(route) = self.cached_route(&key, start, end).await {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(%key, hops = route.hops(), "Route served from cache");
            return Ok(ResolvedRoute {
                route,
                cache_hit: true,
            });
        }
        self.counters.cache_misses.fetch_add(1, Ordering::Relaxed);

        let found = {
            let graph = self.graph.read();
            self.counters.searches.fetch_add(1, Ordering::Relaxed);
            breadth_first_route(&graph, start, end)
        };

        let route = found.ok_or_else(|| RouteError::not_found(start, end))?;
        tracing::debug!(%start, %end, hops = route.hops(), "Route found by search");

        self.store_route(&key, &route).await;

        Ok(ResolvedRoute {
            route,
            cache_hit: false,
        })
    }

    /// Current resolution counters.
    pub fn stats(&self) -> ResolverStats {
        ResolverStats {
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.counters.cache_misses.load(Ordering::Relaxed),
            searches: self.counters.searches.load(Ordering::Relaxed),
        }
    }

    /// Whether a cache backend is configured.
    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    /// Get the configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Read, decode, orient, and touch a cached route.
    async fn cached_route(
        &self,
        key: &CacheKey,
        start: &AirportCode,
        end: &AirportCode,
    ) -> Option<Route> {
        let cache = self.cache.as_ref()?;

        let value = match cache.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(%key, error = %e, "Route cache read failed, searching instead");
                return None;
            }
        };

        let cached = match Route::from_cache_value(&value) {
            Ok(route) => route,
            Err(e) => {
                tracing::warn!(%key, error = %e, "Discarding undecodable cached route");
                return None;
            }
        };

        let route = if cached.connects(start, end) {
            cached
        } else if cached.connects(end, start) {
            cached.reversed()
        } else {
            tracing::warn!(%key, "Cached route does not match its key");
            return None;
        };

        if let Err(e) = cache.refresh_ttl(key, self.config.cache_ttl).await {
            tracing::warn!(%key, error = %e, "Route cache TTL refresh failed");
        }

        Some(route)
    }

    /// Write a route to the cache, logging and discarding failures.
    async fn store_route(&self, key: &CacheKey, route: &Route) {
        let Some(cache) = self.cache.as_ref() else {
            return;
        };

        let value = match route.to_cache_value() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(%key, error = %e, "Route could not be encoded for cache");
                return;
            }
        };

        if let Err(e) = cache.set(key, &value, self.config.cache_ttl).await {
            tracing::warn!(%key, error = %e, "Route cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryResultCache;

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    fn codes(route: &Route) -> Vec<&str> {
        route.airports().iter().map(|c| c.as_str()).collect()
    }

    fn build_graph(edges: &[(&str, &str)]) -> RouteGraph {
        let mut graph = RouteGraph::new();
        for (a, b) in edges {
            graph.add_edge(&code(a), &code(b));
        }
        graph
    }

    fn resolver(graph: RouteGraph, cache: Option<Arc<dyn ResultCache>>) -> PathResolver {
        PathResolver::new(Arc::new(RwLock::new(graph)), cache, ResolverConfig::default())
    }

    #[test]
    fn test_bfs_linear() {
        let graph = build_graph(&[("A", "B"), ("B", "C")]);
        let route = breadth_first_route(&graph, &code("A"), &code("C")).unwrap();
        assert_eq!(codes(&route), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_bfs_prefers_fewest_hops() {
        //  A - B - C - D
        //   \_________/
        let graph = build_graph(&[("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")]);
        let route = breadth_first_route(&graph, &code("A"), &code("D")).unwrap();
        assert_eq!(codes(&route), vec!["A", "D"]);
    }

    #[test]
    fn test_bfs_tie_breaks_by_neighbor_order() {
        //    B
        //   / \
        //  A   D
        //   \ /
        //    C
        let graph = build_graph(&[("A", "C"), ("C", "D"), ("A", "B"), ("B", "D")]);
        let route = breadth_first_route(&graph, &code("A"), &code("D")).unwrap();
        assert_eq!(codes(&route), vec!["A", "B", "D"]);
    }

    #[test]
    fn test_bfs_unreachable() {
        let graph = build_graph(&[("A", "B"), ("C", "D")]);
        assert!(breadth_first_route(&graph, &code("A"), &code("D")).is_none());
    }

    #[test]
    fn test_bfs_handles_cycles() {
        let graph = build_graph(&[("A", "B"), ("B", "C"), ("C", "A"), ("C", "D"), ("D", "D")]);
        let route = breadth_first_route(&graph, &code("A"), &code("D")).unwrap();
        assert_eq!(codes(&route), vec!["A", "C", "D"]);
    }

    #[tokio::test]
    async fn test_same_endpoint_bypasses_everything() {
        let cache = Arc::new(InMemoryResultCache::new());
        let resolver = resolver(RouteGraph::new(), Some(cache.clone()));

        let resolved = resolver.find_path(&code("JFK"), &code("JFK")).await.unwrap();
        assert_eq!(codes(&resolved.route), vec!["JFK"]);
        assert!(!resolved.cache_hit);
        assert_eq!(resolver.stats(), ResolverStats::default());
        assert_eq!(cache.stats().len, 0);
    }

    #[tokio::test]
    async fn test_unknown_endpoint_not_found() {
        let resolver = resolver(build_graph(&[("A", "B")]), None);

        let err = resolver.find_path(&code("A"), &code("Z")).await.unwrap_err();
        assert_eq!(err, RouteError::not_found(&code("A"), &code("Z")));
        assert_eq!(resolver.stats().searches, 0);
    }

    #[tokio::test]
    async fn test_disconnected_not_found() {
        let resolver = resolver(build_graph(&[("A", "B"), ("C", "D")]), None);

        let err = resolver.find_path(&code("A"), &code("D")).await.unwrap_err();
        assert!(matches!(err, RouteError::NotFound { .. }));
        assert_eq!(resolver.stats().searches, 1);
    }

    #[tokio::test]
    async fn test_reverse_query_hits_cache() {
        let cache = Arc::new(InMemoryResultCache::new());
        let resolver = resolver(build_graph(&[("A", "B"), ("B", "C")]), Some(cache));

        let first = resolver.find_path(&code("A"), &code("C")).await.unwrap();
        assert!(!first.cache_hit);

        let second = resolver.find_path(&code("C"), &code("A")).await.unwrap();
        assert!(second.cache_hit);
        assert_eq!(codes(&second.route), vec!["C", "B", "A"]);

        let stats = resolver.stats();
        assert_eq!(stats.searches, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
    }

    #[tokio::test]
    async fn test_cache_hit_refreshes_ttl() {
        let cache = Arc::new(InMemoryResultCache::new());
        let key = CacheKey::for_pair(&code("A"), &code("B"));
        cache.set(&key, r#"["A","B"]"#, Duration::from_secs(5)).await.unwrap();

        let resolver = resolver(build_graph(&[("A", "B")]), Some(cache.clone()));
        let resolved = resolver.find_path(&code("B"), &code("A")).await.unwrap();

        assert!(resolved.cache_hit);
        assert!(cache.ttl(&key).unwrap() > Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_mismatched_cache_entry_is_ignored() {
        let cache = Arc::new(InMemoryResultCache::new());
        let key = CacheKey::for_pair(&code("A"), &code("C"));
        cache.set(&key, r#"["A","X","Y"]"#, Duration::from_secs(60)).await.unwrap();

        let resolver = resolver(build_graph(&[("A", "B"), ("B", "C")]), Some(cache.clone()));
        let resolved = resolver.find_path(&code("A"), &code("C")).await.unwrap();

        assert!(!resolved.cache_hit);
        assert_eq!(codes(&resolved.route), vec!["A", "B", "C"]);
        assert_eq!(cache.get(&key).await.unwrap().as_deref(), Some(r#"["A","B","C"]"#));
    }

    #[tokio::test]
    async fn test_search_is_deterministic() {
        let graph = build_graph(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D"), ("D", "E")]);
        let resolver = resolver(graph, None);

        let r1 = resolver.find_path(&code("A"), &code("E")).await.unwrap();
        let r2 = resolver.find_path(&code("A"), &code("E")).await.unwrap();
        assert_eq!(r1.route, r2.route);
        assert_eq!(resolver.stats().searches, 2);
    }
}
