//! # route-kernel
//!
//! Shortest-hop route resolution over an undirected airport graph.
//!
//! The route kernel answers one question:
//!
//! > Given two airports, what is the shortest sequence of hops between them?
//!
//! ## Core Contract
//!
//! 1. Routes are undirected edges, persisted as two directed rows in an
//!    [`EdgeStore`] and mirrored in an in-memory [`RouteGraph`]
//! 2. Queries run breadth-first search, so the first route found has the
//!    fewest hops
//! 3. Results are memoized in an optional [`ResultCache`] under a key that
//!    is the same for `A → B` and `B → A`, with a sliding TTL
//!
//! ## Architecture
//!
//! ```text
//! add_route ──► EdgeStore ──(commit)──► RouteGraph
//!                                          ▲
//! find_path ──► ResultCache ──(miss)──► PathResolver (BFS)
//!                    ▲                     │
//!                    └──────(write back)───┘
//! ```
//!
//! ## Consistency Guarantees
//!
//! - The graph is always the symmetric closure of the stored edges
//! - A failed store write never reaches the graph
//! - Cache failures degrade to cache misses and never fail a request

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod error;
pub mod graph;
pub mod store;
pub mod cache;
pub mod resolver;
pub mod manager;

#[cfg(feature = "service")]
pub mod service;

// Re-exports
pub use types::{AirportCode, RouteEdge, Route};
pub use error::{AddOutcome, RouteError};
pub use graph::RouteGraph;
pub use store::{EdgeStore, InMemoryEdgeStore};
#[cfg(feature = "sqlite")]
pub use store::{SqliteConfig, SqliteEdgeStore};
pub use cache::{CacheError, CacheKey, ResultCache, InMemoryResultCache, MemoryCacheConfig, CacheStats};
#[cfg(feature = "redis")]
pub use cache::{RedisConfig, RedisResultCache};
pub use resolver::{
    breadth_first_route, PathResolver, ResolvedRoute, ResolverConfig, ResolverStats,
    DEFAULT_CACHE_TTL,
};
pub use manager::{GraphStats, RouteManager};

// Service re-exports (when service feature is enabled)
#[cfg(feature = "service")]
pub use service::{create_router, ServiceState};
