//! In-memory undirected route graph.
//!
//! Adjacency is kept in `BTreeMap`/`BTreeSet` so neighbor iteration is
//! lexicographic and therefore identical across runs.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{AirportCode, RouteEdge};

static NO_NEIGHBORS: BTreeSet<AirportCode> = BTreeSet::new();

/// Undirected adjacency map.
///
/// Invariant: if `b` is in `neighbors(a)` then `a` is in `neighbors(b)`.
#[derive(Debug, Clone, Default)]
pub struct RouteGraph {
    adjacency: BTreeMap<AirportCode, BTreeSet<AirportCode>>,
}

impl RouteGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph by replaying directed edge rows.
    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = &'a RouteEdge>,
    {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(&edge.origin, &edge.destination);
        }
        graph
    }

    /// Connect `a` and `b` in both directions. Idempotent.
    pub fn add_edge(&mut self, a: &AirportCode, b: &AirportCode) {
        self.adjacency.entry(a.clone()).or_default().insert(b.clone());
        self.adjacency.entry(b.clone()).or_default().insert(a.clone());
    }

    /// Airports adjacent to `airport`, empty if it is unknown.
    pub fn neighbors(&self, airport: &AirportCode) -> &BTreeSet<AirportCode> {
        self.adjacency.get(airport).unwrap_or(&NO_NEIGHBORS)
    }

    /// Whether `airport` appears in any edge.
    pub fn has_node(&self, airport: &AirportCode) -> bool {
        self.adjacency.contains_key(airport)
    }

    /// Remove every node and edge.
    pub fn clear(&mut self) {
        self.adjacency.clear();
    }

    /// Number of airports.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of undirected edges (a self-loop counts once).
    pub fn edge_count(&self) -> usize {
        let mut loops = 0;
        let mut ends = 0;
        for (node, neighbors) in &self.adjacency {
            ends += neighbors.len();
            if neighbors.contains(node) {
                loops += 1;
            }
        }
        (ends - loops) / 2 + loops
    }

    /// Whether the graph has no airports.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}
