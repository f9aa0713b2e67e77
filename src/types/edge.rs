//! Edge types for the route kernel.

use serde::{Deserialize, Serialize};
use super::airport::AirportCode;

/// A directed edge row as held by an edge store.
///
/// Every undirected route is persisted as two of these (A→B and B→A).
/// Implements `Ord` for deterministic ordering: (origin, destination).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouteEdge {
    /// Origin airport.
    pub origin: AirportCode,
    /// Destination airport.
    pub destination: AirportCode,
}

impl RouteEdge {
    /// Create a new directed edge.
    pub fn new(origin: AirportCode, destination: AirportCode) -> Self {
        Self { origin, destination }
    }

    /// The same edge in the opposite direction.
    pub fn reversed(&self) -> Self {
        Self::new(self.destination.clone(), self.origin.clone())
    }

    /// Whether both ends are the same airport.
    pub fn is_loop(&self) -> bool {
        self.origin == self.destination
    }
}
