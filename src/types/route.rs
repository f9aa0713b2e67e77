//! Route (path) type and its cache encoding.

use serde::{Deserialize, Serialize};

use super::airport::AirportCode;
use crate::cache::CacheError;
use crate::error::RouteError;

/// An ordered sequence of airports from origin to destination.
///
/// Consecutive airports are adjacent in the graph the route was found in.
/// A single-airport route means no travel is needed.
///
/// Serializes as a compact JSON array, e.g. `["JFK","ORD","LAX"]`.
/// An empty array does not deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<AirportCode>", into = "Vec<AirportCode>")]
pub struct Route(Vec<AirportCode>);

impl Route {
    /// The zero-hop route consisting only of `airport`.
    pub fn single(airport: AirportCode) -> Self {
        Self(vec![airport])
    }

    /// Build a route from its airports in travel order.
    ///
    /// Returns `None` for an empty list.
    pub fn from_airports(airports: Vec<AirportCode>) -> Option<Self> {
        if airports.is_empty() {
            None
        } else {
            Some(Self(airports))
        }
    }

    /// First airport.
    pub fn origin(&self) -> &AirportCode {
        &self.0[0]
    }

    /// Last airport.
    pub fn destination(&self) -> &AirportCode {
        &self.0[self.0.len() - 1]
    }

    /// Number of hops (edges traversed).
    pub fn hops(&self) -> usize {
        self.0.len() - 1
    }

    /// Airports in travel order.
    pub fn airports(&self) -> &[AirportCode] {
        &self.0
    }

    /// The same route travelled backwards.
    pub fn reversed(&self) -> Self {
        let mut airports = self.0.clone();
        airports.reverse();
        Self(airports)
    }

    /// Whether the route starts at `start` and ends at `end`.
    pub fn connects(&self, start: &AirportCode, end: &AirportCode) -> bool {
        self.origin() == start && self.destination() == end
    }

    /// Encode for storage in a result cache.
    pub fn to_cache_value(&self) -> Result<String, CacheError> {
        serde_json::to_string(self).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    /// Decode a value previously written by [`Route::to_cache_value`].
    pub fn from_cache_value(value: &str) -> Result<Self, CacheError> {
        serde_json::from_str(value).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    /// Consume the route, returning its airports.
    pub fn into_airports(self) -> Vec<AirportCode> {
        self.0
    }
}

impl TryFrom<Vec<AirportCode>> for Route {
    type Error = RouteError;

    fn try_from(airports: Vec<AirportCode>) -> Result<Self, Self::Error> {
        Self::from_airports(airports)
            .ok_or_else(|| RouteError::InvalidInput("route must not be empty".to_string()))
    }
}

impl From<Route> for Vec<AirportCode> {
    fn from(route: Route) -> Self {
        route.0
    }
}
