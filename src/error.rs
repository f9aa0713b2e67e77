//! Error and outcome types for route operations.

use crate::types::AirportCode;

/// Error type for route operations.
///
/// Cache failures never appear here: they are logged and absorbed at the
/// cache-call boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// Missing or empty airport code.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Unknown endpoint, or no route connects the endpoints.
    #[error("No available route between {start} and {end}")]
    NotFound {
        /// Requested origin.
        start: AirportCode,
        /// Requested destination.
        end: AirportCode,
    },
    /// The edge store could not complete a read or write.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl RouteError {
    /// Create a storage error from any store error type.
    pub fn from_store<E: std::error::Error>(e: E) -> Self {
        Self::Storage(e.to_string())
    }

    /// Create a not-found error for a start/end pair.
    pub fn not_found(start: &AirportCode, end: &AirportCode) -> Self {
        Self::NotFound {
            start: start.clone(),
            end: end.clone(),
        }
    }
}

/// Result of adding a route.
///
/// `AlreadyExists` is an expected outcome, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Both directed rows were persisted and the graph updated.
    Added,
    /// The directed edge was already present; nothing changed.
    AlreadyExists,
}

impl AddOutcome {
    /// Whether the call created the route.
    pub fn is_added(self) -> bool {
        matches!(self, Self::Added)
    }
}
