//! Service state management.

use std::sync::Arc;

use crate::manager::RouteManager;
use crate::store::EdgeStore;

/// Shared service state.
///
/// Cheap to clone; every handler sees the same route manager.
pub struct ServiceState<S: EdgeStore + 'static> {
    /// The route manager behind every endpoint.
    pub manager: Arc<RouteManager<S>>,
}

impl<S: EdgeStore + 'static> ServiceState<S> {
    /// Create service state around a loaded route manager.
    pub fn new(manager: RouteManager<S>) -> Self {
        Self {
            manager: Arc::new(manager),
        }
    }
}

impl<S: EdgeStore + 'static> Clone for ServiceState<S> {
    fn clone(&self) -> Self {
        Self {
            manager: Arc::clone(&self.manager),
        }
    }
}
