//! Route Kernel REST Service
//!
//! Exposes the route manager as a REST API.
//!
//! ## Endpoints
//!
//! - `POST /routes` - Add an undirected route (`{"route": ["JFK", "LAX"]}`)
//! - `GET /routes?start=JFK&end=LAX` - Shortest route between two airports
//! - `DELETE /routes` - Remove every route
//! - `GET /health` - Detailed service health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe

pub mod middleware;
pub mod routes;
pub mod state;

pub use middleware::{
    metrics_middleware, record_resolution, record_route_write, request_id_middleware, REQUEST_ID,
};
pub use routes::{create_router, AppState};
pub use state::ServiceState;
