//! Core types for the route kernel.

pub mod airport;
pub mod edge;
pub mod route;

pub use airport::AirportCode;
pub use edge::RouteEdge;
pub use route::Route;
