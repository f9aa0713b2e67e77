//! Service middleware for metrics and request tracking.
//!
//! Every request carries an `x-request-id`, taken from the caller or
//! minted as a v4 UUID, which is echoed on the response and attached to
//! the request span.
//!
//! ## Metrics Exposed
//!
//! - `request` - Request count and latency by path, method, status
//! - `resolution` - Hops, cache hit, and latency per resolved route
//! - `route_write` - Outcome of each add/clear call

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info, info_span, Instrument};

/// Header carrying the request id.
pub static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Tag each request with an id and echo it back on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .cloned()
        .unwrap_or_else(|| {
            HeaderValue::from_str(&uuid::Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
        });
    request.headers_mut().insert(REQUEST_ID.clone(), request_id.clone());

    let span = info_span!(
        "request",
        request_id = request_id.to_str().unwrap_or_default(),
        method = %request.method(),
        path = request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;
    response.headers_mut().insert(REQUEST_ID.clone(), request_id);
    response
}

/// Metrics middleware that records request counts and latency.
///
/// Uses tracing for now - can be upgraded to prometheus metrics later.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status().as_u16();

    info!(
        target: "route_kernel::metrics",
        metric_type = "request",
        path = %path,
        method = %method,
        status = status,
        latency_ms = latency.as_millis() as u64,
        "request_metric"
    );

    response
}

/// Record route resolution metrics.
pub fn record_resolution(hops: usize, cache_hit: bool, latency_ms: u64) {
    info!(
        target: "route_kernel::metrics",
        metric_type = "resolution",
        hops = hops,
        cache_hit = cache_hit,
        latency_ms = latency_ms,
        "resolution_metric"
    );
}

/// Record the outcome of a route write (`add` or `clear`).
pub fn record_route_write(operation: &str, outcome: &str) {
    info!(
        target: "route_kernel::metrics",
        metric_type = "route_write",
        operation = operation,
        outcome = outcome,
        "route_write_metric"
    );
}
