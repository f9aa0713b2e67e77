//! Axum routes for the Route Kernel service.

use axum::{
    extract::{rejection::JsonRejection, Json, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{AddOutcome, RouteError};
use crate::manager::GraphStats;
use crate::resolver::ResolverStats;
use crate::store::SqliteEdgeStore;
use crate::types::{AirportCode, Route};

use super::middleware::{record_resolution, record_route_write};
use super::state::ServiceState;

/// Type alias for the service state with SqliteEdgeStore.
pub type AppState = ServiceState<SqliteEdgeStore>;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to add a route.
///
/// Exactly two airport codes; anything else is rejected by the extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRouteRequest {
    /// The two endpoints of the route.
    pub route: [String; 2],
}

/// Query parameters for a shortest-route lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindRouteQuery {
    /// Origin airport code.
    pub start: Option<String>,
    /// Destination airport code.
    pub end: Option<String>,
}

/// Response containing a resolved route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    /// Airports from origin to destination.
    pub route: Route,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Service health response (detailed).
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded".
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Database connectivity.
    pub database: bool,
    /// Whether a result cache is configured.
    pub cache_enabled: bool,
    /// Graph size.
    pub graph: GraphStats,
    /// Resolution counters.
    pub resolver: ResolverStats,
}

/// Simple liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LivenessResponse {
    /// Always "alive".
    pub status: String,
}

/// Readiness response with dependency status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    /// Whether the service can take traffic.
    pub ready: bool,
    /// Database connectivity.
    pub database: bool,
    /// Explanation when not ready.
    pub details: Option<String>,
}

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Create a new error response with code and message.
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Add details to the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Map a route error to its HTTP status and body.
fn route_error(err: RouteError) -> ApiError {
    let (status, code) = match &err {
        RouteError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        RouteError::NotFound { .. } => (StatusCode::NOT_FOUND, "ROUTE_NOT_FOUND"),
        RouteError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_FAILURE"),
    };
    tracing::warn!(code = code, error = %err, "Request error");
    (status, Json(ErrorResponse::new(code, err.to_string())))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Add an undirected route.
async fn add_route_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddRouteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("INVALID_INPUT", "invalid input").with_details(e.body_text())),
        )
    })?;

    let [start, end] = &request.route;
    let (start, end) = AirportCode::parse_pair(start, end).map_err(route_error)?;

    match state.manager.add_route(&start, &end).await.map_err(route_error)? {
        AddOutcome::Added => {
            record_route_write("add", "added");
            Ok((StatusCode::CREATED, MessageResponse::new("route added")))
        }
        AddOutcome::AlreadyExists => {
            record_route_write("add", "exists");
            Err((
                StatusCode::CONFLICT,
                Json(ErrorResponse::new("ROUTE_EXISTS", "route exists")
                    .with_details(format!("{start}-{end}"))),
            ))
        }
    }
}

/// Shortest route between two airports.
async fn find_route_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FindRouteQuery>,
) -> Result<Json<RouteResponse>, ApiError> {
    let started = Instant::now();
    let (start, end) = AirportCode::parse_pair(
        query.start.as_deref().unwrap_or_default(),
        query.end.as_deref().unwrap_or_default(),
    )
    .map_err(route_error)?;

    let resolved = state.manager.find_path(&start, &end).await.map_err(route_error)?;
    record_resolution(
        resolved.route.hops(),
        resolved.cache_hit,
        started.elapsed().as_millis() as u64,
    );

    Ok(Json(RouteResponse {
        route: resolved.route,
    }))
}

/// Remove every route.
async fn clear_routes_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.manager.clear_routes().await.map_err(route_error)?;
    record_route_write("clear", "cleared");
    Ok(MessageResponse::new("All routes removed"))
}

/// Health check endpoint (detailed).
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let db_healthy = state.manager.store().is_healthy().await;

    Json(HealthResponse {
        status: if db_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_healthy,
        cache_enabled: state.manager.cache_enabled(),
        graph: state.manager.graph_stats(),
        resolver: state.manager.resolver_stats(),
    })
}

/// Liveness probe endpoint.
///
/// Does NOT check dependencies.
async fn liveness_handler() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 if database is connected, 503 otherwise.
async fn readiness_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    if state.manager.store().is_healthy().await {
        Ok(Json(ReadinessResponse {
            ready: true,
            database: true,
            details: None,
        }))
    } else {
        Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                ready: false,
                database: false,
                details: Some("Database connection failed".to_string()),
            }),
        ))
    }
}

// ============================================================================
// Router Construction
// ============================================================================

/// Create the Axum router for the Route Kernel service.
pub fn create_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route(
            "/routes",
            get(find_route_handler)
                .post(add_route_handler)
                .delete(clear_routes_handler),
        )
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryResultCache;
    use crate::manager::RouteManager;
    use crate::resolver::ResolverConfig;
    use crate::store::SqliteConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn app() -> Router {
        let store = SqliteEdgeStore::new(SqliteConfig::in_memory()).await.unwrap();
        let manager = RouteManager::load(
            store,
            Some(Arc::new(InMemoryResultCache::new())),
            ResolverConfig::default(),
        )
        .await
        .unwrap();
        create_router(ServiceState::new(manager))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_add_find_clear_roundtrip() {
        let app = app().await;

        let (status, _) = send(&app, "POST", "/routes", Some(r#"{"route":["jfk","ord"]}"#)).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&app, "POST", "/routes", Some(r#"{"route":["ORD","lax"]}"#)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "GET", "/routes?start=jfk&end=LAX", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["route"], serde_json::json!(["JFK", "ORD", "LAX"]));

        let (status, body) = send(&app, "DELETE", "/routes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "All routes removed");

        let (status, body) = send(&app, "GET", "/routes?start=JFK&end=LAX", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_duplicate_route_conflicts() {
        let app = app().await;

        send(&app, "POST", "/routes", Some(r#"{"route":["JFK","LAX"]}"#)).await;
        let (status, body) = send(&app, "POST", "/routes", Some(r#"{"route":["jfk","lax"]}"#)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "ROUTE_EXISTS");
    }

    #[tokio::test]
    async fn test_malformed_bodies_rejected() {
        let app = app().await;

        for body in [
            r#"{"route":["JFK"]}"#,
            r#"{"route":["JFK","LAX","SFO"]}"#,
            r#"{"path":["JFK","LAX"]}"#,
            r#"["JFK","LAX"]"#,
            "not json",
        ] {
            let (status, json) = send(&app, "POST", "/routes", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body} should be rejected");
            assert_eq!(json["code"], "INVALID_INPUT");
        }

        let (status, _) = send(&app, "POST", "/routes", Some(r#"{"route":["","LAX"]}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_query_params_rejected() {
        let app = app().await;

        let (status, body) = send(&app, "GET", "/routes?start=JFK", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_same_airport_route() {
        let app = app().await;

        let (status, body) = send(&app, "GET", "/routes?start=abc&end=ABC", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["route"], serde_json::json!(["ABC"]));
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = app().await;
        send(&app, "POST", "/routes", Some(r#"{"route":["JFK","LAX"]}"#)).await;

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["cache_enabled"], true);
        assert_eq!(body["graph"]["airports"], 2);
        assert_eq!(body["graph"]["routes"], 1);

        let (status, _) = send(&app, "GET", "/health/live", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, "GET", "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], true);
    }
}
