//! Route Kernel Service Binary
//!
//! Serves shortest-route lookups over HTTP. Edges persist in SQLite and
//! resolved routes are cached in Redis when it is reachable.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL`: SQLite connection string (default: sqlite://routes.db)
//! - `REDIS_HOST` / `REDIS_PORT` / `REDIS_DB`: Result cache location (default: localhost:6379/0)
//! - `ROUTE_CACHE_TTL_SECS`: Sliding TTL for cached routes (default: 1800)
//! - `PORT`: Service port (default: 7887)
//! - `HOST`: Service host (default: 0.0.0.0)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=sqlite://routes.db cargo run --bin route_kernel_service --features service
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::middleware;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use route_kernel::service::{create_router, metrics_middleware, request_id_middleware, ServiceState};
use route_kernel::{RedisResultCache, ResolverConfig, ResultCache, RouteManager, SqliteEdgeStore};

const DEFAULT_PORT: u16 = 7887;
const DB_CONNECT_DEADLINE: Duration = Duration::from_secs(30);

/// Install the global subscriber; `LOG_FORMAT=pretty` for local runs.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("route_kernel=info,route_kernel_service=info,tower_http=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("pretty") => builder.pretty().init(),
        _ => builder.json().flatten_event(true).init(),
    }
}

/// Connect to Redis, running without a cache if it is unavailable.
async fn connect_cache() -> Option<Arc<dyn ResultCache>> {
    match RedisResultCache::from_env().await {
        Ok(cache) => {
            info!("Redis result cache connected");
            Some(Arc::new(cache))
        }
        Err(e) => {
            warn!(error = %e, "Redis unavailable, resolving routes without a cache");
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let version = env!("CARGO_PKG_VERSION");
    let build_sha = option_env!("BUILD_SHA").unwrap_or("dev");
    info!(version = version, build_sha = build_sha, "Starting Route Kernel Service");

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

    info!("Opening SQLite edge store...");
    let connect_start = Instant::now();
    let store = match tokio::time::timeout(DB_CONNECT_DEADLINE, SqliteEdgeStore::from_env()).await {
        Ok(Ok(store)) => store,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Failed to open SQLite edge store");
            return Err(e.into());
        }
        Err(_) => {
            tracing::error!(
                timeout_secs = DB_CONNECT_DEADLINE.as_secs(),
                "SQLite connection timeout"
            );
            return Err("Database connection timeout".into());
        }
    };
    info!(
        latency_ms = connect_start.elapsed().as_millis() as u64,
        "SQLite edge store ready"
    );

    let cache = connect_cache().await;

    let manager = match RouteManager::load(store, cache, ResolverConfig::from_env()).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load route graph");
            return Err(e.into());
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(ServiceState::new(manager))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!(address = %addr, version = version, "Route Kernel Service listening");

    let listener = TcpListener::bind(addr).await?;
    info!("Ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Route Kernel Service shutdown complete");
    Ok(())
}
