//! Persistence tests: a route manager rebuilt from SQLite sees every route
//! written by an earlier process.

#![cfg(feature = "sqlite")]

use std::path::PathBuf;

use route_kernel::{AirportCode, ResolverConfig, RouteManager, SqliteConfig, SqliteEdgeStore};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn code(s: &str) -> AirportCode {
    AirportCode::parse(s).unwrap()
}

struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("route-kernel-{}.db", uuid::Uuid::new_v4()));
        Self { path }
    }

    fn config(&self) -> SqliteConfig {
        SqliteConfig {
            database_url: format!("sqlite://{}", self.path.display()),
            max_connections: 2,
            connect_timeout_secs: 5,
        }
    }

    async fn manager(&self) -> RouteManager<SqliteEdgeStore> {
        let store = SqliteEdgeStore::new(self.config()).await.unwrap();
        RouteManager::load(store, None, ResolverConfig::default()).await.unwrap()
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Startup Reload
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_routes_survive_restart() {
    let db = TempDb::new();

    let first = db.manager().await;
    first.add_route(&code("JFK"), &code("ORD")).await.unwrap();
    first.add_route(&code("ORD"), &code("LAX")).await.unwrap();
    first.store().pool().close().await;
    drop(first);

    let second = db.manager().await;
    assert_eq!(second.graph_stats().airports, 3);
    assert_eq!(second.graph_stats().routes, 2);

    let resolved = second.find_path(&code("LAX"), &code("JFK")).await.unwrap();
    let names: Vec<&str> = resolved.route.airports().iter().map(|c| c.as_str()).collect();
    assert_eq!(names, vec!["LAX", "ORD", "JFK"]);
}

#[tokio::test]
async fn test_clear_survives_restart() {
    let db = TempDb::new();

    let first = db.manager().await;
    first.add_route(&code("JFK"), &code("ORD")).await.unwrap();
    first.clear_routes().await.unwrap();
    first.store().pool().close().await;
    drop(first);

    let second = db.manager().await;
    assert_eq!(second.graph_stats().airports, 0);
    assert!(second.find_path(&code("JFK"), &code("ORD")).await.is_err());
}

#[tokio::test]
async fn test_duplicate_after_restart_is_rejected() {
    let db = TempDb::new();

    let first = db.manager().await;
    assert!(first.add_route(&code("JFK"), &code("ORD")).await.unwrap().is_added());
    first.store().pool().close().await;
    drop(first);

    let second = db.manager().await;
    assert!(!second.add_route(&code("ORD"), &code("JFK")).await.unwrap().is_added());
}
