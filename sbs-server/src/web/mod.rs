//! Web server — read-only axum API over the live registry.
//!
//! Shared state is the registry the engine writes to plus the per-station
//! counters owned by the connectors. Handlers only ever take read locks.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use sbs_core::Registry;
use sbs_feeder::StationStats;

pub mod routes;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub registry: Arc<RwLock<Registry>>,
    pub stations: Vec<StationEntry>,
}

pub struct StationEntry {
    pub address: String,
    pub stats: Arc<StationStats>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/api/aircraft", axum::routing::get(routes::api_aircraft))
        .route(
            "/api/aircraft/:icao",
            axum::routing::get(routes::api_aircraft_detail),
        )
        .route("/api/stations", axum::routing::get(routes::api_stations))
        .route("/api/stats", axum::routing::get(routes::api_stats))
        .with_state(state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(cors)
}

/// Serve the API on `host:port` until `shutdown` is cancelled.
pub async fn serve(
    state: Arc<AppState>,
    host: &str,
    port: u16,
    static_dir: Option<PathBuf>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let app = build_router(state, static_dir);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("sbs-merge dashboard listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use sbs_core::HistoryLimits;

    fn empty_state() -> Arc<AppState> {
        Arc::new(AppState {
            registry: Arc::new(RwLock::new(Registry::new(HistoryLimits::default()))),
            stations: Vec::new(),
        })
    }

    #[tokio::test]
    async fn test_serve_reports_bind_failure() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let result = serve(empty_state(), "127.0.0.1", port, None, CancellationToken::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_serve_stops_on_cancel() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = serve(empty_state(), "127.0.0.1", 0, None, cancel).await;
        assert!(result.is_ok());
    }
}
