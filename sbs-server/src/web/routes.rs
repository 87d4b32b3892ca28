//! REST API route handlers.
//!
//! Every handler takes the registry read lock, builds its JSON, and releases
//! the lock before responding.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use sbs_core::{icao_from_hex, icao_to_string, squawk_to_string, Aircraft};
use sbs_feeder::StatsSnapshot;

use crate::engine::read_registry;
use crate::web::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StationView<'a> {
    station: &'a str,
    #[serde(flatten)]
    stats: StatsSnapshot,
    /// Aircraft this station has reported.
    aircraft: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn aircraft_summary(ac: &Aircraft) -> Value {
    let pos = ac.position();
    json!({
        "icao": icao_to_string(ac.icao),
        "callsign": ac.callsign,
        "squawk": ac.squawk.map(squawk_to_string),
        "lat": pos.map(|p| p.lat),
        "lon": pos.map(|p| p.lon),
        "altitude_ft": ac.altitude_ft,
        "ground_speed_kts": ac.ground_speed_kts,
        "track_deg": ac.track_deg,
        "vertical_rate_fpm": ac.vertical_rate_fpm,
        "squawk_alert": ac.squawk_alert,
        "emergency": ac.emergency,
        "ident_active": ac.ident_active,
        "on_ground": ac.on_ground,
        "stations": ac.stations,
        "messages": ac.message_count,
        "duplicates": ac.duplicate_count,
        "first_seen": ac.first_seen,
        "last_seen": ac.last_seen,
    })
}

fn not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "Aircraft not found"})),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Aircraft endpoints
// ---------------------------------------------------------------------------

/// GET /api/aircraft — all aircraft, most recently seen first.
pub async fn api_aircraft(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = read_registry(&state.registry);
    let aircraft: Vec<Value> = registry.snapshot().into_iter().map(aircraft_summary).collect();
    Json(json!(aircraft))
}

/// GET /api/aircraft/:icao — single aircraft with its position trail.
pub async fn api_aircraft_detail(
    State(state): State<Arc<AppState>>,
    Path(icao): Path<String>,
) -> impl IntoResponse {
    let Some(icao) = icao_from_hex(&icao) else {
        return not_found();
    };

    let registry = read_registry(&state.registry);
    let Some(ac) = registry.get(icao) else {
        return not_found();
    };

    Json(json!({
        "aircraft": aircraft_summary(ac),
        "trail": ac.location_history,
    }))
    .into_response()
}

// ---------------------------------------------------------------------------
// Station / stats endpoints
// ---------------------------------------------------------------------------

/// GET /api/stations — per-station connection and parse counters.
pub async fn api_stations(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = read_registry(&state.registry);
    let coverage = registry.station_coverage();

    let stations: Vec<StationView> = state
        .stations
        .iter()
        .map(|entry| StationView {
            station: &entry.address,
            stats: entry.stats.snapshot(),
            aircraft: coverage.get(entry.address.as_str()).copied().unwrap_or(0),
        })
        .collect();
    Json(json!(stations))
}

/// GET /api/stats — registry totals.
pub async fn api_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = read_registry(&state.registry);
    Json(json!({
        "aircraft": registry.len(),
        "total_messages": registry.total_messages,
        "accepted_messages": registry.accepted_messages,
        "duplicate_messages": registry.duplicate_messages,
        "stations": state.stations.len(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
