//! JSON read models for the dashboard page.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::debug;

use crate::{SensorReading, SharedState, Warning};

// ---

pub fn router() -> Router<SharedState> {
    // ---
    Router::new()
        .route("/api/dashboard", get(dashboard))
        .route("/api/sensors", get(sensors))
        .route("/api/sensors/{sensor_id}/history", get(sensor_history))
        .route("/api/warnings", get(warnings))
}

/// Handle `GET /api/dashboard`: everything one redraw needs.
async fn dashboard(State(state): State<SharedState>) -> impl IntoResponse {
    // ---
    let view = state.read().await.view();
    debug!(
        "GET /api/dashboard - {} sensors, {} warnings",
        view.sensors.len(),
        view.warning_count
    );
    Json(view)
}

#[derive(Debug, Serialize)]
struct SensorSummary {
    sensor_id: String,
    readings: usize,
    latest: Option<SensorReading>,
}

/// Handle `GET /api/sensors`: known sensors in display order.
async fn sensors(State(state): State<SharedState>) -> impl IntoResponse {
    // ---
    let state = state.read().await;
    let history = state.history();
    let summaries: Vec<SensorSummary> = history
        .sensor_ids()
        .into_iter()
        .map(|id| SensorSummary {
            sensor_id: id.to_string(),
            readings: history.readings(id).len(),
            latest: history.latest(id).cloned(),
        })
        .collect();
    Json(summaries)
}

/// Handle `GET /api/sensors/{sensor_id}/history`: the capped sequence,
/// oldest first.
async fn sensor_history(
    Path(sensor_id): Path<String>,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    // ---
    let state = state.read().await;
    let readings = state.history().readings(&sensor_id);
    if readings.is_empty() {
        return (
            StatusCode::NOT_FOUND,
            Json(format!("Unknown sensor: {sensor_id}")),
        )
            .into_response();
    }
    (StatusCode::OK, Json(readings.to_vec())).into_response()
}

#[derive(Debug, Serialize)]
struct WarningsResponse {
    count: usize,
    warnings: Vec<Warning>,
}

/// Handle `GET /api/warnings`: the active feed, most recent last.
async fn warnings(State(state): State<SharedState>) -> impl IntoResponse {
    // ---
    let warnings = state.read().await.warnings().to_vec();
    Json(WarningsResponse {
        count: warnings.len(),
        warnings,
    })
}
