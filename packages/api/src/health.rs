// ABOUTME: Liveness and status endpoints
// ABOUTME: Status adds the configured model, uptime, and a glance at intake and scenarios

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "reqflow"
    }))
}

pub async fn status_check(State(state): State<AppState>) -> Json<Value> {
    let now = Utc::now();
    let intake = state.intake.snapshot().await;
    let summary = state.scenarios.summary().await;

    Json(json!({
        "status": "healthy",
        "timestamp": now.timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "reqflow",
        "uptimeSecs": (now - state.started_at).num_seconds(),
        "model": state.model,
        "intake": {
            "state": intake.state,
            "files": intake.files.len(),
            "canAnalyze": intake.can_analyze
        },
        "scenarios": {
            "total": summary.total_scenarios,
            "generating": summary.scenarios_generating
        }
    }))
}
