// ABOUTME: HTTP API layer for Reqflow providing REST endpoints and routing
// ABOUTME: Integration layer that depends on the intake, scenario, and storage packages

use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub mod analysis_handlers;
pub mod error;
pub mod health;
pub mod intake_handlers;
pub mod response;
pub mod scenario_handlers;
pub mod state;

pub use error::ApiError;
pub use response::{ApiResponse, ApiResult};
pub use state::AppState;

/// Creates the intake API router (nested under /api/intake)
pub fn create_intake_router() -> Router<AppState> {
    Router::new()
        .route("/", get(intake_handlers::get_intake))
        .route("/files", post(intake_handlers::upload_file))
        .route("/files/{file_id}", delete(intake_handlers::remove_file))
        .route("/text", put(intake_handlers::set_text))
        .route("/dictation/start", post(intake_handlers::start_dictation))
        .route("/dictation/transcript", post(intake_handlers::push_transcript))
        .route("/dictation/stop", post(intake_handlers::stop_dictation))
        .route("/dictation/cancel", post(intake_handlers::cancel_dictation))
        .route("/dictation/accept", post(intake_handlers::accept_dictation))
        .route("/dictation/discard", post(intake_handlers::discard_dictation))
        .route(
            "/project-details",
            post(intake_handlers::parse_project_details),
        )
        .route("/analyze", post(intake_handlers::analyze))
}

/// Creates the scenarios API router (nested under /api/scenarios)
pub fn create_scenarios_router() -> Router<AppState> {
    Router::new()
        .route("/", get(scenario_handlers::list_scenarios))
        .route("/", post(scenario_handlers::create_scenario))
        .route("/parse", post(scenario_handlers::parse_scenarios))
        .route(
            "/from-analysis",
            post(scenario_handlers::scenarios_from_analysis),
        )
        .route("/{id}", get(scenario_handlers::get_scenario))
        .route("/{id}", put(scenario_handlers::update_scenario))
        .route("/{id}", delete(scenario_handlers::delete_scenario))
        .route(
            "/{id}/force-edit",
            post(scenario_handlers::force_edit_scenario),
        )
        .route(
            "/{id}/generate-tests",
            post(scenario_handlers::generate_tests),
        )
        .route(
            "/{id}/generate-tests/cancel",
            post(scenario_handlers::cancel_generation),
        )
}

/// Creates the pending scenario edits router (nested under /api/scenario-edits)
pub fn create_scenario_edits_router() -> Router<AppState> {
    Router::new()
        .route("/{edit_id}/confirm", post(scenario_handlers::confirm_edit))
        .route("/{edit_id}/cancel", post(scenario_handlers::cancel_edit))
}

/// Creates the AI usage router (nested under /api/ai-usage)
pub fn create_ai_usage_router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(analysis_handlers::get_usage_stats))
        .route("/logs", get(analysis_handlers::list_usage_logs))
}

/// The full API with state applied
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/status", get(health::status_check))
        .route("/api/analysis", get(analysis_handlers::get_analysis))
        .route(
            "/api/project-details",
            get(analysis_handlers::get_project_details),
        )
        .route("/api/dashboard", get(scenario_handlers::dashboard))
        .nest("/api/intake", create_intake_router())
        .nest("/api/scenarios", create_scenarios_router())
        .nest("/api/scenario-edits", create_scenario_edits_router())
        .nest("/api/ai-usage", create_ai_usage_router())
        .with_state(state)
}
