// ABOUTME: HTTP request handlers for scenarios, test generation, and pending edits
// ABOUTME: Thin wrappers over the scenario manager plus the dashboard summary

use axum::{
    extract::{Path, State},
    Json,
};
use reqflow_core::{Scenario, ScenarioDraft};
use reqflow_scenarios::{
    EditOutcome, GenerationOutcome, ParseOutcome, PendingEdit, ScenarioSummary,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::response::{ok, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ParseRequest {
    pub requirements: String,
}

#[derive(Serialize)]
pub struct CancelGenerationResponse {
    pub cancelled: bool,
}

pub async fn list_scenarios(State(state): State<AppState>) -> ApiResult<Vec<Scenario>> {
    ok(state.scenarios.list().await)
}

pub async fn create_scenario(
    State(state): State<AppState>,
    Json(draft): Json<ScenarioDraft>,
) -> ApiResult<Scenario> {
    ok(state.scenarios.create(draft).await?)
}

pub async fn get_scenario(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Scenario> {
    ok(state.scenarios.get(&id).await?)
}

/// Edit a scenario; may answer with a pending edit awaiting confirmation
pub async fn update_scenario(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<ScenarioDraft>,
) -> ApiResult<EditOutcome> {
    ok(state.scenarios.edit(&id, draft).await?)
}

pub async fn force_edit_scenario(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<ScenarioDraft>,
) -> ApiResult<Scenario> {
    ok(state.scenarios.force_edit(&id, draft).await?)
}

pub async fn delete_scenario(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Scenario> {
    ok(state.scenarios.delete(&id).await?)
}

pub async fn parse_scenarios(
    State(state): State<AppState>,
    Json(request): Json<ParseRequest>,
) -> ApiResult<ParseOutcome> {
    ok(state
        .scenarios
        .parse_from_document(&request.requirements)
        .await?)
}

pub async fn scenarios_from_analysis(State(state): State<AppState>) -> ApiResult<ParseOutcome> {
    ok(state.scenarios.parse_from_analysis().await?)
}

pub async fn generate_tests(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<GenerationOutcome> {
    match state.scenarios.generate_tests(&id).await? {
        GenerationOutcome::AlreadyInProgress => Err(ApiError::Conflict(format!(
            "Test generation already in progress for scenario {}",
            id
        ))),
        outcome => ok(outcome),
    }
}

pub async fn cancel_generation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CancelGenerationResponse> {
    let cancelled = state.scenarios.cancel_generation(&id).await?;
    ok(CancelGenerationResponse { cancelled })
}

pub async fn confirm_edit(
    State(state): State<AppState>,
    Path(edit_id): Path<String>,
) -> ApiResult<Scenario> {
    ok(state.scenarios.confirm_edit(&edit_id).await?)
}

pub async fn cancel_edit(
    State(state): State<AppState>,
    Path(edit_id): Path<String>,
) -> ApiResult<PendingEdit> {
    ok(state.scenarios.cancel_edit(&edit_id).await?)
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<ScenarioSummary> {
    ok(state.scenarios.summary().await)
}
