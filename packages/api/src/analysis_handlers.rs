// ABOUTME: HTTP request handlers for stored analysis results and AI usage
// ABOUTME: Current requirements analysis, latest confirmed project details, and usage statistics

use axum::extract::{Query, State};
use reqflow_ai::{AiUsageLog, AiUsageQuery, AiUsageStats};
use reqflow_core::AnalysisHandoff;
use reqflow_storage::StoredProjectDetails;
use tracing::info;

use crate::error::ApiError;
use crate::response::{ok, ApiResult};
use crate::state::AppState;

pub async fn get_analysis(State(state): State<AppState>) -> ApiResult<AnalysisHandoff> {
    match state.scenarios.current_analysis().await? {
        Some(handoff) => ok(handoff),
        None => Err(ApiError::NotFound(
            "No requirements analysis available".to_string(),
        )),
    }
}

pub async fn get_project_details(
    State(state): State<AppState>,
) -> ApiResult<StoredProjectDetails> {
    match state.project_details.latest().await? {
        Some(details) => ok(details),
        None => Err(ApiError::NotFound(
            "No confirmed project details".to_string(),
        )),
    }
}

/// Get aggregate AI usage statistics
pub async fn get_usage_stats(
    State(state): State<AppState>,
    Query(query): Query<AiUsageQuery>,
) -> ApiResult<AiUsageStats> {
    info!("Getting AI usage stats (operation: {:?})", query.operation);
    ok(state.usage_logs.get_stats(&query).await?)
}

pub async fn list_usage_logs(
    State(state): State<AppState>,
    Query(query): Query<AiUsageQuery>,
) -> ApiResult<Vec<AiUsageLog>> {
    ok(state.usage_logs.list_logs(&query).await?)
}
