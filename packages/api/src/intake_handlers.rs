// ABOUTME: HTTP request handlers for requirements intake
// ABOUTME: File uploads, manual text, dictation transitions, project details, and analysis

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqflow_core::{AnalysisHandoff, ProjectDetails};
use reqflow_intake::IntakeSnapshot;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::response::{ok, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileRequest {
    pub name: String,
    pub mime_type: Option<String>,
    pub content_base64: String,
}

#[derive(Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub project_details: Option<ProjectDetails>,
}

pub async fn get_intake(State(state): State<AppState>) -> ApiResult<IntakeSnapshot> {
    ok(state.intake.snapshot().await)
}

/// Queue an upload and read every queued file
pub async fn upload_file(
    State(state): State<AppState>,
    Json(request): Json<UploadFileRequest>,
) -> ApiResult<IntakeSnapshot> {
    let bytes = BASE64
        .decode(request.content_base64.trim())
        .map_err(|e| ApiError::BadRequest(format!("contentBase64 is not valid base64: {}", e)))?;

    info!("Uploading requirements file {}", request.name);
    state
        .intake
        .enqueue_file(&request.name, request.mime_type.as_deref(), bytes)
        .await?;
    state.intake.read_queued_files().await;

    ok(state.intake.snapshot().await)
}

pub async fn remove_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> ApiResult<IntakeSnapshot> {
    state.intake.remove_file(&file_id).await?;
    ok(state.intake.snapshot().await)
}

pub async fn set_text(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> ApiResult<IntakeSnapshot> {
    state.intake.set_manual_text(request.text).await;
    ok(state.intake.snapshot().await)
}

pub async fn start_dictation(State(state): State<AppState>) -> ApiResult<IntakeSnapshot> {
    state.intake.start_dictation().await?;
    ok(state.intake.snapshot().await)
}

pub async fn push_transcript(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> ApiResult<IntakeSnapshot> {
    state.intake.push_transcript(&request.text).await?;
    ok(state.intake.snapshot().await)
}

pub async fn stop_dictation(State(state): State<AppState>) -> ApiResult<IntakeSnapshot> {
    state.intake.stop_dictation().await?;
    ok(state.intake.snapshot().await)
}

pub async fn cancel_dictation(State(state): State<AppState>) -> ApiResult<IntakeSnapshot> {
    state.intake.cancel_dictation().await?;
    ok(state.intake.snapshot().await)
}

pub async fn accept_dictation(State(state): State<AppState>) -> ApiResult<IntakeSnapshot> {
    state.intake.accept_dictation().await?;
    ok(state.intake.snapshot().await)
}

pub async fn discard_dictation(State(state): State<AppState>) -> ApiResult<IntakeSnapshot> {
    state.intake.discard_dictation().await?;
    ok(state.intake.snapshot().await)
}

/// Proposed project details for the confirmation dialog
pub async fn parse_project_details(State(state): State<AppState>) -> ApiResult<ProjectDetails> {
    ok(state.intake.prepare_project_details().await?)
}

/// Body is optional; `{"projectDetails": {...}}` persists confirmed details
pub async fn analyze(State(state): State<AppState>, body: Bytes) -> ApiResult<AnalysisHandoff> {
    let request: AnalyzeRequest = if body.iter().all(u8::is_ascii_whitespace) {
        AnalyzeRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid analyze request: {}", e)))?
    };

    ok(state.intake.analyze(request.project_details).await?)
}
