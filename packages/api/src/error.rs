// ABOUTME: API error type and its mapping to HTTP status codes
// ABOUTME: Converts intake, scenario, flow, and storage errors into the JSON error envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reqflow_flows::FlowError;
use reqflow_intake::IntakeError;
use reqflow_scenarios::ScenarioError;
use reqflow_storage::StorageError;
use thiserror::Error;
use tracing::error;

use crate::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The model replied unusably or could not be reached
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Internal details stay in the logs
    fn user_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        }
        (status, Json(ApiResponse::<()>::error(self.user_message()))).into_response()
    }
}

impl From<FlowError> for ApiError {
    fn from(err: FlowError) -> Self {
        match err {
            FlowError::SchemaValidation(_) => ApiError::BadRequest(err.to_string()),
            FlowError::ModelOutput(_) | FlowError::Service(_) => {
                ApiError::Upstream(err.to_string())
            }
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::UnsupportedFile(_)
            | IntakeError::ReadFailed { .. }
            | IntakeError::EmptyTranscript
            | IntakeError::NothingToAnalyze => ApiError::BadRequest(err.to_string()),
            IntakeError::FileNotFound(_) => ApiError::NotFound(err.to_string()),
            IntakeError::InvalidTransition { .. }
            | IntakeError::FilesNotReady
            | IntakeError::AnalysisInProgress => ApiError::Conflict(err.to_string()),
            IntakeError::Flow(e) => e.into(),
            IntakeError::Storage(e) => e.into(),
            IntakeError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<ScenarioError> for ApiError {
    fn from(err: ScenarioError) -> Self {
        match err {
            ScenarioError::Validation(_) => ApiError::BadRequest(err.to_string()),
            ScenarioError::NotFound(_)
            | ScenarioError::EditNotFound(_)
            | ScenarioError::NoAnalysis => {
                ApiError::NotFound(err.to_string())
            }
            ScenarioError::DuplicateId(_)
            | ScenarioError::ImpactAnalysisInProgress(_)
            | ScenarioError::EditBlocked { .. }
            | ScenarioError::EditDiscarded(_) => ApiError::Conflict(err.to_string()),
            ScenarioError::Flow(e) => e.into(),
            ScenarioError::Storage(e) => e.into(),
            ScenarioError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}
