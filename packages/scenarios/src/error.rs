// ABOUTME: Error types for scenario and test case management
// ABOUTME: Lookup failures, conflicts with in-flight work, blocked edits, and downstream failures

use reqflow_core::ValidationError;
use reqflow_flows::FlowError;
use reqflow_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Invalid scenario: {0}")]
    Validation(#[from] ValidationError),

    #[error("Scenario not found: {0}")]
    NotFound(String),

    #[error("Pending edit not found: {0}")]
    EditNotFound(String),

    #[error("Scenario already exists: {0}")]
    DuplicateId(String),

    #[error("Impact analysis already running for scenario {0}")]
    ImpactAnalysisInProgress(String),

    #[error("Edit to scenario {scenario_id} blocked: impact analysis failed ({reason})")]
    EditBlocked { scenario_id: String, reason: String },

    #[error("Scenario {0} was replaced or removed while its edit was being analyzed")]
    EditDiscarded(String),

    #[error("No requirements analysis available")]
    NoAnalysis,

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ScenarioResult<T> = Result<T, ScenarioError>;
