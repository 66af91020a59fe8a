// ABOUTME: Error types for requirements intake
// ABOUTME: Rejected uploads, invalid dictation transitions, analysis guards, and downstream failures

use reqflow_flows::FlowError;
use reqflow_storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read {name}: {reason}")]
    ReadFailed { name: String, reason: String },

    #[error("Cannot {action} dictation while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("Transcript is empty")]
    EmptyTranscript,

    #[error("Requirements document is empty")]
    NothingToAnalyze,

    #[error("Files are still being read or failed to read")]
    FilesNotReady,

    #[error("An analysis is already in progress")]
    AnalysisInProgress,

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type IntakeResult<T> = Result<T, IntakeError>;
