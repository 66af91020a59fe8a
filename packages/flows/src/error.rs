// ABOUTME: Error types for prompt flow execution
// ABOUTME: Separates input schema violations, unusable model output, and service failures

use reqflow_ai::AIServiceError;
use reqflow_core::ValidationError;
use reqflow_prompts::PromptError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    /// Input rejected before any model call
    #[error("Invalid flow input: {0}")]
    SchemaValidation(#[from] ValidationError),

    /// Model replied, but not in the declared shape
    #[error("Model output did not match the expected shape: {0}")]
    ModelOutput(String),

    /// Transport, configuration, or provider failure
    #[error("Model service failure: {0}")]
    Service(String),
}

pub type FlowResult<T> = Result<T, FlowError>;

impl From<AIServiceError> for FlowError {
    fn from(err: AIServiceError) -> Self {
        match err {
            AIServiceError::ParseError(msg) => FlowError::ModelOutput(msg),
            AIServiceError::InvalidResponse => {
                FlowError::ModelOutput("reply contained no text".to_string())
            }
            other => FlowError::Service(other.to_string()),
        }
    }
}

impl From<PromptError> for FlowError {
    fn from(err: PromptError) -> Self {
        FlowError::Service(format!("Prompt error: {}", err))
    }
}
