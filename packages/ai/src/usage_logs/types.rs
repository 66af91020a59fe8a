// ABOUTME: AI usage log type definitions
// ABOUTME: Structures for tracking model calls, token consumption, and failures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::Usage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiUsageLog {
    pub id: String,
    pub operation: String,
    pub model: String,
    pub provider: String,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub total_tokens: Option<i64>,
    pub duration_ms: Option<i64>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AiUsageLog {
    /// Log entry for a call that returned, with or without a usable reply
    pub fn new(
        operation: &str,
        model: &str,
        provider: &str,
        usage: Option<Usage>,
        duration_ms: i64,
        error: Option<String>,
    ) -> Self {
        Self {
            id: nanoid::nanoid!(10),
            operation: operation.to_string(),
            model: model.to_string(),
            provider: provider.to_string(),
            input_tokens: usage.map(|u| u.input_tokens as i64),
            output_tokens: usage.map(|u| u.output_tokens as i64),
            total_tokens: usage.map(|u| u.total_tokens() as i64),
            duration_ms: Some(duration_ms),
            error,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiUsageStats {
    pub total_requests: i64,
    pub successful_requests: i64,
    pub failed_requests: i64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub total_tokens: i64,
    pub average_duration_ms: f64,
    pub by_operation: Vec<OperationStats>,
    pub by_model: Vec<ModelStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStats {
    pub operation: String,
    pub count: i64,
    pub failed: i64,
    pub total_tokens: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    pub model: String,
    pub count: i64,
    pub total_tokens: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiUsageQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub operation: Option<String>,
    pub model: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
