// ABOUTME: Generative model integration and usage tracking
// ABOUTME: Model client boundary, Anthropic client, structured generation, and usage log management

pub mod client;
pub mod service;
pub mod usage_logs;

// Re-export client types
pub use client::{
    AIResponse, AIServiceError, AIServiceResult, AnthropicClient, ModelClient, Usage,
};

// Re-export service types
pub use service::{parse_structured, strip_code_fences, AIService};

// Re-export usage log types
pub use usage_logs::{
    AiUsageLog, AiUsageLogStorage, AiUsageQuery, AiUsageStats, ModelStats, OperationStats,
};
