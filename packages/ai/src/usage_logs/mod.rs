// ABOUTME: AI usage logs module for tracking generative model calls
// ABOUTME: Provides types and storage for monitoring token consumption per flow

pub mod storage;
pub mod types;

pub use storage::AiUsageLogStorage;
pub use types::{AiUsageLog, AiUsageQuery, AiUsageStats, ModelStats, OperationStats};
