// ABOUTME: AI service for generation calls over a model client
// ABOUTME: Returns raw replies with usage and decodes fenced JSON replies into typed values

use std::sync::Arc;

use reqflow_core::truncate_for_log;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::client::{AIResponse, AIServiceError, AIServiceResult, AnthropicClient, ModelClient};

/// AI service for making generation calls
#[derive(Clone)]
pub struct AIService {
    client: Arc<dyn ModelClient>,
}

impl AIService {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Service backed by the Anthropic Messages API
    pub fn anthropic(
        api_key: Option<String>,
        model: &str,
        base_url: &str,
        timeout_secs: u64,
    ) -> AIServiceResult<Self> {
        let client = AnthropicClient::new(api_key, model, base_url, timeout_secs)?;
        Ok(Self::new(Arc::new(client)))
    }

    /// Get the model being used by this service
    pub fn model(&self) -> String {
        self.client.model()
    }

    pub fn provider(&self) -> &'static str {
        self.client.provider()
    }

    /// Makes a generation call. Decode the reply with [`parse_structured`] so usage
    /// is still known when the reply is not valid JSON.
    pub async fn generate_text(
        &self,
        prompt: String,
        system_prompt: Option<String>,
    ) -> AIServiceResult<AIResponse<String>> {
        self.client.complete(prompt, system_prompt).await
    }
}

/// Strip markdown code fences if present (```json ... ``` or ```` ... ````)
pub fn strip_code_fences(text: &str) -> &str {
    let cleaned_text = text.trim();
    if !cleaned_text.starts_with("```") {
        return cleaned_text;
    }

    // Content starts after the first newline of the opening fence
    let start = cleaned_text.find('\n').map(|i| i + 1).unwrap_or(cleaned_text.len());
    cleaned_text[start..].trim_end_matches('`').trim()
}

/// Decode a model reply into `T`
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> AIServiceResult<T> {
    let json_text = strip_code_fences(text);
    debug!("Raw JSON response: {}", truncate_for_log(json_text, 5000));

    serde_json::from_str(json_text).map_err(|e| {
        error!(
            "JSON parsing failed: {}. JSON snippet: {}",
            e,
            truncate_for_log(json_text, 500)
        );
        AIServiceError::ParseError(format!("Failed to parse JSON: {}", e))
    })
}
