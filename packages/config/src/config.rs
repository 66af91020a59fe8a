// ABOUTME: Typed service configuration loaded from environment variables
// ABOUTME: Validates ports, timeouts, standards lists, and the impact failure policy

use std::env;
use std::fmt;
use std::num::ParseIntError;
use std::path::PathBuf;

use reqflow_core::{ImpactFailurePolicy, DEFAULT_COMPLIANCE_STANDARDS, DEFAULT_TEST_STANDARDS};
use thiserror::Error;
use tracing::debug;

use crate::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid request timeout: {0}")]
    InvalidTimeout(String),
    #[error("Invalid impact failure policy: {0}")]
    InvalidImpactPolicy(String),
    #[error("{0} must list at least one standard")]
    EmptyStandards(&'static str),
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origin: String,
    pub database_url: String,
    pub prompts_dir: Option<PathBuf>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub anthropic_api_url: String,
    pub request_timeout_secs: u64,
    pub compliance_standards: String,
    pub test_standards: Vec<String>,
    pub impact_failure_policy: ImpactFailurePolicy,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("cors_origin", &self.cors_origin)
            .field("database_url", &self.database_url)
            .field("prompts_dir", &self.prompts_dir)
            .field(
                "anthropic_api_key",
                &self.anthropic_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("anthropic_model", &self.anthropic_model)
            .field("anthropic_api_url", &self.anthropic_api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("compliance_standards", &self.compliance_standards)
            .field("test_standards", &self.test_standards)
            .field("impact_failure_policy", &self.impact_failure_policy)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_API_PORT,
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            prompts_dir: None,
            anthropic_api_key: None,
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            anthropic_api_url: DEFAULT_ANTHROPIC_API_URL.to_string(),
            request_timeout_secs: DEFAULT_HTTP_REQUEST_TIMEOUT_SECS,
            compliance_standards: DEFAULT_COMPLIANCE_STANDARDS.to_string(),
            test_standards: DEFAULT_TEST_STANDARDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            impact_failure_policy: ImpactFailurePolicy::default(),
        }
    }
}

/// Read a variable, treating unset and blank values the same
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let port = match non_empty_var(REQFLOW_API_PORT).or_else(|| non_empty_var(PORT)) {
            Some(port_str) => port_str.parse::<u16>()?,
            None => defaults.port,
        };

        // Validate port is in valid range
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let cors_origin = non_empty_var(REQFLOW_CORS_ORIGIN).unwrap_or(defaults.cors_origin);
        let database_url = non_empty_var(REQFLOW_DATABASE_URL).unwrap_or(defaults.database_url);
        let prompts_dir = non_empty_var(REQFLOW_PROMPTS_DIR).map(PathBuf::from);

        let anthropic_api_key = non_empty_var(ANTHROPIC_API_KEY);
        let anthropic_model = non_empty_var(ANTHROPIC_MODEL).unwrap_or(defaults.anthropic_model);
        let anthropic_api_url = non_empty_var(ANTHROPIC_API_URL)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.anthropic_api_url);

        let request_timeout_secs = match non_empty_var(REQFLOW_HTTP_REQUEST_TIMEOUT_SECS) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => defaults.request_timeout_secs,
        };

        let compliance_standards = non_empty_var(REQFLOW_COMPLIANCE_STANDARDS)
            .unwrap_or(defaults.compliance_standards);

        let test_standards = match non_empty_var(REQFLOW_TEST_STANDARDS) {
            Some(raw) => {
                let standards: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if standards.is_empty() {
                    return Err(ConfigError::EmptyStandards(REQFLOW_TEST_STANDARDS));
                }
                standards
            }
            None => defaults.test_standards,
        };

        let impact_failure_policy = match non_empty_var(REQFLOW_IMPACT_FAILURE_POLICY) {
            Some(raw) => raw
                .parse::<ImpactFailurePolicy>()
                .map_err(|_| ConfigError::InvalidImpactPolicy(raw))?,
            None => defaults.impact_failure_policy,
        };

        let config = Config {
            port,
            cors_origin,
            database_url,
            prompts_dir,
            anthropic_api_key,
            anthropic_model,
            anthropic_api_url,
            request_timeout_secs,
            compliance_standards,
            test_standards,
            impact_failure_policy,
        };
        debug!("Loaded configuration: {:?}", config);

        Ok(config)
    }
}
