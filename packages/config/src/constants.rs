// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Reqflow

// Port Configuration
pub const REQFLOW_API_PORT: &str = "REQFLOW_API_PORT";
pub const PORT: &str = "PORT"; // Legacy

// CORS Configuration
pub const REQFLOW_CORS_ORIGIN: &str = "REQFLOW_CORS_ORIGIN";

// Persistence
pub const REQFLOW_DATABASE_URL: &str = "REQFLOW_DATABASE_URL";

// Prompt templates
pub const REQFLOW_PROMPTS_DIR: &str = "REQFLOW_PROMPTS_DIR";

// Model service
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ANTHROPIC_MODEL: &str = "ANTHROPIC_MODEL";
pub const ANTHROPIC_API_URL: &str = "ANTHROPIC_API_URL";
pub const REQFLOW_HTTP_REQUEST_TIMEOUT_SECS: &str = "REQFLOW_HTTP_REQUEST_TIMEOUT_SECS";

// Workflow behaviour
pub const REQFLOW_COMPLIANCE_STANDARDS: &str = "REQFLOW_COMPLIANCE_STANDARDS";
pub const REQFLOW_TEST_STANDARDS: &str = "REQFLOW_TEST_STANDARDS";
pub const REQFLOW_IMPACT_FAILURE_POLICY: &str = "REQFLOW_IMPACT_FAILURE_POLICY";

// Defaults
pub const DEFAULT_API_PORT: u16 = 4001;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://reqflow.db?mode=rwc";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_HTTP_REQUEST_TIMEOUT_SECS: u64 = 600;
