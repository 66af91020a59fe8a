// ABOUTME: Shared constants for Reqflow
// ABOUTME: Default compliance standards, fallback scenario values, and persistence keys

/// Standards text sent with the compliance check
pub const DEFAULT_COMPLIANCE_STANDARDS: &str = "FDA, GDPR, ISO 13485, HIPAA";

/// Standards attached to every test-case generation request
pub const DEFAULT_TEST_STANDARDS: &[&str] = &["FDA", "GDPR"];

/// Key under which the intake analysis is handed to scenario derivation
pub const HANDOFF_KEY: &str = "requirementsAnalysis";

pub const FALLBACK_SCENARIO_TITLE: &str = "Initial Scenario from Requirements";
pub const FALLBACK_SCENARIO_SOURCE: &str = "Uploaded Document";

/// Prefix for generated scenario ids
pub const SCENARIO_ID_PREFIX: &str = "SCN";
