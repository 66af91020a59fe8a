// ABOUTME: Core types, constants, and utilities for Reqflow
// ABOUTME: Foundational package providing the scenario, test case, and analysis model shared by all packages

pub mod constants;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{
    AnalysisHandoff, ComplianceResult, CompletenessValidation, ImpactFailurePolicy,
    MissingElement, Priority, ProjectDetails, RequirementType, Scenario, ScenarioDraft, TestCase,
    ValidationResult,
};

// Re-export constants
pub use constants::{
    DEFAULT_COMPLIANCE_STANDARDS, DEFAULT_TEST_STANDARDS, FALLBACK_SCENARIO_SOURCE,
    FALLBACK_SCENARIO_TITLE, HANDOFF_KEY,
};

// Re-export utilities
pub use utils::{generate_edit_id, generate_file_id, generate_scenario_id, truncate_for_log};

// Re-export validation
pub use validation::{require_non_blank, ValidationError};
