// ABOUTME: Domain type definitions for requirements analysis and scenario management
// ABOUTME: Scenarios, test cases, project details, and the validation/compliance results produced by AI flows

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("Unknown priority: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RequirementType {
    #[default]
    Functional,
    #[serde(rename = "Non-Functional")]
    NonFunctional,
    Business,
}

impl RequirementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementType::Functional => "Functional",
            RequirementType::NonFunctional => "Non-Functional",
            RequirementType::Business => "Business",
        }
    }
}

impl fmt::Display for RequirementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated verification script, always owned by exactly one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub test_case_id: String,
    pub title: String,
    pub steps: Vec<String>,
    pub expected_result: String,
    pub compliance_tags: Vec<String>,
    pub priority: Priority,
    pub confidence_level: String,
}

/// A structured, requirement-derived unit that test cases are generated against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub req_id: String,
    pub title: String,
    pub description: String,
    pub requirement_type: RequirementType,
    pub requirement_source: String,
    pub priority: Priority,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
    #[serde(default)]
    pub are_tests_generating: bool,
}

impl Scenario {
    /// Apply the user-editable fields of a draft, keeping identity and test cases
    pub fn apply_draft(&mut self, draft: &ScenarioDraft) {
        if let Some(req_id) = draft.req_id.as_ref().filter(|r| !r.trim().is_empty()) {
            self.req_id = req_id.trim().to_string();
        }
        self.title = draft.title.clone();
        self.description = draft.description.clone();
        self.requirement_type = draft.requirement_type;
        self.requirement_source = draft.requirement_source.clone();
        self.priority = draft.priority;
    }

    pub fn has_test_cases(&self) -> bool {
        !self.test_cases.is_empty()
    }
}

fn default_requirement_source() -> String {
    "Manual".to_string()
}

/// User-submitted scenario fields for create and edit operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDraft {
    #[serde(default)]
    pub req_id: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub requirement_type: RequirementType,
    #[serde(default = "default_requirement_source")]
    pub requirement_source: String,
}

impl ScenarioDraft {
    /// Build a draft pre-filled from an existing scenario
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self {
            req_id: Some(scenario.req_id.clone()),
            title: scenario.title.clone(),
            description: scenario.description.clone(),
            priority: scenario.priority,
            requirement_type: scenario.requirement_type,
            requirement_source: scenario.requirement_source.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingElement {
    pub element: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessValidation {
    pub is_valid: bool,
    pub missing_elements: Vec<MissingElement>,
}

/// Completeness verdict for a requirements document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub completeness_validation: CompletenessValidation,
}

/// Compliance report against healthcare standards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceResult {
    pub compliance_report: String,
    pub suggestions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub app_name: String,
    pub objective: String,
    pub features: Vec<String>,
    pub tech_stack: Vec<String>,
}

/// Analysis results handed from intake to scenario derivation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisHandoff {
    pub validation: ValidationResult,
    pub compliance: ComplianceResult,
    pub requirements: String,
}

/// What the edit workflow does when the impact analysis call itself fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactFailurePolicy {
    /// Apply the edit without the narrative, keeping existing test cases
    #[default]
    FailOpen,
    /// Block the edit until the caller explicitly forces it
    FailClosed,
}

impl FromStr for ImpactFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail-open" | "open" => Ok(ImpactFailurePolicy::FailOpen),
            "fail-closed" | "closed" => Ok(ImpactFailurePolicy::FailClosed),
            other => Err(format!("Unknown impact failure policy: {}", other)),
        }
    }
}
