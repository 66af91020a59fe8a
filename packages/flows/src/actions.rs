// ABOUTME: Action layer between callers and the prompt flows
// ABOUTME: Reshapes caller arguments into flow inputs and flow outputs into domain values

use reqflow_core::{
    ComplianceResult, Priority, ProjectDetails, Scenario, TestCase, ValidationResult,
};

use crate::error::FlowResult;
use crate::runner::PromptFlows;
use crate::types::{
    ComplianceCheckInput, GenerateTestCasesInput, ImpactAnalysisInput, ParsedScenario,
};

/// Flatten test cases to one `ID: x, Title: y` line each
pub fn flatten_test_cases(test_cases: &[TestCase]) -> String {
    test_cases
        .iter()
        .map(|tc| format!("ID: {}, Title: {}", tc.test_case_id, tc.title))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Give parsed scenarios their identity: `id = reqId`, no tests, not generating
pub fn scenarios_from_parsed(parsed: Vec<ParsedScenario>) -> Vec<Scenario> {
    parsed
        .into_iter()
        .map(|s| Scenario {
            id: s.req_id.clone(),
            req_id: s.req_id,
            title: s.title,
            description: s.description,
            requirement_type: s.requirement_type,
            requirement_source: s.requirement_source,
            priority: s.priority,
            test_cases: Vec::new(),
            are_tests_generating: false,
        })
        .collect()
}

pub fn standards_to_text(standards: &[String]) -> String {
    standards.join(", ")
}

pub async fn run_validation(
    flows: &dyn PromptFlows,
    requirements: &str,
) -> FlowResult<ValidationResult> {
    flows.validate_requirements(requirements).await
}

pub async fn run_compliance_check(
    flows: &dyn PromptFlows,
    requirements: &str,
    compliance_standards: &str,
) -> FlowResult<ComplianceResult> {
    flows
        .compliance_check(&ComplianceCheckInput {
            requirements: requirements.to_string(),
            compliance_standards: compliance_standards.to_string(),
        })
        .await
}

pub async fn run_parse_project_details(
    flows: &dyn PromptFlows,
    requirements: &str,
) -> FlowResult<ProjectDetails> {
    flows.parse_project_details(requirements).await
}

pub async fn run_parse_scenarios(
    flows: &dyn PromptFlows,
    requirements: &str,
) -> FlowResult<Vec<Scenario>> {
    let output = flows.parse_scenarios(requirements).await?;
    Ok(scenarios_from_parsed(output.scenarios))
}

pub async fn run_test_case_generation(
    flows: &dyn PromptFlows,
    scenario: &str,
    compliance_standards: &[String],
    priority: Priority,
) -> FlowResult<Vec<TestCase>> {
    let output = flows
        .generate_test_cases(&GenerateTestCasesInput {
            scenario: scenario.to_string(),
            compliance_standards: compliance_standards.to_vec(),
            priority,
        })
        .await?;
    Ok(output.test_cases)
}

/// Ask for an impact narrative; the test cases are flattened first
pub async fn run_impact_analysis(
    flows: &dyn PromptFlows,
    requirement_changes: &str,
    existing_test_cases: &[TestCase],
) -> FlowResult<String> {
    let output = flows
        .analyze_impact_on_change(&ImpactAnalysisInput {
            requirement_changes: requirement_changes.to_string(),
            existing_test_cases: flatten_test_cases(existing_test_cases),
        })
        .await?;
    Ok(output.impact_analysis)
}
