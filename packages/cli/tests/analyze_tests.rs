// ABOUTME: Tests for the offline analyze command and the server router layers
// ABOUTME: Runs analyze_files over temporary files with fake prompt flows and an in-memory database

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use reqflow_api::AppState;
use reqflow_cli::{analyze_files, build_app, AnalyzeOptions};
use reqflow_config::Config;
use reqflow_core::{
    ComplianceResult, CompletenessValidation, Priority, ProjectDetails, RequirementType,
    TestCase, ValidationResult,
};
use reqflow_flows::{
    ComplianceCheckInput, FlowError, FlowResult, GenerateTestCasesInput, GenerateTestCasesOutput,
    ImpactAnalysisInput, ImpactAnalysisOutput, ParseScenariosOutput, ParsedScenario, PromptFlows,
};
use tempfile::NamedTempFile;

#[derive(Default)]
struct FakeFlows {
    fail_generation: bool,
}

#[async_trait]
impl PromptFlows for FakeFlows {
    async fn validate_requirements(&self, _requirements: &str) -> FlowResult<ValidationResult> {
        Ok(ValidationResult {
            completeness_validation: CompletenessValidation {
                is_valid: true,
                missing_elements: vec![],
            },
        })
    }

    async fn compliance_check(
        &self,
        _input: &ComplianceCheckInput,
    ) -> FlowResult<ComplianceResult> {
        Ok(ComplianceResult {
            compliance_report: "No gaps found".to_string(),
            suggestions: "None".to_string(),
        })
    }

    async fn parse_project_details(&self, _requirements: &str) -> FlowResult<ProjectDetails> {
        Ok(ProjectDetails {
            app_name: "CareTrack".to_string(),
            objective: "Patient portal".to_string(),
            features: vec!["Login".to_string()],
            tech_stack: vec![],
        })
    }

    async fn parse_scenarios(&self, _requirements: &str) -> FlowResult<ParseScenariosOutput> {
        Ok(ParseScenariosOutput {
            scenarios: vec![ParsedScenario {
                req_id: "REQ-001".to_string(),
                title: "Login".to_string(),
                description: "Users log in with email and password".to_string(),
                requirement_type: RequirementType::Functional,
                requirement_source: "Uploaded Document".to_string(),
                priority: Priority::Medium,
            }],
        })
    }

    async fn generate_test_cases(
        &self,
        _input: &GenerateTestCasesInput,
    ) -> FlowResult<GenerateTestCasesOutput> {
        if self.fail_generation {
            return Err(FlowError::Service("model unavailable".to_string()));
        }
        Ok(GenerateTestCasesOutput {
            test_cases: vec![TestCase {
                test_case_id: "TC-001".to_string(),
                title: "Valid login".to_string(),
                steps: vec!["Submit credentials".to_string()],
                expected_result: "Dashboard shown".to_string(),
                compliance_tags: vec!["HIPAA".to_string()],
                priority: Priority::Medium,
                confidence_level: "High".to_string(),
            }],
        })
    }

    async fn analyze_impact_on_change(
        &self,
        _input: &ImpactAnalysisInput,
    ) -> FlowResult<ImpactAnalysisOutput> {
        unimplemented!("not used by analyze")
    }
}

async fn state(flows: FakeFlows) -> AppState {
    let pool = reqflow_storage::memory_pool().await.unwrap();
    AppState::new(
        Arc::new(flows),
        pool,
        &Config::default(),
        "fake-model".to_string(),
    )
}

fn requirements_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_analyze_files_with_scenarios_and_tests() {
    let state = state(FakeFlows::default()).await;
    let file = requirements_file(
        ".txt",
        "The system must allow users to log in with email and password",
    );

    let report = analyze_files(
        &state,
        AnalyzeOptions {
            files: vec![file.path().to_path_buf()],
            text: Some("Sessions expire after 15 minutes".to_string()),
            scenarios: false,
            tests: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(report.project_details.app_name, "CareTrack");
    assert_eq!(
        report.analysis.requirements,
        "The system must allow users to log in with email and password\n\nSessions expire after 15 minutes"
    );

    let scenarios = report.scenarios.unwrap();
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0].id, "REQ-001");
    assert_eq!(scenarios[0].test_cases.len(), 1);
    assert!(!scenarios[0].are_tests_generating);
    assert!(report.generation_failures.is_empty());
}

#[tokio::test]
async fn test_analyze_without_scenarios_stops_after_analysis() {
    let state = state(FakeFlows::default()).await;

    let report = analyze_files(
        &state,
        AnalyzeOptions {
            text: Some("Audit every record change".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert!(report.scenarios.is_none());
    assert!(report.analysis.validation.completeness_validation.is_valid);
}

#[tokio::test]
async fn test_generation_failures_are_reported() {
    let state = state(FakeFlows {
        fail_generation: true,
    })
    .await;

    let report = analyze_files(
        &state,
        AnalyzeOptions {
            text: Some("Users log in".to_string()),
            tests: true,
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(report.generation_failures.len(), 1);
    assert_eq!(report.generation_failures[0].scenario_id, "REQ-001");
    assert!(report.scenarios.unwrap()[0].test_cases.is_empty());
}

#[tokio::test]
async fn test_analyze_rejects_unsupported_files() {
    let state = state(FakeFlows::default()).await;
    let file = requirements_file(".png", "not a document");

    let result = analyze_files(
        &state,
        AnalyzeOptions {
            files: vec![file.path().to_path_buf()],
            ..Default::default()
        },
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_analyze_with_nothing_to_analyze_fails() {
    let state = state(FakeFlows::default()).await;
    let result = analyze_files(&state, AnalyzeOptions::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_build_app_rejects_invalid_cors_origin() {
    let state = state(FakeFlows::default()).await;
    assert!(build_app(state.clone(), "http://localhost:5173").is_ok());
    assert!(build_app(state, "bad\norigin").is_err());
}
