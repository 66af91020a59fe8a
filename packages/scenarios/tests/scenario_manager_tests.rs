// ABOUTME: Integration tests for the scenario manager over fake prompt flows
// ABOUTME: Covers parsing with fallback, the impact-gated edit workflow, deletion, and test generation

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use reqflow_core::{
    AnalysisHandoff, ComplianceResult, CompletenessValidation, ImpactFailurePolicy, Priority,
    ProjectDetails, RequirementType, ScenarioDraft, TestCase, ValidationResult,
    FALLBACK_SCENARIO_TITLE,
};
use reqflow_flows::{
    ComplianceCheckInput, FlowError, FlowResult, GenerateTestCasesInput, GenerateTestCasesOutput,
    ImpactAnalysisInput, ImpactAnalysisOutput, ParseScenariosOutput, ParsedScenario, PromptFlows,
};
use reqflow_scenarios::{EditOutcome, GenerationOutcome, ScenarioError, ScenarioManager};
use reqflow_storage::HandoffStorage;

#[derive(Default)]
struct FakeFlows {
    parsed: Vec<ParsedScenario>,
    fail_parse: bool,
    fail_generation: AtomicBool,
    fail_impact: bool,
    generation_delay_ms: u64,
    impact_delay_ms: u64,
    impact_calls: AtomicUsize,
    last_changes: Mutex<String>,
    last_generation: Mutex<Option<GenerateTestCasesInput>>,
}

#[async_trait]
impl PromptFlows for FakeFlows {
    async fn validate_requirements(&self, _requirements: &str) -> FlowResult<ValidationResult> {
        unimplemented!("not used by scenarios")
    }

    async fn compliance_check(
        &self,
        _input: &ComplianceCheckInput,
    ) -> FlowResult<ComplianceResult> {
        unimplemented!("not used by scenarios")
    }

    async fn parse_project_details(&self, _requirements: &str) -> FlowResult<ProjectDetails> {
        unimplemented!("not used by scenarios")
    }

    async fn parse_scenarios(&self, _requirements: &str) -> FlowResult<ParseScenariosOutput> {
        if self.fail_parse {
            return Err(FlowError::ModelOutput("not JSON".to_string()));
        }
        Ok(ParseScenariosOutput {
            scenarios: self.parsed.clone(),
        })
    }

    async fn generate_test_cases(
        &self,
        input: &GenerateTestCasesInput,
    ) -> FlowResult<GenerateTestCasesOutput> {
        *self.last_generation.lock().unwrap() = Some(input.clone());
        tokio::time::sleep(Duration::from_millis(self.generation_delay_ms)).await;
        if self.fail_generation.load(Ordering::SeqCst) {
            return Err(FlowError::Service("model overloaded".to_string()));
        }
        Ok(GenerateTestCasesOutput {
            test_cases: vec![
                test_case("TC-001", "Valid login"),
                test_case("TC-002", "Wrong password"),
            ],
        })
    }

    async fn analyze_impact_on_change(
        &self,
        input: &ImpactAnalysisInput,
    ) -> FlowResult<ImpactAnalysisOutput> {
        self.impact_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_changes.lock().unwrap() = input.requirement_changes.clone();
        tokio::time::sleep(Duration::from_millis(self.impact_delay_ms)).await;
        if self.fail_impact {
            return Err(FlowError::Service("timed out".to_string()));
        }
        Ok(ImpactAnalysisOutput {
            impact_analysis: format!("Affected: {}", input.existing_test_cases),
        })
    }
}

fn test_case(id: &str, title: &str) -> TestCase {
    TestCase {
        test_case_id: id.to_string(),
        title: title.to_string(),
        steps: vec!["Open the login page".to_string()],
        expected_result: "Outcome shown".to_string(),
        compliance_tags: vec!["HIPAA".to_string()],
        priority: Priority::Medium,
        confidence_level: "High".to_string(),
    }
}

fn parsed(req_id: &str, title: &str) -> ParsedScenario {
    ParsedScenario {
        req_id: req_id.to_string(),
        title: title.to_string(),
        description: format!("{} description", title),
        requirement_type: RequirementType::Functional,
        requirement_source: "Uploaded Document".to_string(),
        priority: Priority::Medium,
    }
}

fn draft(title: &str, description: &str) -> ScenarioDraft {
    ScenarioDraft {
        req_id: None,
        title: title.to_string(),
        description: description.to_string(),
        priority: Priority::High,
        requirement_type: RequirementType::Functional,
        requirement_source: "Manual".to_string(),
    }
}

/// A manager holding one scenario `REQ-001` that already has test cases
async fn manager_with_tests(flows: FakeFlows) -> (ScenarioManager, Arc<FakeFlows>) {
    let flows = Arc::new(flows);
    let manager = ScenarioManager::new(flows.clone());
    let mut initial = draft("Login", "Users log in with email and password");
    initial.req_id = Some("REQ-001".to_string());
    manager.create(initial).await.unwrap();
    manager.generate_tests("REQ-001").await.unwrap();
    (manager, flows)
}

#[tokio::test]
async fn test_single_parsed_scenario_end_to_end() {
    let flows = Arc::new(FakeFlows {
        parsed: vec![parsed("REQ-001", "Login")],
        ..Default::default()
    });
    let manager = ScenarioManager::new(flows);

    let outcome = manager
        .parse_from_document("The system must allow users to log in with email and password")
        .await
        .unwrap();

    assert!(outcome.fallback_reason.is_none());
    assert_eq!(outcome.scenarios.len(), 1);
    let scenario = &outcome.scenarios[0];
    assert_eq!(scenario.id, "REQ-001");
    assert_eq!(scenario.priority, Priority::Medium);
    assert!(scenario.test_cases.is_empty());
    assert!(!scenario.are_tests_generating);
    assert_eq!(manager.list().await, outcome.scenarios);
}

#[tokio::test]
async fn test_parse_failure_or_empty_result_yields_fallback() {
    let failing = ScenarioManager::new(Arc::new(FakeFlows {
        fail_parse: true,
        ..Default::default()
    }));
    let outcome = failing.parse_from_document("Raw requirement text").await.unwrap();
    assert_eq!(outcome.scenarios.len(), 1);
    assert_eq!(outcome.scenarios[0].title, FALLBACK_SCENARIO_TITLE);
    assert_eq!(outcome.scenarios[0].description, "Raw requirement text");
    assert!(outcome.fallback_reason.unwrap().contains("not JSON"));

    let empty = ScenarioManager::new(Arc::new(FakeFlows::default()));
    let outcome = empty.parse_from_document("Raw requirement text").await.unwrap();
    assert_eq!(outcome.scenarios.len(), 1);
    assert_eq!(outcome.scenarios[0].priority, Priority::Medium);
    assert_eq!(outcome.scenarios[0].requirement_type, RequirementType::Functional);

    assert!(matches!(
        empty.parse_from_document("  ").await,
        Err(ScenarioError::Validation(_))
    ));
}

#[tokio::test]
async fn test_duplicate_req_ids_get_unique_ids() {
    let manager = ScenarioManager::new(Arc::new(FakeFlows {
        parsed: vec![parsed("REQ-001", "Login"), parsed("REQ-001", "Logout")],
        ..Default::default()
    }));

    let outcome = manager.parse_from_document("doc").await.unwrap();
    assert_eq!(outcome.scenarios[0].id, "REQ-001");
    assert_eq!(outcome.scenarios[1].id, "REQ-001-2");
    assert_eq!(outcome.scenarios[1].req_id, "REQ-001");
    assert_eq!(manager.get("REQ-001-2").await.unwrap().title, "Logout");
}

#[tokio::test]
async fn test_create_validates_and_assigns_ids() {
    let manager = ScenarioManager::new(Arc::new(FakeFlows::default()));

    let generated = manager.create(draft("Audit", "Log every PHI access")).await.unwrap();
    assert!(generated.id.starts_with("SCN-"));
    assert_eq!(generated.req_id, generated.id);

    let mut explicit = draft("Export", "Export records as PDF");
    explicit.req_id = Some("REQ-010".to_string());
    assert_eq!(manager.create(explicit.clone()).await.unwrap().id, "REQ-010");
    assert!(matches!(
        manager.create(explicit).await,
        Err(ScenarioError::DuplicateId(_))
    ));

    assert!(matches!(
        manager.create(draft("", "desc")).await,
        Err(ScenarioError::Validation(_))
    ));
    let mut no_source = draft("T", "D");
    no_source.requirement_source = " ".to_string();
    assert!(manager.create(no_source).await.is_err());
}

#[tokio::test]
async fn test_edit_without_test_cases_applies_immediately() {
    let flows = Arc::new(FakeFlows::default());
    let manager = ScenarioManager::new(flows.clone());
    let created = manager.create(draft("Login", "Email login")).await.unwrap();

    let outcome = manager
        .edit(&created.id, draft("Login with MFA", "Email login plus OTP"))
        .await
        .unwrap();

    match outcome {
        EditOutcome::Applied { scenario } => {
            assert_eq!(scenario.title, "Login with MFA");
            assert_eq!(scenario.id, created.id);
        }
        other => panic!("expected immediate apply, got {:?}", other),
    }
    assert_eq!(flows.impact_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_priority_only_edit_keeps_test_cases() {
    let (manager, flows) = manager_with_tests(FakeFlows::default()).await;

    let mut unchanged = draft("Login", "Users log in with email and password");
    unchanged.priority = Priority::Low;
    let outcome = manager.edit("REQ-001", unchanged).await.unwrap();

    assert!(
        matches!(outcome, EditOutcome::Applied { ref scenario } if scenario.test_cases.len() == 2)
    );
    assert_eq!(manager.get("REQ-001").await.unwrap().priority, Priority::Low);
    assert_eq!(flows.impact_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_confirmed_edit_clears_test_cases() {
    let (manager, flows) = manager_with_tests(FakeFlows::default()).await;

    let outcome = manager
        .edit("REQ-001", draft("Login with MFA", "Users log in with email and password"))
        .await
        .unwrap();
    let EditOutcome::PendingConfirmation { edit } = outcome else {
        panic!("expected a pending edit");
    };
    assert!(edit.analysis.contains("ID: TC-001, Title: Valid login"));
    assert_eq!(
        *flows.last_changes.lock().unwrap(),
        "Title changed from \"Login\" to \"Login with MFA\"."
    );

    // Nothing changes until confirmation
    assert_eq!(manager.get("REQ-001").await.unwrap().title, "Login");

    let scenario = manager.confirm_edit(&edit.edit_id).await.unwrap();
    assert_eq!(scenario.title, "Login with MFA");
    assert!(scenario.test_cases.is_empty());
    assert!(matches!(
        manager.confirm_edit(&edit.edit_id).await,
        Err(ScenarioError::EditNotFound(_))
    ));
}

#[tokio::test]
async fn test_confirmed_edit_cancels_running_generation() {
    let (manager, _flows) = manager_with_tests(FakeFlows {
        generation_delay_ms: 150,
        ..Default::default()
    })
    .await;

    let regenerating = manager.clone();
    let generation =
        tokio::spawn(async move { regenerating.generate_tests("REQ-001").await });
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(manager.get("REQ-001").await.unwrap().are_tests_generating);

    let outcome = manager
        .edit("REQ-001", draft("Login", "Users log in with a passkey"))
        .await
        .unwrap();
    let EditOutcome::PendingConfirmation { edit } = outcome else {
        panic!("expected a pending edit");
    };
    let confirmed = manager.confirm_edit(&edit.edit_id).await.unwrap();
    assert!(confirmed.test_cases.is_empty());
    assert!(!confirmed.are_tests_generating);

    let outcome = generation.await.unwrap().unwrap();
    assert_eq!(outcome, GenerationOutcome::Cancelled);

    let scenario = manager.get("REQ-001").await.unwrap();
    assert_eq!(scenario.description, "Users log in with a passkey");
    assert!(scenario.test_cases.is_empty());
    assert!(!scenario.are_tests_generating);
}

#[tokio::test]
async fn test_forced_edit_cancels_running_generation() {
    let (manager, _flows) = manager_with_tests(FakeFlows {
        generation_delay_ms: 150,
        ..Default::default()
    })
    .await;

    let regenerating = manager.clone();
    let generation =
        tokio::spawn(async move { regenerating.generate_tests("REQ-001").await });
    tokio::time::sleep(Duration::from_millis(30)).await;

    let forced = manager
        .force_edit("REQ-001", draft("Login", "Users log in with SSO"))
        .await
        .unwrap();
    assert!(!forced.are_tests_generating);

    assert_eq!(
        generation.await.unwrap().unwrap(),
        GenerationOutcome::Cancelled
    );
    assert!(manager.get("REQ-001").await.unwrap().test_cases.is_empty());
}

#[tokio::test]
async fn test_reparse_during_impact_analysis_discards_stale_edit() {
    let (manager, _flows) = manager_with_tests(FakeFlows {
        parsed: vec![parsed("REQ-001", "Fresh v2")],
        fail_impact: true,
        impact_delay_ms: 150,
        ..Default::default()
    })
    .await;

    let editing = manager.clone();
    let edit =
        tokio::spawn(async move { editing.edit("REQ-001", draft("Edited v1", "edited")).await });
    tokio::time::sleep(Duration::from_millis(30)).await;

    manager.parse_from_document("New requirements").await.unwrap();
    assert_eq!(manager.get("REQ-001").await.unwrap().title, "Fresh v2");

    assert!(matches!(
        edit.await.unwrap(),
        Err(ScenarioError::EditDiscarded(id)) if id == "REQ-001"
    ));

    let scenario = manager.get("REQ-001").await.unwrap();
    assert_eq!(scenario.title, "Fresh v2");
    assert_eq!(scenario.description, "Fresh v2 description");

    // The fresh scenario is free to be edited again
    let outcome = manager
        .edit("REQ-001", draft("Fresh v3", "Fresh v2 description"))
        .await
        .unwrap();
    assert!(matches!(outcome, EditOutcome::Applied { .. }));
}

#[tokio::test]
async fn test_cancelled_edit_leaves_scenario_untouched() {
    let (manager, _flows) = manager_with_tests(FakeFlows::default()).await;
    let before = manager.get("REQ-001").await.unwrap();

    let outcome = manager
        .edit("REQ-001", draft("Login", "Users log in with a passkey"))
        .await
        .unwrap();
    let EditOutcome::PendingConfirmation { edit } = outcome else {
        panic!("expected a pending edit");
    };

    manager.cancel_edit(&edit.edit_id).await.unwrap();
    assert_eq!(manager.get("REQ-001").await.unwrap(), before);
}

#[tokio::test]
async fn test_impact_failure_fail_open_applies_and_keeps_tests() {
    let (manager, _flows) = manager_with_tests(FakeFlows {
        fail_impact: true,
        ..Default::default()
    })
    .await;

    let outcome = manager
        .edit("REQ-001", draft("SSO login", "Users log in with SSO"))
        .await
        .unwrap();

    match outcome {
        EditOutcome::AppliedWithoutAnalysis {
            scenario,
            analysis_error,
        } => {
            assert_eq!(scenario.title, "SSO login");
            assert_eq!(scenario.test_cases.len(), 2);
            assert!(analysis_error.contains("timed out"));
        }
        other => panic!("expected fail-open apply, got {:?}", other),
    }
}

#[tokio::test]
async fn test_impact_failure_fail_closed_requires_force() {
    let (manager, _flows) = manager_with_tests(FakeFlows {
        fail_impact: true,
        ..Default::default()
    })
    .await;
    let manager = manager.with_impact_policy(ImpactFailurePolicy::FailClosed);

    let result = manager
        .edit("REQ-001", draft("SSO login", "Users log in with SSO"))
        .await;
    assert!(matches!(result, Err(ScenarioError::EditBlocked { .. })));
    assert_eq!(manager.get("REQ-001").await.unwrap().title, "Login");

    let forced = manager
        .force_edit("REQ-001", draft("SSO login", "Users log in with SSO"))
        .await
        .unwrap();
    assert_eq!(forced.title, "SSO login");
    assert!(forced.test_cases.is_empty());
}

#[tokio::test]
async fn test_delete_removes_exactly_one() {
    let manager = ScenarioManager::new(Arc::new(FakeFlows {
        parsed: vec![
            parsed("REQ-001", "Login"),
            parsed("REQ-002", "Logout"),
            parsed("REQ-003", "Audit"),
        ],
        ..Default::default()
    }));
    manager.parse_from_document("doc").await.unwrap();

    let removed = manager.delete("REQ-002").await.unwrap();
    assert_eq!(removed.title, "Logout");

    let ids: Vec<String> = manager.list().await.into_iter().map(|s| s.id).collect();
    assert_eq!(ids, vec!["REQ-001".to_string(), "REQ-003".to_string()]);
    assert!(matches!(
        manager.delete("REQ-002").await,
        Err(ScenarioError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_generation_guard_and_success() {
    let flows = Arc::new(FakeFlows {
        generation_delay_ms: 200,
        ..Default::default()
    });
    let manager =
        ScenarioManager::new(flows.clone()).with_test_standards(vec!["HIPAA".to_string()]);
    let created = manager.create(draft("Login", "Email login")).await.unwrap();

    let first = {
        let manager = manager.clone();
        let id = created.id.clone();
        tokio::spawn(async move { manager.generate_tests(&id).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(manager.get(&created.id).await.unwrap().are_tests_generating);
    assert_eq!(
        manager.generate_tests(&created.id).await.unwrap(),
        GenerationOutcome::AlreadyInProgress
    );

    let GenerationOutcome::Completed { scenario } = first.await.unwrap().unwrap() else {
        panic!("expected generation to complete");
    };
    assert_eq!(scenario.test_cases.len(), 2);
    assert!(!scenario.are_tests_generating);

    let input = flows.last_generation.lock().unwrap().clone().unwrap();
    assert_eq!(input.scenario, "Email login");
    assert_eq!(input.compliance_standards, vec!["HIPAA".to_string()]);
    assert_eq!(input.priority, Priority::High);
}

#[tokio::test]
async fn test_generation_failure_preserves_test_cases() {
    let (manager, flows) = manager_with_tests(FakeFlows::default()).await;
    flows.fail_generation.store(true, Ordering::SeqCst);

    let result = manager.generate_tests("REQ-001").await;
    assert!(matches!(result, Err(ScenarioError::Flow(FlowError::Service(_)))));

    let scenario = manager.get("REQ-001").await.unwrap();
    assert!(!scenario.are_tests_generating);
    assert_eq!(scenario.test_cases.len(), 2);
}

#[tokio::test]
async fn test_cancel_generation() {
    let manager = ScenarioManager::new(Arc::new(FakeFlows {
        generation_delay_ms: 500,
        ..Default::default()
    }));
    let created = manager.create(draft("Login", "Email login")).await.unwrap();

    let pending = {
        let manager = manager.clone();
        let id = created.id.clone();
        tokio::spawn(async move { manager.generate_tests(&id).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(manager.cancel_generation(&created.id).await.unwrap());
    assert_eq!(pending.await.unwrap().unwrap(), GenerationOutcome::Cancelled);

    let scenario = manager.get(&created.id).await.unwrap();
    assert!(!scenario.are_tests_generating);
    assert!(scenario.test_cases.is_empty());
    assert!(!manager.cancel_generation(&created.id).await.unwrap());
}

#[tokio::test]
async fn test_results_for_deleted_scenario_are_discarded() {
    let manager = ScenarioManager::new(Arc::new(FakeFlows {
        generation_delay_ms: 300,
        ..Default::default()
    }));
    let created = manager.create(draft("Login", "Email login")).await.unwrap();

    let pending = {
        let manager = manager.clone();
        let id = created.id.clone();
        tokio::spawn(async move { manager.generate_tests(&id).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    manager.delete(&created.id).await.unwrap();

    assert_eq!(pending.await.unwrap().unwrap(), GenerationOutcome::Discarded);
    assert!(manager.list().await.is_empty());
}

#[tokio::test]
async fn test_parse_from_stored_analysis_consumes_handoff() {
    let pool = reqflow_storage::memory_pool().await.unwrap();
    let handoffs = HandoffStorage::new(pool);
    let handoff = AnalysisHandoff {
        validation: ValidationResult {
            completeness_validation: CompletenessValidation {
                is_valid: true,
                missing_elements: vec![],
            },
        },
        compliance: ComplianceResult {
            compliance_report: "Compliant".to_string(),
            suggestions: "None".to_string(),
        },
        requirements: "Users log in".to_string(),
    };
    handoffs.store(&handoff).await.unwrap();

    let manager = ScenarioManager::new(Arc::new(FakeFlows {
        parsed: vec![parsed("REQ-001", "Login")],
        ..Default::default()
    }))
    .with_handoffs(handoffs.clone());

    assert_eq!(manager.current_analysis().await.unwrap(), Some(handoff.clone()));

    let outcome = manager.parse_from_analysis().await.unwrap();
    assert_eq!(outcome.scenarios[0].id, "REQ-001");
    assert_eq!(handoffs.get().await.unwrap(), None);
    assert_eq!(manager.current_analysis().await.unwrap(), Some(handoff));

    assert!(matches!(
        manager.parse_from_analysis().await,
        Err(ScenarioError::NoAnalysis)
    ));
}

#[tokio::test]
async fn test_summary_reflects_generated_tests() {
    let (manager, _flows) = manager_with_tests(FakeFlows::default()).await;
    manager.create(draft("Audit", "Log PHI access")).await.unwrap();

    let summary = manager.summary().await;
    assert_eq!(summary.total_scenarios, 2);
    assert_eq!(summary.total_test_cases, 2);
    assert_eq!(summary.scenarios_with_tests, 1);
    assert_eq!(summary.scenarios_without_tests, 1);
    assert_eq!(summary.compliance_tags[0].tag, "HIPAA");
    assert_eq!(summary.compliance_tags[0].count, 2);
}
