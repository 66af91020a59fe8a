// ABOUTME: Scenario/test-case manager shared by the API and CLI
// ABOUTME: CRUD, parse-from-document with fallback, guarded and cancellable test generation, impact-gated edits

use std::sync::Arc;

use futures::future::{AbortHandle, Abortable};
use reqflow_core::{
    generate_scenario_id, require_non_blank, AnalysisHandoff, ImpactFailurePolicy, Scenario,
    ScenarioDraft, DEFAULT_TEST_STANDARDS,
};
use reqflow_flows::actions::{run_impact_analysis, run_parse_scenarios, run_test_case_generation};
use reqflow_flows::PromptFlows;
use reqflow_storage::HandoffStorage;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::edits::{describe_changes, EditOutcome, PendingEdit};
use crate::error::{ScenarioError, ScenarioResult};
use crate::store::{fallback_scenario, ScenarioStore};
use crate::summary::{summarize, ScenarioSummary};

/// Result of parsing a requirements document into scenarios
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOutcome {
    pub scenarios: Vec<Scenario>,
    /// Why the single fallback scenario was used instead of the model's split
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum GenerationOutcome {
    Completed { scenario: Scenario },
    /// Another generation for this scenario is still running
    AlreadyInProgress,
    Cancelled,
    /// The scenario was deleted while generating
    Discarded,
}

#[derive(Clone)]
pub struct ScenarioManager {
    store: Arc<RwLock<ScenarioStore>>,
    flows: Arc<dyn PromptFlows>,
    handoffs: Option<HandoffStorage>,
    test_standards: Vec<String>,
    impact_policy: ImpactFailurePolicy,
}

impl ScenarioManager {
    pub fn new(flows: Arc<dyn PromptFlows>) -> Self {
        Self {
            store: Arc::new(RwLock::new(ScenarioStore::default())),
            flows,
            handoffs: None,
            test_standards: DEFAULT_TEST_STANDARDS.iter().map(|s| s.to_string()).collect(),
            impact_policy: ImpactFailurePolicy::default(),
        }
    }

    pub fn with_handoffs(mut self, handoffs: HandoffStorage) -> Self {
        self.handoffs = Some(handoffs);
        self
    }

    pub fn with_test_standards(mut self, standards: Vec<String>) -> Self {
        self.test_standards = standards;
        self
    }

    pub fn with_impact_policy(mut self, policy: ImpactFailurePolicy) -> Self {
        self.impact_policy = policy;
        self
    }

    pub async fn list(&self) -> Vec<Scenario> {
        self.store.read().await.scenarios().to_vec()
    }

    pub async fn get(&self, id: &str) -> ScenarioResult<Scenario> {
        self.store
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ScenarioError::NotFound(id.to_string()))
    }

    pub async fn summary(&self) -> ScenarioSummary {
        summarize(self.store.read().await.scenarios())
    }

    /// Split a document into scenarios, replacing the collection.
    ///
    /// A failed or empty split degrades to one scenario holding the raw document.
    pub async fn parse_from_document(&self, requirements: &str) -> ScenarioResult<ParseOutcome> {
        require_non_blank("requirements", requirements)?;

        let (scenarios, fallback_reason) =
            match run_parse_scenarios(self.flows.as_ref(), requirements).await {
                Ok(scenarios) if !scenarios.is_empty() => (scenarios, None),
                Ok(_) => {
                    warn!("Scenario parsing returned nothing, using fallback scenario");
                    (
                        vec![fallback_scenario(requirements)],
                        Some("no scenarios found".to_string()),
                    )
                }
                Err(e) => {
                    warn!("Scenario parsing failed, using fallback scenario: {}", e);
                    (vec![fallback_scenario(requirements)], Some(e.to_string()))
                }
            };

        let mut store = self.store.write().await;
        store.replace_all(scenarios);
        info!("Scenario collection replaced ({} scenarios)", store.scenarios().len());

        Ok(ParseOutcome {
            scenarios: store.scenarios().to_vec(),
            fallback_reason,
        })
    }

    /// Derive scenarios from the stored intake analysis and consume it
    pub async fn parse_from_analysis(&self) -> ScenarioResult<ParseOutcome> {
        let handoff = match &self.handoffs {
            Some(storage) => storage.take().await?,
            None => None,
        }
        .ok_or(ScenarioError::NoAnalysis)?;

        let outcome = self.parse_from_document(&handoff.requirements).await?;
        self.store.write().await.current_analysis = Some(handoff);
        Ok(outcome)
    }

    /// The analysis scenarios were last derived from, else the one still waiting in storage
    pub async fn current_analysis(&self) -> ScenarioResult<Option<AnalysisHandoff>> {
        if let Some(handoff) = self.store.read().await.current_analysis.clone() {
            return Ok(Some(handoff));
        }
        match &self.handoffs {
            Some(storage) => Ok(storage.get().await?),
            None => Ok(None),
        }
    }

    pub async fn create(&self, draft: ScenarioDraft) -> ScenarioResult<Scenario> {
        validate_draft(&draft)?;

        let id = draft
            .req_id
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .unwrap_or_else(generate_scenario_id);

        let scenario = Scenario {
            id: id.clone(),
            req_id: id,
            title: draft.title,
            description: draft.description,
            requirement_type: draft.requirement_type,
            requirement_source: draft.requirement_source,
            priority: draft.priority,
            test_cases: Vec::new(),
            are_tests_generating: false,
        };

        self.store.write().await.insert(scenario.clone())?;
        info!("Created scenario {}", scenario.id);
        Ok(scenario)
    }

    /// Edit a scenario, asking for an impact analysis first when test cases would be invalidated
    pub async fn edit(&self, id: &str, draft: ScenarioDraft) -> ScenarioResult<EditOutcome> {
        validate_draft(&draft)?;

        let (changes, test_cases, token) = {
            let mut store = self.store.write().await;
            if store.impact_in_flight.contains_key(id) {
                return Err(ScenarioError::ImpactAnalysisInProgress(id.to_string()));
            }
            let scenario = store
                .get_mut(id)
                .ok_or_else(|| ScenarioError::NotFound(id.to_string()))?;

            let changes = match describe_changes(scenario, &draft) {
                Some(changes) if scenario.has_test_cases() => changes,
                _ => {
                    scenario.apply_draft(&draft);
                    info!("Applied edit to scenario {}", id);
                    return Ok(EditOutcome::Applied {
                        scenario: scenario.clone(),
                    });
                }
            };
            let test_cases = scenario.test_cases.clone();
            let token = store.register_impact(id);
            (changes, test_cases, token)
        };

        info!("Analyzing impact of edit to scenario {}: {}", id, changes);
        let manager = self.clone();
        let scenario_id = id.to_string();
        let task = tokio::spawn(async move {
            let result =
                run_impact_analysis(manager.flows.as_ref(), &changes, &test_cases).await;
            manager.resolve_impact(&scenario_id, token, draft, result).await
        });

        task.await
            .map_err(|e| ScenarioError::Internal(format!("impact analysis task failed: {}", e)))?
    }

    async fn resolve_impact(
        &self,
        id: &str,
        token: u64,
        draft: ScenarioDraft,
        result: reqflow_flows::FlowResult<String>,
    ) -> ScenarioResult<EditOutcome> {
        let mut store = self.store.write().await;
        if !store.finish_impact(id, token) || store.get(id).is_none() {
            info!("Discarding impact analysis for replaced scenario {}", id);
            return Err(ScenarioError::EditDiscarded(id.to_string()));
        }

        match result {
            Ok(analysis) => {
                // A newer edit supersedes any earlier unresolved one
                store.pending_edits.retain(|_, edit| edit.scenario_id != id);
                let edit = PendingEdit::new(id, draft, analysis);
                store
                    .pending_edits
                    .insert(edit.edit_id.clone(), edit.clone());
                info!("Edit {} to scenario {} awaits confirmation", edit.edit_id, id);
                Ok(EditOutcome::PendingConfirmation { edit })
            }
            Err(e) => match self.impact_policy {
                ImpactFailurePolicy::FailOpen => {
                    warn!("Impact analysis failed for {}, applying edit anyway: {}", id, e);
                    let scenario = store
                        .get_mut(id)
                        .ok_or_else(|| ScenarioError::NotFound(id.to_string()))?;
                    scenario.apply_draft(&draft);
                    Ok(EditOutcome::AppliedWithoutAnalysis {
                        scenario: scenario.clone(),
                        analysis_error: e.to_string(),
                    })
                }
                ImpactFailurePolicy::FailClosed => {
                    error!("Impact analysis failed for {}, edit blocked: {}", id, e);
                    Err(ScenarioError::EditBlocked {
                        scenario_id: id.to_string(),
                        reason: e.to_string(),
                    })
                }
            },
        }
    }

    /// Apply a pending edit; the scenario's test cases are cleared and any running
    /// generation for the old text is cancelled
    pub async fn confirm_edit(&self, edit_id: &str) -> ScenarioResult<Scenario> {
        let mut store = self.store.write().await;
        let edit = store
            .pending_edits
            .remove(edit_id)
            .ok_or_else(|| ScenarioError::EditNotFound(edit_id.to_string()))?;
        if store.abort_generation(&edit.scenario_id) {
            info!("Cancelled test generation for edited scenario {}", edit.scenario_id);
        }
        let scenario = store
            .get_mut(&edit.scenario_id)
            .ok_or_else(|| ScenarioError::NotFound(edit.scenario_id.clone()))?;

        scenario.apply_draft(&edit.draft);
        scenario.test_cases.clear();
        info!("Confirmed edit {} to scenario {}", edit_id, scenario.id);
        Ok(scenario.clone())
    }

    pub async fn cancel_edit(&self, edit_id: &str) -> ScenarioResult<PendingEdit> {
        let edit = self
            .store
            .write()
            .await
            .pending_edits
            .remove(edit_id)
            .ok_or_else(|| ScenarioError::EditNotFound(edit_id.to_string()))?;
        info!("Cancelled edit {} to scenario {}", edit_id, edit.scenario_id);
        Ok(edit)
    }

    /// Apply an edit without impact analysis, clearing test cases
    pub async fn force_edit(&self, id: &str, draft: ScenarioDraft) -> ScenarioResult<Scenario> {
        validate_draft(&draft)?;

        let mut store = self.store.write().await;
        if store.impact_in_flight.contains_key(id) {
            return Err(ScenarioError::ImpactAnalysisInProgress(id.to_string()));
        }
        if store.get(id).is_none() {
            return Err(ScenarioError::NotFound(id.to_string()));
        }
        store.pending_edits.retain(|_, edit| edit.scenario_id != id);
        store.abort_generation(id);
        let scenario = store
            .get_mut(id)
            .ok_or_else(|| ScenarioError::NotFound(id.to_string()))?;

        scenario.apply_draft(&draft);
        scenario.test_cases.clear();
        warn!("Forced edit to scenario {}, test cases cleared", id);
        Ok(scenario.clone())
    }

    pub async fn delete(&self, id: &str) -> ScenarioResult<Scenario> {
        let removed = self
            .store
            .write()
            .await
            .remove(id)
            .ok_or_else(|| ScenarioError::NotFound(id.to_string()))?;
        info!("Deleted scenario {}", id);
        Ok(removed)
    }

    /// Generate test cases for one scenario, replacing its existing ones on success
    pub async fn generate_tests(&self, id: &str) -> ScenarioResult<GenerationOutcome> {
        let (description, priority, registration, token) = {
            let mut store = self.store.write().await;
            let scenario = store
                .get_mut(id)
                .ok_or_else(|| ScenarioError::NotFound(id.to_string()))?;
            if scenario.are_tests_generating {
                info!("Test generation already running for {}", id);
                return Ok(GenerationOutcome::AlreadyInProgress);
            }
            scenario.are_tests_generating = true;
            let description = scenario.description.clone();
            let priority = scenario.priority;

            let (handle, registration) = AbortHandle::new_pair();
            let token = store.register_generation(id, handle);
            (description, priority, registration, token)
        };

        info!("Generating test cases for scenario {}", id);
        let manager = self.clone();
        let scenario_id = id.to_string();
        let task = tokio::spawn(async move {
            let generation = run_test_case_generation(
                manager.flows.as_ref(),
                &description,
                &manager.test_standards,
                priority,
            );
            let result = Abortable::new(generation, registration).await;

            let mut store = manager.store.write().await;
            let still_ours = store.finish_generation(&scenario_id, token);
            let Some(scenario) = store.get_mut(&scenario_id) else {
                info!("Discarding test cases for deleted scenario {}", scenario_id);
                return Ok(GenerationOutcome::Discarded);
            };
            if !still_ours {
                return Ok(GenerationOutcome::Cancelled);
            }

            scenario.are_tests_generating = false;
            match result {
                Ok(Ok(test_cases)) => {
                    info!(
                        "Generated {} test cases for scenario {}",
                        test_cases.len(),
                        scenario_id
                    );
                    scenario.test_cases = test_cases;
                    Ok(GenerationOutcome::Completed {
                        scenario: scenario.clone(),
                    })
                }
                Ok(Err(e)) => {
                    error!("Test generation failed for {}: {}", scenario_id, e);
                    Err(ScenarioError::Flow(e))
                }
                Err(_aborted) => Ok(GenerationOutcome::Cancelled),
            }
        });

        task.await
            .map_err(|e| ScenarioError::Internal(format!("generation task failed: {}", e)))?
    }

    /// Abort an in-flight generation. Returns whether one was running.
    pub async fn cancel_generation(&self, id: &str) -> ScenarioResult<bool> {
        let mut store = self.store.write().await;
        if store.get(id).is_none() {
            return Err(ScenarioError::NotFound(id.to_string()));
        }
        if !store.abort_generation(id) {
            return Ok(false);
        }
        info!("Cancelled test generation for scenario {}", id);
        Ok(true)
    }
}

fn validate_draft(draft: &ScenarioDraft) -> ScenarioResult<()> {
    require_non_blank("title", &draft.title)?;
    require_non_blank("description", &draft.description)?;
    require_non_blank("requirementSource", &draft.requirement_source)?;
    Ok(())
}
