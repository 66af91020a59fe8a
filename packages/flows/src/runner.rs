// ABOUTME: The PromptFlows contract and its production implementation over the AI service
// ABOUTME: Validates input, renders the flow's template, calls the model, and decodes the reply strictly

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqflow_ai::{parse_structured, AIService, AiUsageLog, AiUsageLogStorage, Usage};
use reqflow_core::validation::require_non_blank;
use reqflow_core::{ComplianceResult, ProjectDetails, ValidationResult};
use reqflow_prompts::PromptManager;
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::actions::standards_to_text;
use crate::error::{FlowError, FlowResult};
use crate::types::{
    ComplianceCheckInput, GenerateTestCasesInput, GenerateTestCasesOutput, ImpactAnalysisInput,
    ImpactAnalysisOutput, ParseScenariosOutput,
};

/// System prompt shared by every flow
pub const SYSTEM_PROMPT_ID: &str = "healthcare_qa";

/// The six prompt flows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    ValidateRequirements,
    ComplianceCheck,
    ParseProjectDetails,
    ParseScenarios,
    GenerateTestCases,
    AnalyzeImpactOnChange,
}

impl Flow {
    pub fn prompt_id(&self) -> &'static str {
        match self {
            Flow::ValidateRequirements => "validate_requirements",
            Flow::ComplianceCheck => "compliance_check",
            Flow::ParseProjectDetails => "parse_project_details",
            Flow::ParseScenarios => "parse_scenarios",
            Flow::GenerateTestCases => "generate_test_cases",
            Flow::AnalyzeImpactOnChange => "analyze_impact",
        }
    }

    /// Operation name recorded in usage logs
    pub fn operation(&self) -> &'static str {
        match self {
            Flow::ValidateRequirements => "validate_requirements",
            Flow::ComplianceCheck => "compliance_check",
            Flow::ParseProjectDetails => "parse_project_details",
            Flow::ParseScenarios => "parse_scenarios",
            Flow::GenerateTestCases => "generate_test_cases",
            Flow::AnalyzeImpactOnChange => "analyze_impact_on_change",
        }
    }
}

/// Structured calls to the generative model, one method per flow.
///
/// Every method either returns a fully decoded value or fails with
/// [`FlowError`]; there are no retries.
#[async_trait]
pub trait PromptFlows: Send + Sync {
    async fn validate_requirements(&self, requirements: &str) -> FlowResult<ValidationResult>;

    async fn compliance_check(&self, input: &ComplianceCheckInput)
        -> FlowResult<ComplianceResult>;

    async fn parse_project_details(&self, requirements: &str) -> FlowResult<ProjectDetails>;

    async fn parse_scenarios(&self, requirements: &str) -> FlowResult<ParseScenariosOutput>;

    async fn generate_test_cases(
        &self,
        input: &GenerateTestCasesInput,
    ) -> FlowResult<GenerateTestCasesOutput>;

    async fn analyze_impact_on_change(
        &self,
        input: &ImpactAnalysisInput,
    ) -> FlowResult<ImpactAnalysisOutput>;
}

/// Production flows: prompt templates rendered through [`PromptManager`] and
/// sent through [`AIService`]
#[derive(Clone)]
pub struct FlowRunner {
    ai: AIService,
    prompts: Arc<PromptManager>,
    usage_logs: Option<AiUsageLogStorage>,
}

impl FlowRunner {
    pub fn new(ai: AIService, prompts: Arc<PromptManager>) -> Self {
        Self {
            ai,
            prompts,
            usage_logs: None,
        }
    }

    /// Record one usage log row per model call
    pub fn with_usage_logs(mut self, usage_logs: AiUsageLogStorage) -> Self {
        self.usage_logs = Some(usage_logs);
        self
    }

    async fn run<T: DeserializeOwned>(
        &self,
        flow: Flow,
        parameters: &[(&str, &str)],
    ) -> FlowResult<T> {
        let prompt = self.prompts.get_prompt(flow.prompt_id(), parameters)?;
        let system_prompt = self.prompts.get_system_prompt(SYSTEM_PROMPT_ID)?;

        info!("Running flow {} with model {}", flow.operation(), self.ai.model());
        let started = Instant::now();
        let reply = self.ai.generate_text(prompt, Some(system_prompt)).await;
        let duration_ms = started.elapsed().as_millis() as i64;

        let (result, usage) = match reply {
            Ok(response) => (
                parse_structured::<T>(&response.data).map_err(FlowError::from),
                Some(response.usage),
            ),
            Err(e) => (Err(FlowError::from(e)), None),
        };

        if let Err(e) = &result {
            error!("Flow {} failed after {}ms: {}", flow.operation(), duration_ms, e);
        }
        self.record_usage(flow, usage, duration_ms, result.as_ref().err())
            .await;

        result
    }

    async fn record_usage(
        &self,
        flow: Flow,
        usage: Option<Usage>,
        duration_ms: i64,
        failure: Option<&FlowError>,
    ) {
        let Some(storage) = &self.usage_logs else {
            return;
        };

        let log = AiUsageLog::new(
            flow.operation(),
            &self.ai.model(),
            self.ai.provider(),
            usage,
            duration_ms,
            failure.map(|e| e.to_string()),
        );

        // Usage accounting never fails the flow itself
        if let Err(e) = storage.create_log(&log).await {
            warn!("Failed to log AI usage for {}: {}", flow.operation(), e);
        }
    }
}

#[async_trait]
impl PromptFlows for FlowRunner {
    async fn validate_requirements(&self, requirements: &str) -> FlowResult<ValidationResult> {
        require_non_blank("requirements", requirements)?;
        self.run(
            Flow::ValidateRequirements,
            &[("requirements", requirements)],
        )
        .await
    }

    async fn compliance_check(
        &self,
        input: &ComplianceCheckInput,
    ) -> FlowResult<ComplianceResult> {
        input.validate()?;
        self.run(
            Flow::ComplianceCheck,
            &[
                ("requirements", input.requirements.as_str()),
                ("complianceStandards", input.compliance_standards.as_str()),
            ],
        )
        .await
    }

    async fn parse_project_details(&self, requirements: &str) -> FlowResult<ProjectDetails> {
        require_non_blank("requirements", requirements)?;
        self.run(Flow::ParseProjectDetails, &[("requirements", requirements)])
            .await
    }

    async fn parse_scenarios(&self, requirements: &str) -> FlowResult<ParseScenariosOutput> {
        require_non_blank("requirements", requirements)?;
        let output: ParseScenariosOutput = self
            .run(Flow::ParseScenarios, &[("requirements", requirements)])
            .await?;
        output.check()?;
        Ok(output)
    }

    async fn generate_test_cases(
        &self,
        input: &GenerateTestCasesInput,
    ) -> FlowResult<GenerateTestCasesOutput> {
        input.validate()?;
        let standards = standards_to_text(&input.compliance_standards);
        let output: GenerateTestCasesOutput = self
            .run(
                Flow::GenerateTestCases,
                &[
                    ("scenario", input.scenario.as_str()),
                    ("complianceStandards", standards.as_str()),
                    ("priority", input.priority.as_str()),
                ],
            )
            .await?;
        output.check()?;
        Ok(output)
    }

    async fn analyze_impact_on_change(
        &self,
        input: &ImpactAnalysisInput,
    ) -> FlowResult<ImpactAnalysisOutput> {
        input.validate()?;
        let output: ImpactAnalysisOutput = self
            .run(
                Flow::AnalyzeImpactOnChange,
                &[
                    ("requirementChanges", input.requirement_changes.as_str()),
                    ("existingTestCases", input.existing_test_cases.as_str()),
                ],
            )
            .await?;
        output.check()?;
        Ok(output)
    }
}
