// ABOUTME: Shared application state handed to every handler
// ABOUTME: Wires storage, prompt flows, the intake service, and the scenario manager from configuration

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqflow_ai::{AIService, AiUsageLogStorage};
use reqflow_config::Config;
use reqflow_flows::{FlowRunner, PromptFlows};
use reqflow_intake::IntakeService;
use reqflow_prompts::PromptManager;
use reqflow_scenarios::ScenarioManager;
use reqflow_storage::{HandoffStorage, ProjectDetailsStorage};
use sqlx::SqlitePool;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub intake: IntakeService,
    pub scenarios: ScenarioManager,
    pub project_details: ProjectDetailsStorage,
    pub usage_logs: AiUsageLogStorage,
    pub model: String,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Assemble the state around any set of prompt flows
    pub fn new(
        flows: Arc<dyn PromptFlows>,
        pool: SqlitePool,
        config: &Config,
        model: String,
    ) -> Self {
        let handoffs = HandoffStorage::new(pool.clone());
        let project_details = ProjectDetailsStorage::new(pool.clone());

        let intake = IntakeService::new(flows.clone())
            .with_storage(handoffs.clone(), project_details.clone())
            .with_compliance_standards(config.compliance_standards.clone());

        let scenarios = ScenarioManager::new(flows)
            .with_handoffs(handoffs)
            .with_test_standards(config.test_standards.clone())
            .with_impact_policy(config.impact_failure_policy);

        Self {
            intake,
            scenarios,
            project_details,
            usage_logs: AiUsageLogStorage::new(pool),
            model,
            started_at: Utc::now(),
        }
    }

    /// Production wiring: SQLite database, prompt templates, and the Anthropic model
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let pool = reqflow_storage::connect(&config.database_url).await?;
        let prompts = Arc::new(PromptManager::new(config.prompts_dir.as_deref())?);
        let ai = AIService::anthropic(
            config.anthropic_api_key.clone(),
            &config.anthropic_model,
            &config.anthropic_api_url,
            config.request_timeout_secs,
        )?;
        let model = ai.model();

        let flows =
            FlowRunner::new(ai, prompts).with_usage_logs(AiUsageLogStorage::new(pool.clone()));
        info!("Application state ready (model: {})", model);

        Ok(Self::new(Arc::new(flows), pool, config, model))
    }
}
