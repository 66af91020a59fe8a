// ABOUTME: One-shot offline analysis behind `reqflow analyze`
// ABOUTME: Feeds files and text through intake, analysis, and optionally scenarios and test generation

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use reqflow_api::AppState;
use reqflow_core::{AnalysisHandoff, ProjectDetails, Scenario};
use reqflow_intake::FileState;
use reqflow_scenarios::GenerationOutcome;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub files: Vec<PathBuf>,
    pub text: Option<String>,
    /// Split the analyzed document into scenarios
    pub scenarios: bool,
    /// Generate test cases for every scenario; implies `scenarios`
    pub tests: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationFailure {
    pub scenario_id: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeReport {
    pub project_details: ProjectDetails,
    pub analysis: AnalysisHandoff,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<Vec<Scenario>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub generation_failures: Vec<GenerationFailure>,
}

pub async fn analyze_files(
    state: &AppState,
    options: AnalyzeOptions,
) -> anyhow::Result<AnalyzeReport> {
    for path in &options.files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        state.intake.enqueue_file(&file_name(path), None, bytes).await?;
    }
    state.intake.read_queued_files().await;

    if let Some(text) = options.text {
        state.intake.set_manual_text(text).await;
    }

    let snapshot = state.intake.snapshot().await;
    let failed: Vec<String> = snapshot
        .files
        .iter()
        .filter(|f| f.state == FileState::Failed)
        .map(|f| format!("{} ({})", f.name, f.error.as_deref().unwrap_or("unreadable")))
        .collect();
    if !failed.is_empty() {
        bail!("Could not read: {}", failed.join(", "));
    }

    let project_details = state.intake.prepare_project_details().await?;
    info!("Analyzing requirements for {}", project_details.app_name);
    let analysis = state.intake.analyze(Some(project_details.clone())).await?;

    let mut report = AnalyzeReport {
        project_details,
        analysis,
        scenarios: None,
        fallback_reason: None,
        generation_failures: Vec::new(),
    };

    if !(options.scenarios || options.tests) {
        return Ok(report);
    }

    let parsed = state.scenarios.parse_from_analysis().await?;
    report.fallback_reason = parsed.fallback_reason;

    if options.tests {
        for scenario in &parsed.scenarios {
            match state.scenarios.generate_tests(&scenario.id).await {
                Ok(GenerationOutcome::Completed { scenario }) => {
                    info!(
                        "Generated {} test cases for {}",
                        scenario.test_cases.len(),
                        scenario.id
                    );
                }
                Ok(other) => warn!("Test generation for {} ended early: {:?}", scenario.id, other),
                Err(e) => {
                    warn!("Test generation for {} failed: {}", scenario.id, e);
                    report.generation_failures.push(GenerationFailure {
                        scenario_id: scenario.id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    report.scenarios = Some(state.scenarios.list().await);
    Ok(report)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
