// ABOUTME: Scenario edit workflow values: change descriptions, pending edits, and edit outcomes
// ABOUTME: Decides when an edit needs an impact analysis before it may be applied

use chrono::{DateTime, Utc};
use reqflow_core::{generate_edit_id, Scenario, ScenarioDraft};
use serde::Serialize;

/// An edit held back until the user has seen its impact on existing test cases
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEdit {
    pub edit_id: String,
    pub scenario_id: String,
    pub draft: ScenarioDraft,
    /// Impact narrative returned by the model
    pub analysis: String,
    pub created_at: DateTime<Utc>,
}

impl PendingEdit {
    pub fn new(scenario_id: &str, draft: ScenarioDraft, analysis: String) -> Self {
        Self {
            edit_id: generate_edit_id(),
            scenario_id: scenario_id.to_string(),
            draft,
            analysis,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum EditOutcome {
    /// Applied right away; existing test cases kept
    Applied { scenario: Scenario },
    /// Waiting for `confirm_edit` or `cancel_edit`
    PendingConfirmation { edit: PendingEdit },
    /// Impact analysis failed and the edit went through anyway
    #[serde(rename_all = "camelCase")]
    AppliedWithoutAnalysis {
        scenario: Scenario,
        analysis_error: String,
    },
}

/// Describe title/description changes, or `None` when neither changed
pub fn describe_changes(current: &Scenario, draft: &ScenarioDraft) -> Option<String> {
    let mut changes = Vec::new();
    if current.title != draft.title {
        changes.push(format!(
            "Title changed from \"{}\" to \"{}\".",
            current.title, draft.title
        ));
    }
    if current.description != draft.description {
        changes.push("Description updated.".to_string());
    }

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(" "))
    }
}
