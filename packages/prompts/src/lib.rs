// ABOUTME: Centralized prompt management for the requirements flows
// ABOUTME: Loads prompt templates from JSON files (or embedded copies) and substitutes parameters

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Prompt not found: {0}")]
    NotFound(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Failed to read prompt file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse prompt JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid prompt format: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptMetadata {
    pub version: String,
    #[serde(rename = "lastModified")]
    pub last_modified: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub name: String,
    pub category: String,
    pub template: String,
    pub parameters: Vec<String>,
    #[serde(rename = "outputSchema", skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PromptMetadata>,
}

/// Prompt files compiled into the binary, used when no prompts directory is configured
const EMBEDDED_PROMPTS: &[(&str, &str)] = &[
    (
        "flows/validate_requirements.json",
        include_str!("../flows/validate_requirements.json"),
    ),
    (
        "flows/compliance_check.json",
        include_str!("../flows/compliance_check.json"),
    ),
    (
        "flows/parse_project_details.json",
        include_str!("../flows/parse_project_details.json"),
    ),
    (
        "flows/parse_scenarios.json",
        include_str!("../flows/parse_scenarios.json"),
    ),
    (
        "flows/generate_test_cases.json",
        include_str!("../flows/generate_test_cases.json"),
    ),
    (
        "flows/analyze_impact.json",
        include_str!("../flows/analyze_impact.json"),
    ),
    (
        "system/healthcare_qa.json",
        include_str!("../system/healthcare_qa.json"),
    ),
];

const CATEGORIES: &[&str] = &["flows", "system"];

/// Read-only prompt registry keyed by prompt id.
///
/// All prompts are loaded eagerly, so lookups take `&self` and the manager can be
/// shared behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct PromptManager {
    prompts: HashMap<String, Prompt>,
}

impl PromptManager {
    /// Create a manager from a directory, or from the embedded prompts when `None`
    pub fn new(prompts_dir: Option<&Path>) -> Result<Self, PromptError> {
        match prompts_dir {
            Some(dir) => Self::from_dir(dir),
            None => Self::embedded(),
        }
    }

    /// Load the prompts compiled into the binary
    pub fn embedded() -> Result<Self, PromptError> {
        let mut prompts = HashMap::new();
        for (name, content) in EMBEDDED_PROMPTS {
            let prompt = parse_prompt(content, name)?;
            prompts.insert(prompt.id.clone(), prompt);
        }
        Ok(Self { prompts })
    }

    /// Load every `<category>/*.json` file below `prompts_dir`
    pub fn from_dir(prompts_dir: &Path) -> Result<Self, PromptError> {
        let mut prompts = HashMap::new();

        for category in CATEGORIES {
            let category_dir = prompts_dir.join(category);
            if !category_dir.exists() {
                continue;
            }

            for entry in fs::read_dir(&category_dir)? {
                let path = entry?.path();
                if path.extension().and_then(|s| s.to_str()) != Some("json") {
                    continue;
                }

                let content = fs::read_to_string(&path)?;
                let prompt = parse_prompt(&content, &path.display().to_string())?;
                debug!("Loaded prompt '{}' from {}", prompt.id, path.display());
                prompts.insert(prompt.id.clone(), prompt);
            }
        }

        Ok(Self { prompts })
    }

    /// Get a prompt by ID with parameter substitution
    pub fn get_prompt(
        &self,
        prompt_id: &str,
        parameters: &[(&str, &str)],
    ) -> Result<String, PromptError> {
        let prompt = self.get_prompt_metadata(prompt_id)?;

        // Always validate required parameters, even if empty list provided
        substitute_parameters(&prompt.template, parameters, &prompt.parameters)
    }

    /// Get a system prompt's template by id
    pub fn get_system_prompt(&self, prompt_id: &str) -> Result<String, PromptError> {
        match self.prompts.get(prompt_id) {
            Some(prompt) if prompt.category == "system" => Ok(prompt.template.clone()),
            _ => Err(PromptError::NotFound(prompt_id.to_string())),
        }
    }

    /// Get prompt metadata without substitution
    pub fn get_prompt_metadata(&self, prompt_id: &str) -> Result<&Prompt, PromptError> {
        self.prompts
            .get(prompt_id)
            .ok_or_else(|| PromptError::NotFound(prompt_id.to_string()))
    }

    /// List the prompt ids in a category, sorted
    pub fn list_prompts(&self, category: &str) -> Vec<String> {
        let mut ids: Vec<String> = self
            .prompts
            .values()
            .filter(|p| p.category == category)
            .map(|p| p.id.clone())
            .collect();
        ids.sort();
        ids
    }
}

fn parse_prompt(content: &str, source: &str) -> Result<Prompt, PromptError> {
    let prompt: Prompt = serde_json::from_str(content)?;

    // Basic validation
    if prompt.id.is_empty() || prompt.template.is_empty() || prompt.category.is_empty() {
        return Err(PromptError::InvalidFormat(format!(
            "Invalid prompt format in {}",
            source
        )));
    }

    Ok(prompt)
}

/// Substitute `{{parameter}}` placeholders in a template
fn substitute_parameters(
    template: &str,
    parameters: &[(&str, &str)],
    required_params: &[String],
) -> Result<String, PromptError> {
    let param_map: HashMap<&str, &str> = parameters.iter().copied().collect();

    for required in required_params {
        if !param_map.contains_key(required.as_str()) {
            return Err(PromptError::MissingParameter(required.clone()));
        }
    }

    let mut result = template.to_string();
    for (key, value) in parameters {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn get_test_prompts_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    }

    #[test]
    fn test_embedded_matches_directory() {
        let embedded = PromptManager::embedded().unwrap();
        let from_dir = PromptManager::from_dir(&get_test_prompts_dir()).unwrap();

        assert_eq!(embedded.list_prompts("flows"), from_dir.list_prompts("flows"));
        assert_eq!(
            embedded.list_prompts("flows"),
            vec![
                "analyze_impact",
                "compliance_check",
                "generate_test_cases",
                "parse_project_details",
                "parse_scenarios",
                "validate_requirements",
            ]
        );
    }

    #[test]
    fn test_load_system_prompt() {
        let manager = PromptManager::embedded().unwrap();
        let prompt = manager.get_system_prompt("healthcare_qa").unwrap();
        assert!(prompt.contains("healthcare"));
        assert!(prompt.contains("JSON"));

        // Flow prompts are not system prompts
        assert!(matches!(
            manager.get_system_prompt("parse_scenarios"),
            Err(PromptError::NotFound(_))
        ));
    }

    #[test]
    fn test_load_prompt_with_parameters() {
        let manager = PromptManager::embedded().unwrap();
        let prompt = manager
            .get_prompt(
                "compliance_check",
                &[
                    ("requirements", "Patients can view lab results"),
                    ("complianceStandards", "FDA, HIPAA"),
                ],
            )
            .unwrap();
        assert!(prompt.contains("Patients can view lab results"));
        assert!(prompt.contains("FDA, HIPAA"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_missing_parameter_error() {
        let manager = PromptManager::embedded().unwrap();
        let result = manager.get_prompt("compliance_check", &[("requirements", "x")]);
        assert!(matches!(
            result,
            Err(PromptError::MissingParameter(p)) if p == "complianceStandards"
        ));
    }

    #[test]
    fn test_prompt_not_found() {
        let manager = PromptManager::embedded().unwrap();
        let result = manager.get_prompt("nonexistent", &[]);
        assert!(matches!(result, Err(PromptError::NotFound(_))));
    }

    #[test]
    fn test_every_flow_declares_an_output_schema() {
        let manager = PromptManager::embedded().unwrap();
        for id in manager.list_prompts("flows") {
            let prompt = manager.get_prompt_metadata(&id).unwrap();
            assert!(prompt.output_schema.is_some(), "{} has no output schema", id);
            for param in &prompt.parameters {
                assert!(
                    prompt.template.contains(&format!("{{{{{}}}}}", param)),
                    "{} never uses {}",
                    id,
                    param
                );
            }
        }
    }

    #[test]
    fn test_from_dir_override_and_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let flows = dir.path().join("flows");
        fs::create_dir_all(&flows).unwrap();
        fs::write(
            flows.join("parse_scenarios.json"),
            r#"{"id":"parse_scenarios","name":"Custom","category":"flows","template":"Split: {{requirements}}","parameters":["requirements"]}"#,
        )
        .unwrap();
        fs::write(flows.join("notes.txt"), "ignored").unwrap();

        let manager = PromptManager::new(Some(dir.path())).unwrap();
        let prompt = manager
            .get_prompt("parse_scenarios", &[("requirements", "REQ-1")])
            .unwrap();
        assert_eq!(prompt, "Split: REQ-1");

        fs::write(
            flows.join("broken.json"),
            r#"{"id":"","name":"x","category":"flows","template":"t","parameters":[]}"#,
        )
        .unwrap();
        assert!(matches!(
            PromptManager::from_dir(dir.path()),
            Err(PromptError::InvalidFormat(_))
        ));
    }
}
