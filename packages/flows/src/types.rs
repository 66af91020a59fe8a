// ABOUTME: Input and output shapes for the six prompt flows
// ABOUTME: Each input validates itself before the call and each output checks the reply after decoding

use reqflow_core::validation::{require_non_blank, ValidationError};
use reqflow_core::{Priority, RequirementType, TestCase};
use serde::{Deserialize, Serialize};

use crate::error::{FlowError, FlowResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheckInput {
    pub requirements: String,
    pub compliance_standards: String,
}

impl ComplianceCheckInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("requirements", &self.requirements)?;
        require_non_blank("complianceStandards", &self.compliance_standards)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTestCasesInput {
    pub scenario: String,
    pub compliance_standards: Vec<String>,
    pub priority: Priority,
}

impl GenerateTestCasesInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("scenario", &self.scenario)?;
        if self.compliance_standards.is_empty() {
            return Err(ValidationError::Invalid {
                field: "complianceStandards",
                message: "at least one standard is required".to_string(),
            });
        }
        if self.compliance_standards.iter().any(|s| s.trim().is_empty()) {
            return Err(ValidationError::Invalid {
                field: "complianceStandards",
                message: "standards must not be blank".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysisInput {
    pub requirement_changes: String,
    /// Test cases flattened to `ID: x, Title: y` lines
    pub existing_test_cases: String,
}

impl ImpactAnalysisInput {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("requirementChanges", &self.requirement_changes)?;
        require_non_blank("existingTestCases", &self.existing_test_cases)
    }
}

/// One scenario as returned by the parse flow, before it gets an identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedScenario {
    pub req_id: String,
    pub title: String,
    pub description: String,
    pub requirement_type: RequirementType,
    pub requirement_source: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseScenariosOutput {
    pub scenarios: Vec<ParsedScenario>,
}

impl ParseScenariosOutput {
    pub fn check(&self) -> FlowResult<()> {
        for (index, scenario) in self.scenarios.iter().enumerate() {
            let blank = [
                ("reqId", &scenario.req_id),
                ("title", &scenario.title),
                ("description", &scenario.description),
            ]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());

            if let Some((field, _)) = blank {
                return Err(FlowError::ModelOutput(format!(
                    "scenario {} has a blank {}",
                    index, field
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTestCasesOutput {
    pub test_cases: Vec<TestCase>,
}

impl GenerateTestCasesOutput {
    pub fn check(&self) -> FlowResult<()> {
        for (index, test_case) in self.test_cases.iter().enumerate() {
            if test_case.test_case_id.trim().is_empty() {
                return Err(FlowError::ModelOutput(format!(
                    "test case {} has a blank testCaseId",
                    index
                )));
            }
            if test_case.title.trim().is_empty() {
                return Err(FlowError::ModelOutput(format!(
                    "test case {} has a blank title",
                    index
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysisOutput {
    pub impact_analysis: String,
}

impl ImpactAnalysisOutput {
    pub fn check(&self) -> FlowResult<()> {
        if self.impact_analysis.trim().is_empty() {
            return Err(FlowError::ModelOutput(
                "impactAnalysis is blank".to_string(),
            ));
        }
        Ok(())
    }
}
