// ABOUTME: Prompt flows for healthcare requirements analysis
// ABOUTME: Six structured model calls plus the action layer that adapts them for intake and scenarios

pub mod actions;
pub mod error;
pub mod runner;
pub mod types;

pub use error::{FlowError, FlowResult};
pub use runner::{Flow, FlowRunner, PromptFlows, SYSTEM_PROMPT_ID};
pub use types::{
    ComplianceCheckInput, GenerateTestCasesInput, GenerateTestCasesOutput, ImpactAnalysisInput,
    ImpactAnalysisOutput, ParseScenariosOutput, ParsedScenario,
};
