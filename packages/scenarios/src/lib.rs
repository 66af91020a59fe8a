// ABOUTME: Scenario and test case management for Reqflow
// ABOUTME: Keeps the scenario collection consistent while model calls for parsing, generation, and impact run

pub mod edits;
pub mod error;
pub mod manager;
pub mod store;
pub mod summary;

pub use edits::{describe_changes, EditOutcome, PendingEdit};
pub use error::{ScenarioError, ScenarioResult};
pub use manager::{GenerationOutcome, ParseOutcome, ScenarioManager};
pub use summary::{summarize, ScenarioSummary, TagCount};
