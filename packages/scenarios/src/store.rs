// ABOUTME: In-memory scenario collection and the bookkeeping for in-flight work
// ABOUTME: Unique scenario identity, pending edits, tokened impact analyses, and abortable test generations

use std::collections::{HashMap, HashSet};

use futures::future::AbortHandle;
use reqflow_core::{
    generate_scenario_id, AnalysisHandoff, Priority, RequirementType, Scenario,
    FALLBACK_SCENARIO_SOURCE, FALLBACK_SCENARIO_TITLE,
};

use crate::edits::PendingEdit;
use crate::error::{ScenarioError, ScenarioResult};

pub(crate) struct Generation {
    pub token: u64,
    pub handle: AbortHandle,
}

#[derive(Default)]
pub struct ScenarioStore {
    scenarios: Vec<Scenario>,
    pub(crate) pending_edits: HashMap<String, PendingEdit>,
    /// Scenario id to the token of its running impact analysis
    pub(crate) impact_in_flight: HashMap<String, u64>,
    pub(crate) generations: HashMap<String, Generation>,
    pub(crate) current_analysis: Option<AnalysisHandoff>,
    next_token: u64,
}

impl ScenarioStore {
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Scenario> {
        self.scenarios.iter_mut().find(|s| s.id == id)
    }

    pub fn insert(&mut self, scenario: Scenario) -> ScenarioResult<()> {
        if self.get(&scenario.id).is_some() {
            return Err(ScenarioError::DuplicateId(scenario.id));
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    /// Replace the whole collection, abandoning work tied to the old one
    pub fn replace_all(&mut self, scenarios: Vec<Scenario>) {
        for (_, generation) in self.generations.drain() {
            generation.handle.abort();
        }
        self.pending_edits.clear();
        self.impact_in_flight.clear();
        self.scenarios = dedupe_ids(scenarios);
    }

    pub fn remove(&mut self, id: &str) -> Option<Scenario> {
        let index = self.scenarios.iter().position(|s| s.id == id)?;
        if let Some(generation) = self.generations.remove(id) {
            generation.handle.abort();
        }
        self.pending_edits.retain(|_, edit| edit.scenario_id != id);
        self.impact_in_flight.remove(id);
        Some(self.scenarios.remove(index))
    }

    fn next_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    pub(crate) fn register_generation(&mut self, id: &str, handle: AbortHandle) -> u64 {
        let token = self.next_token();
        self.generations
            .insert(id.to_string(), Generation { token, handle });
        token
    }

    /// Drop the generation entry if it is still ours; false when it was cancelled or replaced
    pub(crate) fn finish_generation(&mut self, id: &str, token: u64) -> bool {
        match self.generations.get(id) {
            Some(generation) if generation.token == token => {
                self.generations.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Abort a running generation and clear the scenario's flag. Returns whether one was running.
    pub(crate) fn abort_generation(&mut self, id: &str) -> bool {
        let Some(generation) = self.generations.remove(id) else {
            return false;
        };
        generation.handle.abort();
        if let Some(scenario) = self.get_mut(id) {
            scenario.are_tests_generating = false;
        }
        true
    }

    pub(crate) fn register_impact(&mut self, id: &str) -> u64 {
        let token = self.next_token();
        self.impact_in_flight.insert(id.to_string(), token);
        token
    }

    /// Release the impact guard if it is still ours; false when the scenario was replaced or removed
    pub(crate) fn finish_impact(&mut self, id: &str, token: u64) -> bool {
        match self.impact_in_flight.get(id) {
            Some(current) if *current == token => {
                self.impact_in_flight.remove(id);
                true
            }
            _ => false,
        }
    }
}

/// Keep ids unique: later duplicates become `<id>-2`, `<id>-3`, ...
pub fn dedupe_ids(scenarios: Vec<Scenario>) -> Vec<Scenario> {
    let mut seen: HashSet<String> = HashSet::new();
    scenarios
        .into_iter()
        .map(|mut scenario| {
            if seen.contains(&scenario.id) {
                let base = scenario.id.clone();
                let mut n = 2;
                while seen.contains(&format!("{}-{}", base, n)) {
                    n += 1;
                }
                scenario.id = format!("{}-{}", base, n);
            }
            seen.insert(scenario.id.clone());
            scenario
        })
        .collect()
}

/// The single scenario used when the document could not be split
pub fn fallback_scenario(requirements: &str) -> Scenario {
    let id = generate_scenario_id();
    Scenario {
        req_id: id.clone(),
        id,
        title: FALLBACK_SCENARIO_TITLE.to_string(),
        description: requirements.to_string(),
        requirement_type: RequirementType::Functional,
        requirement_source: FALLBACK_SCENARIO_SOURCE.to_string(),
        priority: Priority::Medium,
        test_cases: Vec::new(),
        are_tests_generating: false,
    }
}
