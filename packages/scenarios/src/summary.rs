// ABOUTME: Dashboard summary over the scenario collection
// ABOUTME: Counts by priority and type, test coverage, generation activity, and compliance tag frequency

use std::collections::{BTreeMap, HashMap};

use reqflow_core::Scenario;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub total_scenarios: usize,
    pub by_priority: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub total_test_cases: usize,
    pub scenarios_with_tests: usize,
    pub scenarios_without_tests: usize,
    pub scenarios_generating: usize,
    /// Most frequent first, ties by name
    pub compliance_tags: Vec<TagCount>,
}

pub fn summarize(scenarios: &[Scenario]) -> ScenarioSummary {
    let mut summary = ScenarioSummary {
        total_scenarios: scenarios.len(),
        ..Default::default()
    };
    let mut tags: HashMap<&str, usize> = HashMap::new();

    for scenario in scenarios {
        *summary
            .by_priority
            .entry(scenario.priority.to_string())
            .or_default() += 1;
        *summary
            .by_type
            .entry(scenario.requirement_type.to_string())
            .or_default() += 1;

        summary.total_test_cases += scenario.test_cases.len();
        if scenario.has_test_cases() {
            summary.scenarios_with_tests += 1;
        } else {
            summary.scenarios_without_tests += 1;
        }
        if scenario.are_tests_generating {
            summary.scenarios_generating += 1;
        }

        for tag in scenario.test_cases.iter().flat_map(|tc| &tc.compliance_tags) {
            *tags.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut compliance_tags: Vec<TagCount> = tags
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    compliance_tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    summary.compliance_tags = compliance_tags;

    summary
}
