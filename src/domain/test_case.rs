use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Polarity of a test case. Anything the model emits that is not
/// recognisably "negative" is treated as positive.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TestType {
    Positive,
    Negative,
}

impl TestType {
    pub fn normalize(value: Option<&str>) -> Self {
        match value {
            Some(raw) if raw.trim().eq_ignore_ascii_case("negative") => TestType::Negative,
            _ => TestType::Positive,
        }
    }
}

impl Default for TestType {
    fn default() -> Self {
        TestType::Positive
    }
}

/// Test data as the model supplies it: either a list of values, a
/// field-name-to-value map, or a single free-form string.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum TestData {
    Values(Vec<String>),
    Fields(BTreeMap<String, String>),
    Text(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TestCase {
    pub id: String,
    pub scenario: String,
    #[serde(rename = "type")]
    pub case_type: TestType,
    pub priority: Option<String>,
    pub severity: Option<String>,
    pub summary: String,
    pub pre_condition: Option<String>,
    pub test_steps: Vec<String>,
    pub test_data: Option<TestData>,
    pub expected_result: Option<String>,
}

/// A derived view grouping test cases under a named scenario. Never stored
/// independently of its source cases; rebuildable from a flat collection.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScenarioGroup {
    pub scenario_title: String,
    pub positive_test_cases: Vec<TestCase>,
    pub negative_test_cases: Vec<TestCase>,
}

impl ScenarioGroup {
    pub fn case_count(&self) -> usize {
        self.positive_test_cases.len() + self.negative_test_cases.len()
    }
}

/// Flattens scenario groups back into the flat collection they were
/// derived from, preserving group order then per-group polarity order.
pub fn flatten_groups(groups: &[ScenarioGroup]) -> Vec<TestCase> {
    let mut cases = Vec::new();
    for group in groups {
        cases.extend(group.positive_test_cases.iter().cloned());
        cases.extend(group.negative_test_cases.iter().cloned());
    }
    cases
}
