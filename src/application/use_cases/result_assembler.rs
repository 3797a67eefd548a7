use std::collections::HashSet;

use serde_json::Value;

use crate::domain::generation::{
    AssembledResult, ParseOutcome, StructuredPayload, TestCaseDraft,
};
use crate::domain::task::TaskKind;
use crate::domain::test_case::{ScenarioGroup, TestCase, TestType};

/// Group title for flat test cases with a missing or blank scenario.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Display value substituted for analysis fields the model left out.
pub const NOT_PROVIDED: &str = "Not provided";

/// Maps a parse outcome into the persisted record shape. Raw fallbacks pass
/// through untouched; structured payloads get identifiers, normalized types
/// and scenario grouping.
pub fn assemble(outcome: ParseOutcome, task_kind: TaskKind) -> AssembledResult {
    match outcome {
        ParseOutcome::RawFallback { text, warning } => AssembledResult::RawText { text, warning },
        ParseOutcome::Structured(payload) => match payload {
            StructuredPayload::Scenarios(scenarios) => {
                let mut cases = Vec::new();
                for scenario in scenarios {
                    for draft in scenario.positive_test_cases {
                        cases.push(finalize_case(
                            draft,
                            &scenario.scenario_title,
                            TestType::Positive,
                        ));
                    }
                    for draft in scenario.negative_test_cases {
                        cases.push(finalize_case(
                            draft,
                            &scenario.scenario_title,
                            TestType::Negative,
                        ));
                    }
                }
                assign_batch_ids(&mut cases);
                AssembledResult::TestCases {
                    scenarios: group_cases(cases),
                }
            }
            StructuredPayload::FlatCases(drafts) => {
                let mut cases: Vec<TestCase> = drafts
                    .into_iter()
                    .map(|draft| finalize_case(draft, UNCATEGORIZED, TestType::Positive))
                    .collect();
                assign_batch_ids(&mut cases);
                AssembledResult::TestCases {
                    scenarios: group_cases(cases),
                }
            }
            StructuredPayload::Analysis(mut fields) => {
                for field in task_kind.expected_fields() {
                    if !fields.contains_key(*field) {
                        fields.insert(field.to_string(), Value::String(NOT_PROVIDED.to_string()));
                    }
                }
                AssembledResult::Analysis { fields }
            }
            StructuredPayload::AutomationBatch(ids) => AssembledResult::AutomationBatch {
                automated_test_case_ids: ids,
            },
        },
    }
}

/// Turns a lenient model-side draft into a strict domain test case. The id
/// stays empty here; batch-unique assignment happens in a second pass.
fn finalize_case(draft: TestCaseDraft, default_scenario: &str, default_type: TestType) -> TestCase {
    let scenario = draft
        .scenario
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default_scenario.to_string());
    let case_type = match draft.case_type.as_deref() {
        Some(raw) => TestType::normalize(Some(raw)),
        None => default_type,
    };
    TestCase {
        id: draft.id.map(id_to_string).unwrap_or_default(),
        scenario,
        case_type,
        priority: draft.priority,
        severity: draft.severity,
        summary: draft.summary.unwrap_or_default(),
        pre_condition: draft.pre_condition,
        test_steps: draft.test_steps,
        test_data: draft.test_data,
        expected_result: draft.expected_result,
    }
}

fn id_to_string(id: Value) -> String {
    match id {
        Value::String(value) => value,
        Value::Number(value) => value.to_string(),
        _ => String::new(),
    }
}

/// Assigns batch-unique identifiers: model-supplied ids are preserved when
/// present and unique; missing and duplicate ids get the next free
/// sequential number. Deterministic for a given input.
fn assign_batch_ids(cases: &mut [TestCase]) {
    let supplied: Vec<String> = cases.iter().map(|case| case.id.clone()).collect();
    let mut used: HashSet<String> = HashSet::new();
    let mut next = 1u32;

    for (index, case) in cases.iter_mut().enumerate() {
        let keep = !supplied[index].is_empty() && used.insert(supplied[index].clone());
        if keep {
            continue;
        }
        let mut candidate = next.to_string();
        while supplied.contains(&candidate) || used.contains(&candidate) {
            next += 1;
            candidate = next.to_string();
        }
        used.insert(candidate.clone());
        case.id = candidate;
        next += 1;
    }
}

/// Groups a flat collection into scenario views, keyed by each case's own
/// `scenario` field (case-sensitive exact match), preserving first-seen
/// group ordering.
pub fn group_cases(cases: Vec<TestCase>) -> Vec<ScenarioGroup> {
    let mut groups: Vec<ScenarioGroup> = Vec::new();
    for case in cases {
        let title = if case.scenario.trim().is_empty() {
            UNCATEGORIZED.to_string()
        } else {
            case.scenario.clone()
        };
        let index = match groups
            .iter()
            .position(|group| group.scenario_title == title)
        {
            Some(existing) => existing,
            None => {
                groups.push(ScenarioGroup {
                    scenario_title: title,
                    positive_test_cases: Vec::new(),
                    negative_test_cases: Vec::new(),
                });
                groups.len() - 1
            }
        };
        match case.case_type {
            TestType::Positive => groups[index].positive_test_cases.push(case),
            TestType::Negative => groups[index].negative_test_cases.push(case),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generation::ScenarioDraft;
    use crate::domain::test_case::flatten_groups;

    fn draft(id: Option<&str>, scenario: Option<&str>, case_type: Option<&str>) -> TestCaseDraft {
        TestCaseDraft {
            id: id.map(|value| Value::String(value.to_string())),
            scenario: scenario.map(str::to_string),
            case_type: case_type.map(str::to_string),
            summary: Some("case".to_string()),
            ..TestCaseDraft::default()
        }
    }

    fn scenarios_of(result: AssembledResult) -> Vec<ScenarioGroup> {
        match result {
            AssembledResult::TestCases { scenarios } => scenarios,
            other => panic!("expected test cases, got {:?}", other),
        }
    }

    #[test]
    fn test_single_positive_case_gets_id_one() {
        let outcome = ParseOutcome::Structured(StructuredPayload::Scenarios(vec![ScenarioDraft {
            scenario_title: "Login".to_string(),
            positive_test_cases: vec![TestCaseDraft {
                summary: Some("ok".to_string()),
                ..TestCaseDraft::default()
            }],
            negative_test_cases: vec![],
        }]));
        let groups = scenarios_of(assemble(outcome, TaskKind::GenerateTestCases));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].scenario_title, "Login");
        assert_eq!(groups[0].positive_test_cases.len(), 1);
        assert!(groups[0].negative_test_cases.is_empty());
        let case = &groups[0].positive_test_cases[0];
        assert_eq!(case.id, "1");
        assert_eq!(case.summary, "ok");
        assert_eq!(case.case_type, TestType::Positive);
    }

    #[test]
    fn test_supplied_unique_ids_are_preserved() {
        let outcome = ParseOutcome::Structured(StructuredPayload::FlatCases(vec![
            draft(Some("TC-9"), Some("A"), None),
            draft(None, Some("A"), None),
        ]));
        let groups = scenarios_of(assemble(outcome, TaskKind::GenerateTestCases));
        let cases = flatten_groups(&groups);
        assert_eq!(cases[0].id, "TC-9");
        assert_eq!(cases[1].id, "1");
    }

    #[test]
    fn test_duplicate_supplied_ids_are_reassigned() {
        let outcome = ParseOutcome::Structured(StructuredPayload::FlatCases(vec![
            draft(Some("1"), Some("A"), None),
            draft(Some("1"), Some("A"), None),
            draft(None, Some("A"), None),
        ]));
        let groups = scenarios_of(assemble(outcome, TaskKind::GenerateTestCases));
        let ids: Vec<String> = flatten_groups(&groups)
            .into_iter()
            .map(|case| case.id)
            .collect();
        assert_eq!(ids[0], "1");
        assert_ne!(ids[1], "1");
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_flat_grouping_preserves_first_seen_order() {
        let outcome = ParseOutcome::Structured(StructuredPayload::FlatCases(vec![
            draft(None, Some("Checkout"), Some("Negative")),
            draft(None, Some("Login"), None),
            draft(None, Some("Checkout"), None),
            draft(None, None, None),
        ]));
        let groups = scenarios_of(assemble(outcome, TaskKind::GenerateTestCases));
        let titles: Vec<&str> = groups
            .iter()
            .map(|group| group.scenario_title.as_str())
            .collect();
        assert_eq!(titles, vec!["Checkout", "Login", UNCATEGORIZED]);
        assert_eq!(groups[0].negative_test_cases.len(), 1);
        assert_eq!(groups[0].positive_test_cases.len(), 1);
    }

    #[test]
    fn test_flat_negative_case_scenario() {
        let outcome = ParseOutcome::Structured(StructuredPayload::FlatCases(vec![TestCaseDraft {
            scenario: Some("Checkout".to_string()),
            case_type: Some("Negative".to_string()),
            summary: Some("fail on bad card".to_string()),
            ..TestCaseDraft::default()
        }]));
        let groups = scenarios_of(assemble(outcome, TaskKind::GenerateTestCases));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].scenario_title, "Checkout");
        assert!(groups[0].positive_test_cases.is_empty());
        assert_eq!(groups[0].negative_test_cases.len(), 1);
        assert_eq!(groups[0].negative_test_cases[0].summary, "fail on bad card");
    }

    #[test]
    fn test_nested_cases_inherit_list_polarity() {
        let outcome = ParseOutcome::Structured(StructuredPayload::Scenarios(vec![ScenarioDraft {
            scenario_title: "Login".to_string(),
            positive_test_cases: vec![draft(None, None, None)],
            negative_test_cases: vec![draft(None, None, None)],
        }]));
        let groups = scenarios_of(assemble(outcome, TaskKind::GenerateTestCases));
        assert_eq!(groups[0].positive_test_cases.len(), 1);
        assert_eq!(groups[0].negative_test_cases.len(), 1);
    }

    #[test]
    fn test_explicit_type_overrides_list_polarity() {
        let outcome = ParseOutcome::Structured(StructuredPayload::Scenarios(vec![ScenarioDraft {
            scenario_title: "Login".to_string(),
            positive_test_cases: vec![draft(None, None, Some("negative"))],
            negative_test_cases: vec![],
        }]));
        let groups = scenarios_of(assemble(outcome, TaskKind::GenerateTestCases));
        assert!(groups[0].positive_test_cases.is_empty());
        assert_eq!(groups[0].negative_test_cases.len(), 1);
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let payload = StructuredPayload::FlatCases(vec![
            draft(Some("7"), Some("A"), None),
            draft(None, Some("B"), Some("Negative")),
            draft(Some("7"), Some("A"), None),
        ]);
        let first = assemble(
            ParseOutcome::Structured(payload.clone()),
            TaskKind::GenerateTestCases,
        );
        let second = assemble(
            ParseOutcome::Structured(payload),
            TaskKind::GenerateTestCases,
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_group_flatten_round_trip() {
        let outcome = ParseOutcome::Structured(StructuredPayload::FlatCases(vec![
            draft(None, Some("A"), Some("Negative")),
            draft(None, Some("B"), None),
            draft(None, Some("A"), None),
        ]));
        let groups = scenarios_of(assemble(outcome, TaskKind::GenerateTestCases));
        let flattened = flatten_groups(&groups);
        assert_eq!(flattened.len(), 3);
        let regrouped = group_cases(flattened.clone());
        assert_eq!(regrouped, groups);
    }

    #[test]
    fn test_analysis_missing_fields_are_defaulted() {
        let mut fields = serde_json::Map::new();
        fields.insert(
            "potential_root_cause".to_string(),
            Value::String("race condition".to_string()),
        );
        let result = assemble(
            ParseOutcome::Structured(StructuredPayload::Analysis(fields)),
            TaskKind::AnalyzeDefect,
        );
        match result {
            AssembledResult::Analysis { fields } => {
                assert_eq!(fields.get("potential_root_cause").unwrap(), "race condition");
                assert_eq!(fields.get("suggested_severity_level").unwrap(), NOT_PROVIDED);
                assert_eq!(fields.get("defect_summary_draft").unwrap(), NOT_PROVIDED);
            }
            other => panic!("expected analysis, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_passes_through_unchanged() {
        let result = assemble(
            ParseOutcome::RawFallback {
                text: "not json at all".to_string(),
                warning: "AI response was not valid JSON".to_string(),
            },
            TaskKind::AnalyzeDefect,
        );
        assert_eq!(
            result,
            AssembledResult::RawText {
                text: "not json at all".to_string(),
                warning: "AI response was not valid JSON".to_string(),
            }
        );
    }

    #[test]
    fn test_automation_batch_passes_through() {
        let result = assemble(
            ParseOutcome::Structured(StructuredPayload::AutomationBatch(vec!["2".to_string()])),
            TaskKind::AnalyzeForAutomationBatch,
        );
        assert_eq!(
            result,
            AssembledResult::AutomationBatch {
                automated_test_case_ids: vec!["2".to_string()],
            }
        );
    }
}
