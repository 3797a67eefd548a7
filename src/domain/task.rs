use serde::{Deserialize, Serialize};

/// The kinds of generation work the pipeline can be asked to perform.
/// The serde names are the identifiers exchanged with callers.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    GenerateTestCases,
    AnalyzeDefect,
    RecommendAutomation,
    AnalyzeCodeChangeImpact,
    AnalyzeForAutomationBatch,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::GenerateTestCases => "generate_test_cases",
            TaskKind::AnalyzeDefect => "analyze_defect",
            TaskKind::RecommendAutomation => "recommend_automation",
            TaskKind::AnalyzeCodeChangeImpact => "analyze_code_change_impact",
            TaskKind::AnalyzeForAutomationBatch => "analyze_for_automation_batch",
        }
    }

    /// Analysis tasks expect a single JSON object from the model; the
    /// test-case task expects an array of scenario objects.
    pub fn is_analysis(&self) -> bool {
        !matches!(self, TaskKind::GenerateTestCases)
    }

    /// Field names the model is instructed to emit for single-object
    /// analysis tasks. Shared between the prompt builder (which enumerates
    /// them) and the assembler (which defaults the missing ones).
    pub fn expected_fields(&self) -> &'static [&'static str] {
        match self {
            TaskKind::GenerateTestCases => &[],
            TaskKind::AnalyzeDefect => &[
                "potential_root_cause",
                "suggested_severity_level",
                "severity_justification",
                "defect_summary_draft",
            ],
            TaskKind::RecommendAutomation => &["recommendation", "justification"],
            TaskKind::AnalyzeCodeChangeImpact => &["impact_likelihood", "reasoning"],
            TaskKind::AnalyzeForAutomationBatch => &["automated_test_case_ids"],
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_identifiers_round_trip() {
        for kind in [
            TaskKind::GenerateTestCases,
            TaskKind::AnalyzeDefect,
            TaskKind::RecommendAutomation,
            TaskKind::AnalyzeCodeChangeImpact,
            TaskKind::AnalyzeForAutomationBatch,
        ] {
            let encoded = serde_json::to_string(&kind).unwrap();
            assert_eq!(encoded, format!("\"{}\"", kind.as_str()));
            let decoded: TaskKind = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, kind);
        }
    }

    #[test]
    fn test_analysis_tasks_have_expected_fields() {
        assert!(TaskKind::GenerateTestCases.expected_fields().is_empty());
        assert!(TaskKind::AnalyzeDefect
            .expected_fields()
            .contains(&"potential_root_cause"));
        assert!(TaskKind::AnalyzeForAutomationBatch
            .expected_fields()
            .contains(&"automated_test_case_ids"));
    }
}
