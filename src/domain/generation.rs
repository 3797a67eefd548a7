use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::task::TaskKind;
use crate::domain::test_case::{ScenarioGroup, TestData};

/// One image attached to a vision prompt.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImagePart {
    pub file_name: String,
    pub mime_type: String,
    #[serde(with = "serde_bytes_base64")]
    pub data: Vec<u8>,
}

/// The canonical prompt payload produced by the input normalizer.
/// Constructed per caller action and discarded after one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub task_kind: TaskKind,
    pub canonical_text: String,
    pub image_parts: Vec<ImagePart>,
    pub source_description: String,
}

/// The exact instruction text (plus images) submitted to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPayload {
    pub instruction_text: String,
    pub image_parts: Vec<ImagePart>,
}

/// A test case as the model emits it: every field optional, ids free-form.
/// The assembler turns these into strict domain `TestCase` values.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TestCaseDraft {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub scenario: Option<String>,
    #[serde(rename = "type", default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub pre_condition: Option<String>,
    #[serde(default)]
    pub test_steps: Vec<String>,
    #[serde(default)]
    pub test_data: Option<TestData>,
    #[serde(default)]
    pub expected_result: Option<String>,
}

/// A scenario wrapper as the model emits it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScenarioDraft {
    pub scenario_title: String,
    #[serde(default)]
    pub positive_test_cases: Vec<TestCaseDraft>,
    #[serde(default)]
    pub negative_test_cases: Vec<TestCaseDraft>,
}

/// Schema-validated model output, before identifier assignment and grouping.
#[derive(Debug, Clone)]
pub enum StructuredPayload {
    /// The documented shape: an array of scenario objects.
    Scenarios(Vec<ScenarioDraft>),
    /// The tolerated alternate shape: a flat array of test cases, grouped
    /// downstream by each case's own `scenario` field.
    FlatCases(Vec<TestCaseDraft>),
    /// Single-object analysis result.
    Analysis(serde_json::Map<String, Value>),
    /// Automation-batch result: ids normalized to strings.
    AutomationBatch(Vec<String>),
}

/// Outcome of parsing raw model output. `RawFallback` is a first-class
/// success path, not an error: the original text is shown to the user.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Structured(StructuredPayload),
    RawFallback { text: String, warning: String },
}

/// The assembled, caller-facing result of one generation request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssembledResult {
    TestCases {
        scenarios: Vec<ScenarioGroup>,
    },
    Analysis {
        fields: serde_json::Map<String, Value>,
    },
    AutomationBatch {
        automated_test_case_ids: Vec<String>,
    },
    RawText {
        text: String,
        warning: String,
    },
}

/// The persisted envelope for one completed generation call. Identifier
/// durability and querying belong to the persistence collaborator.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerationRecord {
    pub id: String,
    pub project_id: String,
    pub task_kind: TaskKind,
    pub source_description: String,
    pub prompt_version: String,
    pub input_digest: String,
    pub created_at: i64,
    pub result: AssembledResult,
}

mod serde_bytes_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_part_serializes_as_base64() {
        let part = ImagePart {
            file_name: "login.png".to_string(),
            mime_type: "image/png".to_string(),
            data: vec![1, 2, 3],
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["data"], "AQID");
        let back: ImagePart = serde_json::from_value(json).unwrap();
        assert_eq!(back, part);
    }

    #[test]
    fn test_draft_tolerates_sparse_objects() {
        let draft: TestCaseDraft = serde_json::from_str(r#"{"summary":"ok"}"#).unwrap();
        assert_eq!(draft.summary.as_deref(), Some("ok"));
        assert!(draft.id.is_none());
        assert!(draft.test_steps.is_empty());
    }
}
