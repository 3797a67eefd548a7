use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::domain::generation::{ParseOutcome, ScenarioDraft, StructuredPayload, TestCaseDraft};
use crate::domain::task::TaskKind;

pub const WARN_INVALID_JSON: &str = "AI response was not valid JSON";
pub const WARN_SCHEMA_MISMATCH: &str = "AI response did not match the expected schema";

static THINK_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<think>[\s\S]*?</think>|<think\s*/>").unwrap());

static REASONING_TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<reasoning>[\s\S]*?</reasoning>").unwrap());

/// Turns raw model output into either a schema-validated payload or a raw
/// fallback. Every input maps to one of the two variants; this function
/// never fails.
pub fn parse(task_kind: TaskKind, raw_output: &str) -> ParseOutcome {
    let cleaned = strip_artifacts(raw_output);
    let unfenced = strip_code_fence(&cleaned);
    let candidate = slice_json_boundary(unfenced);

    let decoded: Value = match serde_json::from_str(candidate) {
        Ok(value) => value,
        Err(_) => return raw_fallback(raw_output, WARN_INVALID_JSON),
    };

    match validate(task_kind, decoded) {
        Some(payload) => ParseOutcome::Structured(payload),
        None => raw_fallback(raw_output, WARN_SCHEMA_MISMATCH),
    }
}

fn raw_fallback(raw_output: &str, warning: &str) -> ParseOutcome {
    ParseOutcome::RawFallback {
        text: raw_output.to_string(),
        warning: warning.to_string(),
    }
}

/// Removes reasoning artifacts some models emit despite instructions.
fn strip_artifacts(output: &str) -> String {
    let cleaned = THINK_TAG_PATTERN.replace_all(output, "");
    let cleaned = REASONING_TAG_PATTERN.replace_all(&cleaned, "");
    cleaned.trim().to_string()
}

/// Removes a wrapping fenced code block (``` or ```json) when both the
/// opening and closing fences are present.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(first_line) = trimmed.lines().next() else {
        return trimmed;
    };
    if !first_line.trim_start().starts_with("```") {
        return trimmed;
    }
    let rest = &trimmed[first_line.len()..];
    match rest.trim_end().strip_suffix("```") {
        Some(interior) => interior.trim(),
        None => trimmed,
    }
}

/// Slices to the span between the first opening and last closing JSON
/// bracket, tolerating commentary the model emits around the payload.
fn slice_json_boundary(text: &str) -> &str {
    let start = text.find(|c| c == '{' || c == '[');
    let end = text.rfind(|c| c == '}' || c == ']');
    match (start, end) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

fn validate(task_kind: TaskKind, decoded: Value) -> Option<StructuredPayload> {
    match task_kind {
        TaskKind::GenerateTestCases => validate_test_cases(decoded),
        TaskKind::AnalyzeForAutomationBatch => validate_automation_batch(decoded),
        _ => match decoded {
            Value::Object(map) => Some(StructuredPayload::Analysis(map)),
            _ => None,
        },
    }
}

fn validate_test_cases(decoded: Value) -> Option<StructuredPayload> {
    let Value::Array(items) = decoded else {
        return None;
    };
    if !items.iter().all(Value::is_object) {
        return None;
    }

    // The presence of `scenario_title` is the sole shape discriminator.
    let nested = items
        .first()
        .map(|item| item.get("scenario_title").is_some())
        .unwrap_or(true);

    if nested {
        for item in &items {
            let object = item.as_object()?;
            if !object.contains_key("scenario_title") {
                return None;
            }
            let positive = object.get("positive_test_cases");
            let negative = object.get("negative_test_cases");
            if positive.is_none() && negative.is_none() {
                return None;
            }
            for list in [positive, negative].into_iter().flatten() {
                let cases = list.as_array()?;
                if !cases.iter().all(Value::is_object) {
                    return None;
                }
            }
        }
        let scenarios: Vec<ScenarioDraft> = serde_json::from_value(Value::Array(items)).ok()?;
        Some(StructuredPayload::Scenarios(scenarios))
    } else {
        let cases: Vec<TestCaseDraft> = serde_json::from_value(Value::Array(items)).ok()?;
        Some(StructuredPayload::FlatCases(cases))
    }
}

fn validate_automation_batch(decoded: Value) -> Option<StructuredPayload> {
    let Value::Object(map) = decoded else {
        return None;
    };
    let ids = map.get("automated_test_case_ids")?.as_array()?;
    let mut normalized = Vec::with_capacity(ids.len());
    for id in ids {
        match id {
            Value::String(value) => normalized.push(value.clone()),
            Value::Number(value) => normalized.push(value.to_string()),
            _ => return None,
        }
    }
    Some(StructuredPayload::AutomationBatch(normalized))
}
