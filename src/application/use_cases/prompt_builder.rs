use crate::domain::generation::{GenerationRequest, PromptPayload};
use crate::domain::task::TaskKind;

/// Builds the exact instruction text sent to the model. Deterministic for
/// identical inputs: no timestamps, no randomness.
pub fn build(request: &GenerationRequest) -> PromptPayload {
    let instruction_text = match request.task_kind {
        TaskKind::GenerateTestCases => build_test_case_instruction(request),
        TaskKind::AnalyzeDefect => build_analysis_instruction(
            request,
            "Act as an expert Software Debugging Analyst.\n\
             Analyze the following defect information from a failed test execution.\n\
             Based only on the provided details (especially the error logs), determine a plausible \
             root cause, a severity level (Low, Medium, High or Critical) with justification, and a \
             concise defect summary suitable for a bug report title.",
            "Defect Information",
        ),
        TaskKind::RecommendAutomation => build_analysis_instruction(
            request,
            "Act as an expert Test Automation Strategist.\n\
             Evaluate the suitability of the following manual test case for automation.\n\
             Consider return on investment based on execution frequency, manual effort saved, and \
             feature stability (stable features are better candidates). The recommendation must be \
             one of: Yes, No, Maybe.",
            "Test Case Details",
        ),
        TaskKind::AnalyzeCodeChangeImpact => build_analysis_instruction(
            request,
            "Act as an AI assisting with Test Impact Analysis.\n\
             You are given a description of a code change and a description of an existing test case.\n\
             Based only on the semantics and keywords in these two descriptions, estimate the \
             likelihood (High, Medium, Low or None) that the test case needs review due to the change.",
            "Descriptions",
        ),
        TaskKind::AnalyzeForAutomationBatch => build_analysis_instruction(
            request,
            "Act as an expert Test Automation Strategist.\n\
             You are given a batch of test cases, one per line, each starting with its id.\n\
             Select the test cases that are strong automation candidates: repetitive, deterministic, \
             high-value flows on stable features.",
            "Test Cases",
        ),
    };

    PromptPayload {
        instruction_text,
        image_parts: request.image_parts.clone(),
    }
}

fn build_test_case_instruction(request: &GenerationRequest) -> String {
    let mut body = String::new();
    body.push_str("Act as an expert Software Quality Assurance Engineer.\n");
    if request.image_parts.is_empty() {
        body.push_str(
            "Analyze the following software requirements and generate structured test cases \
             covering positive scenarios, negative scenarios, boundary values and edge cases, \
             based only on the provided content.\n",
        );
    } else {
        body.push_str(
            "Analyze the attached UI screenshots, in the order they are listed, and generate \
             structured test cases covering positive scenarios, negative scenarios, boundary \
             values and edge cases, based only on what the screenshots show.\n",
        );
    }

    body.push_str(
        "\nThe required output is a JSON array of scenario objects. Each scenario object has:\n\
         - scenario_title: string\n\
         - positive_test_cases: array of test case objects\n\
         - negative_test_cases: array of test case objects\n",
    );
    body.push_str(
        "\nEach test case object has exactly these fields:\n\
         - id: string\n\
         - scenario: string (the scenario it belongs to)\n\
         - type: \"Positive\" or \"Negative\"\n\
         - priority: string\n\
         - severity: string\n\
         - summary: string\n\
         - pre_condition: string\n\
         - test_steps: array of strings\n\
         - test_data: array of strings or object mapping field names to values\n\
         - expected_result: string\n",
    );
    body.push_str(
        "\nReturn only the JSON array. Do not include any surrounding prose, explanations, \
         markdown, or code fences.\n",
    );

    push_source_section(&mut body, "Content", request);
    body
}

fn build_analysis_instruction(
    request: &GenerationRequest,
    role_text: &str,
    section_title: &str,
) -> String {
    let mut body = String::new();
    body.push_str(role_text);
    body.push('\n');

    body.push_str("\nThe required output is a single JSON object with exactly these fields:\n");
    for field in request.task_kind.expected_fields() {
        body.push_str("- ");
        body.push_str(field);
        if *field == "automated_test_case_ids" {
            body.push_str(": array of test case id strings (may be empty)");
        } else {
            body.push_str(": string");
        }
        body.push('\n');
    }
    body.push_str(
        "\nReturn only the JSON object. Do not include any surrounding prose, explanations, \
         markdown, or code fences.\n",
    );

    push_source_section(&mut body, section_title, request);
    body
}

fn push_source_section(body: &mut String, title: &str, request: &GenerationRequest) {
    body.push('\n');
    body.push_str(title);
    body.push_str(":\n---\n");
    body.push_str(&request.canonical_text);
    body.push_str("\n---\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::generation::ImagePart;

    fn request(task_kind: TaskKind) -> GenerationRequest {
        GenerationRequest {
            task_kind,
            canonical_text: "Users must reset passwords via email.".to_string(),
            image_parts: Vec::new(),
            source_description: "Text Input".to_string(),
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let first = build(&request(TaskKind::GenerateTestCases));
        let second = build(&request(TaskKind::GenerateTestCases));
        assert_eq!(first, second);
    }

    #[test]
    fn test_test_case_instruction_states_the_contract() {
        let payload = build(&request(TaskKind::GenerateTestCases));
        let text = &payload.instruction_text;
        assert!(text.contains("JSON array of scenario objects"));
        assert!(text.contains("scenario_title"));
        assert!(text.contains("positive_test_cases"));
        assert!(text.contains("negative_test_cases"));
        for field in [
            "id", "scenario", "type", "priority", "severity", "summary", "pre_condition",
            "test_steps", "test_data", "expected_result",
        ] {
            assert!(text.contains(field), "missing field {}", field);
        }
        assert!(text.contains("Return only the JSON array"));
        assert!(text.contains("code fences"));
        assert!(text.contains("Users must reset passwords via email."));
    }

    #[test]
    fn test_analysis_instructions_enumerate_expected_fields() {
        for task_kind in [
            TaskKind::AnalyzeDefect,
            TaskKind::RecommendAutomation,
            TaskKind::AnalyzeCodeChangeImpact,
            TaskKind::AnalyzeForAutomationBatch,
        ] {
            let payload = build(&request(task_kind));
            for field in task_kind.expected_fields() {
                assert!(
                    payload.instruction_text.contains(field),
                    "{} missing field {}",
                    task_kind,
                    field
                );
            }
            assert!(payload.instruction_text.contains("single JSON object"));
        }
    }

    #[test]
    fn test_screenshot_request_references_images() {
        let mut screenshot_request = request(TaskKind::GenerateTestCases);
        screenshot_request.image_parts = vec![ImagePart {
            file_name: "01-login.png".to_string(),
            mime_type: "image/png".to_string(),
            data: vec![0],
        }];
        let payload = build(&screenshot_request);
        assert!(payload.instruction_text.contains("attached UI screenshots"));
        assert_eq!(payload.image_parts.len(), 1);
    }
}
