use tracing::warn;

use crate::domain::error::{AppError, Result};
use crate::domain::figma::{FigmaFile, FigmaNode};
use crate::domain::generation::{GenerationRequest, ImagePart};
use crate::domain::task::TaskKind;

/// Image formats accepted from an uploaded archive.
const SUPPORTED_IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Caps applied before a prompt is built. Oversized text is truncated;
/// oversized image batches are rejected outright.
#[derive(Debug, Clone)]
pub struct InputLimits {
    pub max_input_chars: usize,
    pub max_images: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_input_chars: 18_000,
            max_images: 20,
        }
    }
}

/// One entry extracted from an uploaded archive. Extraction itself happens
/// at the edge; the normalizer only filters and orders.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// The supported input kinds, already decoded by their respective
/// ingestion collaborators.
#[derive(Debug, Clone)]
pub enum RequirementInput {
    Text(String),
    Document { file_name: String, text: String },
    Screenshots { archive_name: String, entries: Vec<ArchiveEntry> },
    Figma(FigmaFile),
}

/// Converts a raw input into the canonical prompt payload for `task_kind`.
pub fn normalize(
    task_kind: TaskKind,
    input: RequirementInput,
    limits: &InputLimits,
) -> Result<GenerationRequest> {
    match input {
        RequirementInput::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(AppError::EmptyInput(
                    "Requirement text is empty.".to_string(),
                ));
            }
            Ok(GenerationRequest {
                task_kind,
                canonical_text: truncate_text(trimmed, limits.max_input_chars),
                image_parts: Vec::new(),
                source_description: "Text Input".to_string(),
            })
        }
        RequirementInput::Document { file_name, text } => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(AppError::EmptyInput(format!(
                    "No text could be extracted from '{}'.",
                    file_name
                )));
            }
            Ok(GenerationRequest {
                task_kind,
                canonical_text: truncate_text(trimmed, limits.max_input_chars),
                image_parts: Vec::new(),
                source_description: format!("File: {}", file_name),
            })
        }
        RequirementInput::Screenshots {
            archive_name,
            entries,
        } => normalize_screenshots(task_kind, archive_name, entries, limits),
        RequirementInput::Figma(file) => normalize_figma(task_kind, file, limits),
    }
}

fn normalize_screenshots(
    task_kind: TaskKind,
    archive_name: String,
    entries: Vec<ArchiveEntry>,
    limits: &InputLimits,
) -> Result<GenerationRequest> {
    let mut image_parts = Vec::new();
    for entry in entries {
        if entry.file_name.starts_with("__MACOSX/") || entry.file_name.ends_with('/') {
            continue;
        }
        match image_mime_type(&entry.file_name) {
            Some(mime_type) => image_parts.push(ImagePart {
                file_name: entry.file_name,
                mime_type: mime_type.to_string(),
                data: entry.data,
            }),
            // Non-image archive entries are skipped, not an error.
            None => warn!(file = %entry.file_name, "Skipping unsupported file in archive"),
        }
    }

    if image_parts.is_empty() {
        return Err(AppError::NoImagesFound(format!(
            "Archive '{}' contained no supported images (png, jpg, jpeg).",
            archive_name
        )));
    }
    if image_parts.len() > limits.max_images {
        return Err(AppError::TooManyImages(format!(
            "Archive '{}' contained {} images; the limit is {}.",
            archive_name,
            image_parts.len(),
            limits.max_images
        )));
    }

    let mut canonical_text = String::from("UI screenshots, in order:\n");
    for (index, part) in image_parts.iter().enumerate() {
        canonical_text.push_str(&format!("Screenshot {}: {}\n", index + 1, part.file_name));
    }

    Ok(GenerationRequest {
        task_kind,
        canonical_text,
        image_parts,
        source_description: format!("Screenshots: {}", archive_name),
    })
}

fn normalize_figma(
    task_kind: TaskKind,
    file: FigmaFile,
    limits: &InputLimits,
) -> Result<GenerationRequest> {
    if file.top_level_frame_count() == 0 {
        return Err(AppError::NoFramesFound(
            "The Figma file contains no top-level frames.".to_string(),
        ));
    }

    let mut lines = Vec::new();
    for page in &file.document.children {
        flatten_figma_node(page, &mut lines);
    }
    let canonical_text = truncate_text(&lines.join("\n"), limits.max_input_chars);

    let source_description = if file.name.trim().is_empty() {
        "Figma File".to_string()
    } else {
        format!("Figma File ({})", file.name)
    };

    Ok(GenerationRequest {
        task_kind,
        canonical_text,
        image_parts: Vec::new(),
        source_description,
    })
}

/// Depth-first traversal rendering each structural or text node as
/// `<TYPE> "<name>": <text-content-if-any>`.
fn flatten_figma_node(node: &FigmaNode, lines: &mut Vec<String>) {
    if node.is_container() && !node.name.is_empty() {
        lines.push(format!("{} \"{}\"", node.node_type, node.name));
    }
    if node.node_type == "TEXT" {
        if let Some(characters) = node.characters.as_ref() {
            let text = characters.trim();
            if !text.is_empty() {
                lines.push(format!("TEXT \"{}\": {}", node.name, text));
            }
        }
    }
    for child in &node.children {
        flatten_figma_node(child, lines);
    }
}

fn image_mime_type(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit('.').next()?.to_ascii_lowercase();
    if !SUPPORTED_IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }
    match extension.as_str() {
        "png" => Some("image/png"),
        _ => Some("image/jpeg"),
    }
}

fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    warn!(
        original_chars = text.chars().count(),
        max_chars, "Input text truncated before prompt construction"
    );
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> InputLimits {
        InputLimits::default()
    }

    #[test]
    fn test_text_input_is_trimmed() {
        let request = normalize(
            TaskKind::GenerateTestCases,
            RequirementInput::Text("  login must lock after 3 failures  ".to_string()),
            &limits(),
        )
        .unwrap();
        assert_eq!(request.canonical_text, "login must lock after 3 failures");
        assert!(request.image_parts.is_empty());
        assert_eq!(request.source_description, "Text Input");
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let err = normalize(
            TaskKind::GenerateTestCases,
            RequirementInput::Text("   \n\t".to_string()),
            &limits(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::EmptyInput(_)));
    }

    #[test]
    fn test_blank_document_text_is_rejected() {
        let err = normalize(
            TaskKind::GenerateTestCases,
            RequirementInput::Document {
                file_name: "spec.pdf".to_string(),
                text: "  ".to_string(),
            },
            &limits(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::EmptyInput(_)));
    }

    #[test]
    fn test_long_text_is_truncated() {
        let long = "a".repeat(20_000);
        let request = normalize(
            TaskKind::GenerateTestCases,
            RequirementInput::Text(long),
            &limits(),
        )
        .unwrap();
        assert_eq!(request.canonical_text.chars().count(), 18_000);
    }

    #[test]
    fn test_screenshots_filter_and_order() {
        let entries = vec![
            ArchiveEntry {
                file_name: "__MACOSX/._a.png".to_string(),
                data: vec![0],
            },
            ArchiveEntry {
                file_name: "shots/".to_string(),
                data: vec![],
            },
            ArchiveEntry {
                file_name: "01-login.PNG".to_string(),
                data: vec![1],
            },
            ArchiveEntry {
                file_name: "notes.txt".to_string(),
                data: vec![2],
            },
            ArchiveEntry {
                file_name: "02-cart.jpeg".to_string(),
                data: vec![3],
            },
        ];
        let request = normalize(
            TaskKind::GenerateTestCases,
            RequirementInput::Screenshots {
                archive_name: "ui.zip".to_string(),
                entries,
            },
            &limits(),
        )
        .unwrap();
        assert_eq!(request.image_parts.len(), 2);
        assert_eq!(request.image_parts[0].file_name, "01-login.PNG");
        assert_eq!(request.image_parts[0].mime_type, "image/png");
        assert_eq!(request.image_parts[1].mime_type, "image/jpeg");
        assert!(request.canonical_text.contains("Screenshot 1: 01-login.PNG"));
        assert!(request.canonical_text.contains("Screenshot 2: 02-cart.jpeg"));
    }

    #[test]
    fn test_archive_without_images_is_rejected() {
        let err = normalize(
            TaskKind::GenerateTestCases,
            RequirementInput::Screenshots {
                archive_name: "docs.zip".to_string(),
                entries: vec![ArchiveEntry {
                    file_name: "readme.md".to_string(),
                    data: vec![1],
                }],
            },
            &limits(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NoImagesFound(_)));
    }

    #[test]
    fn test_oversized_batch_is_rejected() {
        let entries = (0..21)
            .map(|index| ArchiveEntry {
                file_name: format!("shot-{}.png", index),
                data: vec![0],
            })
            .collect();
        let err = normalize(
            TaskKind::GenerateTestCases,
            RequirementInput::Screenshots {
                archive_name: "ui.zip".to_string(),
                entries,
            },
            &limits(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::TooManyImages(_)));
    }

    fn sample_figma() -> FigmaFile {
        serde_json::from_str(
            r#"{
                "name": "Checkout",
                "document": {
                    "type": "DOCUMENT",
                    "children": [
                        {"type": "CANVAS", "name": "Page 1", "children": [
                            {"type": "FRAME", "name": "Login Screen", "children": [
                                {"type": "TEXT", "name": "Title", "characters": "Welcome back"},
                                {"type": "GROUP", "name": "Form", "children": [
                                    {"type": "TEXT", "name": "CTA", "characters": "Sign in"}
                                ]}
                            ]}
                        ]}
                    ]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_figma_flattening_is_depth_first() {
        let request = normalize(
            TaskKind::GenerateTestCases,
            RequirementInput::Figma(sample_figma()),
            &limits(),
        )
        .unwrap();
        let lines: Vec<&str> = request.canonical_text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "FRAME \"Login Screen\"",
                "TEXT \"Title\": Welcome back",
                "GROUP \"Form\"",
                "TEXT \"CTA\": Sign in",
            ]
        );
        assert_eq!(request.source_description, "Figma File (Checkout)");
    }

    #[test]
    fn test_figma_without_frames_is_rejected() {
        let file: FigmaFile = serde_json::from_str(
            r#"{"document": {"type": "DOCUMENT", "children": [
                {"type": "CANVAS", "name": "Empty", "children": []}
            ]}}"#,
        )
        .unwrap();
        let err = normalize(
            TaskKind::GenerateTestCases,
            RequirementInput::Figma(file),
            &limits(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::NoFramesFound(_)));
    }
}
