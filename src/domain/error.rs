use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    Internal(String),
    NotFound(String),
    ValidationError(String),
    EmptyInput(String),
    NoImagesFound(String),
    NoFramesFound(String),
    TooManyImages(String),
    GenerationUnavailable(String),
    StorageError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::EmptyInput(msg) => write!(f, "Empty input: {}", msg),
            AppError::NoImagesFound(msg) => write!(f, "No images found: {}", msg),
            AppError::NoFramesFound(msg) => write!(f, "No frames found: {}", msg),
            AppError::TooManyImages(msg) => write!(f, "Too many images: {}", msg),
            AppError::GenerationUnavailable(msg) => write!(f, "Generation unavailable: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Caller-correctable input errors. Generation is never attempted for these.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AppError::ValidationError(_)
                | AppError::EmptyInput(_)
                | AppError::NoImagesFound(_)
                | AppError::NoFramesFound(_)
                | AppError::TooManyImages(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
