use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::error::{AppError, Result};
use crate::domain::figma::FigmaFile;

const FIGMA_API_BASE_URL: &str = "https://api.figma.com/v1";

static FILE_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:/file/|/proto/|/design/)([a-zA-Z0-9]+)").unwrap());

/// Extracts the file key from the file, proto and design Figma URL forms.
pub fn extract_file_key(figma_url: &str) -> Option<String> {
    FILE_KEY_PATTERN
        .captures(figma_url)
        .map(|captures| captures[1].to_string())
}

/// Fetches Figma document trees. The core never talks to this directly;
/// the HTTP layer resolves a URL+token into a `FigmaFile` before handing
/// it to the pipeline.
pub struct FigmaClient {
    client: reqwest::Client,
    base_url: String,
}

impl FigmaClient {
    pub fn new() -> Self {
        Self::with_base_url(FIGMA_API_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url,
        }
    }

    pub async fn fetch_file(&self, file_key: &str, token: &str) -> Result<FigmaFile> {
        let url = format!("{}/files/{}", self.base_url.trim_end_matches('/'), file_key);

        let response = self
            .client
            .get(&url)
            .header("X-Figma-Token", token)
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Figma API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 | 403 => AppError::ValidationError(
                    "Figma API access denied. Check your personal access token.".to_string(),
                ),
                404 => AppError::NotFound(
                    "Figma file not found. Check the file key or URL.".to_string(),
                ),
                _ => AppError::Internal(format!(
                    "Figma API returned status {} for file {}",
                    status, file_key
                )),
            });
        }

        response
            .json::<FigmaFile>()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to decode Figma file JSON: {}", e)))
    }
}

impl Default for FigmaClient {
    fn default() -> Self {
        Self::new()
    }
}
