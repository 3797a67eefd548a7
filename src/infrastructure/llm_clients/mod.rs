pub mod gemini;

use async_trait::async_trait;

use crate::domain::error::Result;
use crate::domain::generation::PromptPayload;
use crate::domain::llm_config::LLMConfig;

pub use gemini::GeminiClient;

/// One call to a generative model: instruction text plus optional image
/// parts in, raw output text back. Transport, auth and quota failures
/// surface as `GenerationUnavailable` and are fatal for the request.
#[async_trait]
pub trait LLMClient {
    async fn generate(&self, config: &LLMConfig, payload: &PromptPayload) -> Result<String>;
}
