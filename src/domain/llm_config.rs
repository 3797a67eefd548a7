use serde::{Deserialize, Serialize};

/// Runtime configuration for the generation model call.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-1.5-flash-latest".to_string(),
            api_key: None,
            max_output_tokens: Some(8000),
            temperature: Some(0.7),
            top_p: Some(0.95),
            top_k: Some(40),
        }
    }
}
