use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::application::use_cases::input_normalizer::InputLimits;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LimitSettings {
    pub max_input_chars: usize,
    pub max_images: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        let defaults = InputLimits::default();
        Self {
            max_input_chars: defaults.max_input_chars,
            max_images: defaults.max_images,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub llm: LLMConfig,
    #[serde(default)]
    pub limits: LimitSettings,
}

impl Settings {
    /// Loads `caseforge.toml` merged with `CASEFORGE_`-prefixed environment
    /// variables (e.g. `CASEFORGE_SERVER__PORT=8080`). The Gemini API key
    /// additionally falls back to `GOOGLE_API_KEY`, matching the `.env`
    /// convention of the deployment.
    pub fn load() -> Result<Self> {
        let mut settings: Settings = Figment::new()
            .merge(Toml::file("caseforge.toml"))
            .merge(Env::prefixed("CASEFORGE_").split("__"))
            .extract()
            .map_err(|e| AppError::ValidationError(format!("Invalid configuration: {}", e)))?;

        if settings.llm.api_key.is_none() {
            settings.llm.api_key = std::env::var("GOOGLE_API_KEY").ok();
        }
        Ok(settings)
    }

    pub fn input_limits(&self) -> InputLimits {
        InputLimits {
            max_input_chars: self.limits.max_input_chars,
            max_images: self.limits.max_images,
        }
    }
}
