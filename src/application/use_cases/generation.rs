use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::application::use_cases::{input_normalizer, prompt_builder, response_parser, result_assembler};
use crate::application::use_cases::input_normalizer::{InputLimits, RequirementInput};
use crate::domain::error::Result;
use crate::domain::generation::{GenerationRecord, ParseOutcome};
use crate::domain::llm_config::LLMConfig;
use crate::domain::task::TaskKind;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::persistence::ResultStore;

const PROMPT_VERSION: &str = "v1";

/// Runs the full pipeline for one caller action: normalize the input,
/// build the prompt, call the model once, parse and assemble the output,
/// persist the record. No shared mutable state; concurrent requests need
/// no coordination.
pub struct GenerationUseCase {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    store: Arc<dyn ResultStore + Send + Sync>,
    llm_config: LLMConfig,
    limits: InputLimits,
}

impl GenerationUseCase {
    pub fn new(
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        store: Arc<dyn ResultStore + Send + Sync>,
        llm_config: LLMConfig,
        limits: InputLimits,
    ) -> Self {
        Self {
            llm_client,
            store,
            llm_config,
            limits,
        }
    }

    pub async fn execute(
        &self,
        project_id: &str,
        task_kind: TaskKind,
        input: RequirementInput,
    ) -> Result<GenerationRecord> {
        let request = input_normalizer::normalize(task_kind, input, &self.limits)?;
        let source_description = request.source_description.clone();
        let payload = prompt_builder::build(&request);

        info!(
            task = %task_kind,
            source = %source_description,
            images = payload.image_parts.len(),
            "Submitting generation request"
        );

        let raw_output = self.llm_client.generate(&self.llm_config, &payload).await?;

        let outcome = response_parser::parse(task_kind, &raw_output);
        if let ParseOutcome::RawFallback { warning, .. } = &outcome {
            warn!(task = %task_kind, warning = %warning, "Falling back to raw model output");
        }
        let result = result_assembler::assemble(outcome, task_kind);

        let record = GenerationRecord {
            id: Uuid::new_v4().to_string(),
            project_id: project_id.to_string(),
            task_kind,
            source_description,
            prompt_version: PROMPT_VERSION.to_string(),
            input_digest: hash_input(&payload.instruction_text, &self.llm_config.model),
            created_at: chrono::Utc::now().timestamp_millis(),
            result,
        };
        self.store.save(&record).await?;

        Ok(record)
    }

    pub async fn history(&self, project_id: &str) -> Result<Vec<GenerationRecord>> {
        self.store.list_for_project(project_id).await
    }
}

fn hash_input(instruction_text: &str, model: &str) -> String {
    let combined = format!("{}::{}", model, instruction_text);
    let mut hasher = DefaultHasher::new();
    combined.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}
