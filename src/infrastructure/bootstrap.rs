use std::sync::Arc;

use crate::application::GenerationUseCase;
use crate::infrastructure::config::Settings;
use crate::infrastructure::figma::FigmaClient;
use crate::infrastructure::llm_clients::GeminiClient;
use crate::infrastructure::persistence::InMemoryStore;
use crate::interfaces::http::AppState;

/// Wires settings into clients, stores and use cases.
pub fn setup(settings: Settings) -> AppState {
    let llm_client = Arc::new(GeminiClient::new());
    let store = Arc::new(InMemoryStore::new());

    let generation_use_case = Arc::new(GenerationUseCase::new(
        llm_client,
        store,
        settings.llm.clone(),
        settings.input_limits(),
    ));

    AppState {
        generation_use_case,
        figma_client: Arc::new(FigmaClient::new()),
    }
}
