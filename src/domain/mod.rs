pub mod error;
pub mod figma;
pub mod generation;
pub mod llm_config;
pub mod task;
pub mod test_case;
