pub mod bootstrap;
pub mod config;
pub mod figma;
pub mod llm_clients;
pub mod persistence;
