use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::error::{AppError, Result};
use crate::domain::generation::GenerationRecord;

/// Boundary to the document store owning generation results. Identifier
/// durability, timestamps and export live behind this trait.
#[async_trait]
pub trait ResultStore {
    async fn save(&self, record: &GenerationRecord) -> Result<()>;

    async fn list_for_project(&self, project_id: &str) -> Result<Vec<GenerationRecord>>;
}

/// In-memory store used by default and in tests. The production deployment
/// swaps in a document-database-backed implementation.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<GenerationRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultStore for InMemoryStore {
    async fn save(&self, record: &GenerationRecord) -> Result<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| AppError::StorageError("Result store lock poisoned".to_string()))?;
        records.push(record.clone());
        Ok(())
    }

    async fn list_for_project(&self, project_id: &str) -> Result<Vec<GenerationRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| AppError::StorageError("Result store lock poisoned".to_string()))?;
        Ok(records
            .iter()
            .filter(|record| record.project_id == project_id)
            .cloned()
            .collect())
    }
}
