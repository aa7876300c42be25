//! Analysis result storage boundary.
//!
//! The uniqueness of one [`AnalysisResult`] per error event is enforced
//! here — it is the single serialization point guarding against duplicate
//! triggers writing duplicate analyses. Everything behind the trait is an
//! external collaborator; [`MemoryStore`] is the in-process implementation
//! used by the worker and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{AnalysisResult, Result};

/// Outcome of an idempotent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The result was written.
    Inserted,

    /// A result already existed for this event; nothing was written.
    AlreadyExists,
}

/// Storage capability for analysis results, keyed by error event id.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Write the result unless one already exists for its event.
    /// A duplicate is a successful no-op, never an error.
    async fn insert_if_absent(&self, result: AnalysisResult) -> Result<InsertOutcome>;

    /// Read the stored result for an event, if any.
    async fn get(&self, error_event_id: Uuid) -> Result<Option<AnalysisResult>>;
}

/// In-memory store with the same uniqueness contract as the real storage.
#[derive(Default)]
pub struct MemoryStore {
    results: Mutex<HashMap<Uuid, AnalysisResult>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    async fn insert_if_absent(&self, result: AnalysisResult) -> Result<InsertOutcome> {
        let mut results = self.results.lock().await;
        if results.contains_key(&result.error_event_id) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        results.insert(result.error_event_id, result);
        Ok(InsertOutcome::Inserted)
    }

    async fn get(&self, error_event_id: Uuid) -> Result<Option<AnalysisResult>> {
        Ok(self.results.lock().await.get(&error_event_id).cloned())
    }
}
