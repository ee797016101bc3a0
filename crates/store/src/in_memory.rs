//! In-memory document store.
//!
//! Records live for the lifetime of the process; a restart forgets every
//! upload.

use async_trait::async_trait;
use docent_core::document::{DocumentInfo, DocumentRecord};
use docent_core::error::StoreError;
use docent_core::store::DocumentStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A process-local store keyed by document name.
///
/// Records are shared as `Arc`s so concurrent readers never copy the text.
pub struct InMemoryDocumentStore {
    records: Arc<RwLock<HashMap<String, Arc<DocumentRecord>>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn put(
        &self,
        record: Arc<DocumentRecord>,
    ) -> Result<Option<Arc<DocumentRecord>>, StoreError> {
        let name = record.name.clone();
        let previous = self.records.write().await.insert(name.clone(), record);
        if previous.is_some() {
            debug!(document = %name, "Replaced existing document");
        }
        Ok(previous)
    }

    async fn get(&self, name: &str) -> Result<Option<Arc<DocumentRecord>>, StoreError> {
        Ok(self.records.read().await.get(name).cloned())
    }

    async fn list(&self) -> Result<Vec<DocumentInfo>, StoreError> {
        let records = self.records.read().await;
        let mut infos: Vec<DocumentInfo> = records
            .values()
            .map(|r| DocumentInfo::from(r.as_ref()))
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}
