//! DocumentStore trait — identifier → addressable text.
//!
//! The store is the sole source of truth for everything downstream of
//! ingestion. Writes are last-write-wins on identifier collision; records are
//! never evicted for the lifetime of the store.

use async_trait::async_trait;
use std::sync::Arc;

use crate::document::{DocumentInfo, DocumentRecord};
use crate::error::StoreError;

/// The core DocumentStore trait.
///
/// Implementations: in-memory (default).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The backend name (e.g., "in_memory").
    fn name(&self) -> &str;

    /// Store a record under its name, returning the record it replaced.
    ///
    /// The caller keeps its own `Arc`, so it never has to read the record
    /// back (a concurrent upload of the same name may already have won).
    async fn put(
        &self,
        record: Arc<DocumentRecord>,
    ) -> std::result::Result<Option<Arc<DocumentRecord>>, StoreError>;

    /// Look up a record by name. `Ok(None)` is the normal "never uploaded" case.
    async fn get(&self, name: &str)
    -> std::result::Result<Option<Arc<DocumentRecord>>, StoreError>;

    /// Listing view of every stored record, sorted by name.
    async fn list(&self) -> std::result::Result<Vec<DocumentInfo>, StoreError>;

    /// Number of stored records.
    async fn count(&self) -> std::result::Result<usize, StoreError>;
}
