mod memory;
mod postgres;

pub use memory::MemoryNoteStore;
pub use postgres::PostgresNoteStore;

use async_trait::async_trait;

use crate::models::Document;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("migration error: {0}")]
    Migration(#[from] refinery::Error),
}

/// Per-user keyed collection of note documents.
///
/// Every call is scoped to an owner; implementations must never return or
/// touch documents stored under a different owner.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn get(&self, owner: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Creates or fully replaces the document at `id`.
    async fn set(&self, owner: &str, id: &str, doc: Document) -> Result<(), StoreError>;

    /// Overwrites only the keys present in `patch`. Returns false if the
    /// document does not exist.
    async fn update(&self, owner: &str, id: &str, patch: Document) -> Result<bool, StoreError>;

    /// Returns false if the document does not exist.
    async fn delete(&self, owner: &str, id: &str) -> Result<bool, StoreError>;

    /// All documents of `owner` paired with their storage keys.
    async fn list(&self, owner: &str) -> Result<Vec<(String, Document)>, StoreError>;
}
