mod embedded;
#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgNoteStore;

use async_trait::async_trait;

use crate::models::{NewNote, Note, NoteId, NotePatch};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("database pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("failed to build database pool: {0}")]
    PoolBuild(#[from] deadpool_postgres::BuildError),

    #[error("failed to set up TLS: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("schema migration failed: {0}")]
    Migration(#[from] refinery::Error),
}

/// Persistence operations over the `notes` table.
///
/// Every method maps to a single statement; nothing spans more than one call.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes, newest id first.
    async fn list(&self) -> Result<Vec<Note>, StoreError>;

    async fn get(&self, id: NoteId) -> Result<Option<Note>, StoreError>;

    async fn create(&self, note: NewNote) -> Result<Note, StoreError>;

    /// Applies the present fields of `patch`. Returns `None` when `id` does not exist.
    async fn update(&self, id: NoteId, patch: NotePatch) -> Result<Option<Note>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: NoteId) -> Result<bool, StoreError>;
}
