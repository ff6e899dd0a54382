use crate::{
    dto::{CreateNoteRequest, NoteResponse, UpdateNoteRequest},
    models::{NewNote, NoteId, NotePatch},
    repository::{NoteStore, StoreError},
};

use std::sync::Arc;

pub const TITLE_REQUIRED: &str = "title is required (string)";
pub const TITLE_EMPTY: &str = "title must not be empty";

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("note not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    pub async fn list_notes(&self) -> Result<Vec<NoteResponse>, ServiceError> {
        let notes = self.store.list().await?;
        Ok(notes.into_iter().map(NoteResponse::from).collect())
    }

    pub async fn get_note(&self, id: NoteId) -> Result<NoteResponse, ServiceError> {
        self.store
            .get(id)
            .await?
            .map(NoteResponse::from)
            .ok_or(ServiceError::NotFound)
    }

    /// Rejects a missing or empty title before touching the store.
    /// An empty content string is stored as `NULL`.
    pub async fn create_note(
        &self,
        request: CreateNoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        let title = request
            .title
            .filter(|title| !title.is_empty())
            .ok_or_else(|| ServiceError::Validation(TITLE_REQUIRED.to_string()))?;
        let content = request.content.filter(|content| !content.is_empty());

        let note = self.store.create(NewNote { title, content }).await?;
        tracing::debug!("created note {}", note.id);

        Ok(note.into())
    }

    pub async fn update_note(
        &self,
        id: NoteId,
        request: UpdateNoteRequest,
    ) -> Result<NoteResponse, ServiceError> {
        if request.title.as_deref() == Some("") {
            return Err(ServiceError::Validation(TITLE_EMPTY.to_string()));
        }

        let patch = NotePatch {
            title: request.title,
            content: request.content,
        };

        self.store
            .update(id, patch)
            .await?
            .map(NoteResponse::from)
            .ok_or(ServiceError::NotFound)
    }

    pub async fn delete_note(&self, id: NoteId) -> Result<(), ServiceError> {
        if self.store.delete(id).await? {
            tracing::debug!("deleted note {id}");
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }
}
