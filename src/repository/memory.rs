//! In-memory `NoteStore` used to exercise the service and router without a database.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::{NoteStore, StoreError};
use crate::models::{NewNote, Note, NoteId, NotePatch};

#[derive(Default)]
pub struct MemoryNoteStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: NoteId,
    notes: BTreeMap<NoteId, Note>,
}

impl MemoryNoteStore {
    pub fn note_count(&self) -> usize {
        self.lock().notes.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Mirrors the trigger: a refreshed timestamp always moves forward.
fn refreshed(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn list(&self) -> Result<Vec<Note>, StoreError> {
        Ok(self.lock().notes.values().rev().cloned().collect())
    }

    async fn get(&self, id: NoteId) -> Result<Option<Note>, StoreError> {
        Ok(self.lock().notes.get(&id).cloned())
    }

    async fn create(&self, note: NewNote) -> Result<Note, StoreError> {
        let mut inner = self.lock();
        inner.next_id += 1;
        let now = Utc::now();
        let note = Note {
            id: inner.next_id,
            title: note.title,
            content: note.content,
            created_at: now,
            updated_at: now,
        };
        inner.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update(&self, id: NoteId, patch: NotePatch) -> Result<Option<Note>, StoreError> {
        let mut inner = self.lock();
        let Some(note) = inner.notes.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = Some(content);
        }
        note.updated_at = refreshed(note.updated_at);
        Ok(Some(note.clone()))
    }

    async fn delete(&self, id: NoteId) -> Result<bool, StoreError> {
        Ok(self.lock().notes.remove(&id).is_some())
    }
}
