//! Note orchestration across the durable store and the aggregate cache.
//!
//! Every operation reads the cached aggregate first and writes the whole list
//! back after a successful store call. Requests do not coordinate with each
//! other: two writers that read the same aggregate race, and the later
//! rewrite drops the earlier one's edit from the cache until the entry
//! expires. The store remains the source of truth.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::repos::{CreateNoteParams, NotesRepo, RepoError, UpdateNoteParams};
use crate::cache::{AggregateCache, CacheError};
use crate::domain::entities::NoteRecord;
use crate::domain::error::DomainError;
use crate::domain::notes::NoteDraft;

#[derive(Debug, Error)]
pub enum NoteServiceError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error("a note titled `{title}` already exists")]
    Conflict { title: String },
    #[error("note not found")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl NoteServiceError {
    fn conflict(title: &str) -> Self {
        Self::Conflict {
            title: title.to_string(),
        }
    }

    fn from_write(err: RepoError, title: &str) -> Self {
        match err {
            RepoError::Duplicate { .. } => Self::conflict(title),
            other => Self::Repo(other),
        }
    }
}

/// Which side answered a read or carried a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteSource {
    Cache,
    Store,
}

#[derive(Debug, Clone)]
pub struct NoteListing {
    pub notes: Vec<NoteRecord>,
    pub source: NoteSource,
}

#[derive(Debug, Clone)]
pub struct UpdatedNote {
    pub note: NoteRecord,
    pub source: NoteSource,
}

#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn NotesRepo>,
    cache: AggregateCache,
}

impl NoteService {
    pub fn new(store: Arc<dyn NotesRepo>, cache: AggregateCache) -> Self {
        Self { store, cache }
    }

    /// Uniqueness is checked against the store; the cache may understate it.
    pub async fn create(&self, title: &str, content: &str) -> Result<NoteRecord, NoteServiceError> {
        let draft = NoteDraft::new(title, content)?;

        if self.store.find_by_title(draft.title()).await?.is_some() {
            return Err(NoteServiceError::conflict(draft.title()));
        }

        let note = self
            .store
            .create_note(CreateNoteParams {
                title: draft.title().to_string(),
                content: draft.content().to_string(),
            })
            .await
            .map_err(|err| NoteServiceError::from_write(err, draft.title()))?;

        let mut notes = self.cache.get().await?.unwrap_or_default();
        notes.push(note.clone());
        self.cache.set(&notes).await?;

        info!(
            target = "notecache::notes",
            note_id = %note.id,
            cached = notes.len(),
            "note created"
        );
        Ok(note)
    }

    /// A cached copy wins even when its content is stale.
    pub async fn get_by_id(&self, id: Uuid) -> Result<NoteRecord, NoteServiceError> {
        let cached = self.cache.get().await?;

        if let Some(note) = cached
            .as_ref()
            .and_then(|notes| notes.iter().find(|note| note.id == id))
        {
            return Ok(note.clone());
        }

        let note = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(NoteServiceError::NotFound)?;

        // Appended without dedup: a partial aggregate may already hold this id.
        let mut notes = cached.unwrap_or_default();
        notes.push(note.clone());
        self.cache.set(&notes).await?;

        debug!(
            target = "notecache::notes",
            note_id = %id,
            cached = notes.len(),
            "note backfilled into aggregate"
        );
        Ok(note)
    }

    pub async fn get_all(&self) -> Result<NoteListing, NoteServiceError> {
        if let Some(notes) = self.cache.get().await? {
            return Ok(NoteListing {
                notes,
                source: NoteSource::Cache,
            });
        }

        let notes = self.store.list_all().await?;
        self.cache.set(&notes).await?;

        debug!(
            target = "notecache::notes",
            count = notes.len(),
            "aggregate refilled from store"
        );
        Ok(NoteListing {
            notes,
            source: NoteSource::Store,
        })
    }

    /// Edits through the cached copy when the aggregate holds the id, otherwise
    /// through the store followed by a full refill of the aggregate. Fields are
    /// written as given; only creation checks for empty values.
    pub async fn update_by_id(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<UpdatedNote, NoteServiceError> {
        let params = UpdateNoteParams {
            id,
            title: title.to_string(),
            content: content.to_string(),
        };

        if let Some(mut notes) = self.cache.get().await? {
            if let Some(index) = notes.iter().position(|note| note.id == id) {
                notes[index].merge_edit(title, content);
                let merged = notes[index].clone();

                let persisted = self
                    .store
                    .update_note(params)
                    .await
                    .map_err(|err| NoteServiceError::from_write(err, title))?;
                if persisted.is_none() {
                    warn!(
                        target = "notecache::notes",
                        note_id = %id,
                        "cached note is missing from the store; cached copy kept until expiry"
                    );
                }

                self.cache.set(&notes).await?;
                info!(
                    target = "notecache::notes",
                    note_id = %id,
                    source = "cache",
                    "note updated"
                );
                return Ok(UpdatedNote {
                    note: merged,
                    source: NoteSource::Cache,
                });
            }

            debug!(
                target = "notecache::notes",
                note_id = %id,
                "note absent from cached aggregate; updating through store"
            );
        }

        let note = self
            .store
            .update_note(params)
            .await
            .map_err(|err| NoteServiceError::from_write(err, title))?
            .ok_or(NoteServiceError::NotFound)?;

        let notes = self.store.list_all().await?;
        self.cache.set(&notes).await?;

        info!(
            target = "notecache::notes",
            note_id = %id,
            source = "store",
            "note updated"
        );
        Ok(UpdatedNote {
            note,
            source: NoteSource::Store,
        })
    }

    /// The cached aggregate is filtered before the store is asked, so a failed
    /// store delete can still leave the id dropped from the cache.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<NoteRecord, NoteServiceError> {
        if let Some(mut notes) = self.cache.get().await? {
            notes.retain(|note| note.id != id);
            self.cache.set(&notes).await?;
        }

        let deleted = self
            .store
            .delete_note(id)
            .await?
            .ok_or(NoteServiceError::NotFound)?;

        info!(target = "notecache::notes", note_id = %id, "note deleted");
        Ok(deleted)
    }

    pub async fn store_health(&self) -> Result<(), RepoError> {
        self.store.health_check().await
    }
}
