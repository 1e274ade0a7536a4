//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::NoteRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CreateNoteParams {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct UpdateNoteParams {
    pub id: Uuid,
    pub title: String,
    pub content: String,
}

/// Durable per-document note storage.
///
/// Lookups and writes that address a single note return `Ok(None)` when the
/// note does not exist; errors are reserved for collaborator failures.
#[async_trait]
pub trait NotesRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NoteRecord>, RepoError>;

    async fn find_by_title(&self, title: &str) -> Result<Option<NoteRecord>, RepoError>;

    async fn list_all(&self) -> Result<Vec<NoteRecord>, RepoError>;

    async fn create_note(&self, params: CreateNoteParams) -> Result<NoteRecord, RepoError>;

    /// Returns the note as it reads after the update.
    async fn update_note(
        &self,
        params: UpdateNoteParams,
    ) -> Result<Option<NoteRecord>, RepoError>;

    /// Returns the note as it read before removal.
    async fn delete_note(&self, id: Uuid) -> Result<Option<NoteRecord>, RepoError>;

    async fn health_check(&self) -> Result<(), RepoError>;
}
