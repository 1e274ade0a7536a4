//! In-memory collaborators shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use time::{Duration, OffsetDateTime, macros::datetime};
use tokio::sync::{Barrier, Mutex};
use uuid::Uuid;

use notecache::application::notes::NoteService;
use notecache::application::repos::{CreateNoteParams, NotesRepo, RepoError, UpdateNoteParams};
use notecache::cache::{AggregateCache, CacheBackend, CacheConfig, CacheError};
use notecache::domain::entities::NoteRecord;

const EPOCH: OffsetDateTime = datetime!(2024-01-01 0:00 UTC);

#[derive(Default)]
struct StoreState {
    notes: Vec<NoteRecord>,
    ticks: i64,
}

impl StoreState {
    fn next_timestamp(&mut self) -> OffsetDateTime {
        self.ticks += 1;
        EPOCH + Duration::seconds(self.ticks)
    }
}

/// Store fake with whole-second timestamps and failure/interleaving hooks.
#[derive(Default)]
pub struct InMemoryNotesRepo {
    state: Mutex<StoreState>,
    failing: AtomicBool,
    update_barrier: Option<Arc<Barrier>>,
}

impl InMemoryNotesRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `update_note` waits until `parties` updates are in flight.
    pub fn with_update_barrier(parties: usize) -> Self {
        Self {
            update_barrier: Some(Arc::new(Barrier::new(parties))),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Write straight to the store, the way another process would.
    pub async fn insert_direct(&self, title: &str, content: &str) -> NoteRecord {
        let mut state = self.state.lock().await;
        let now = state.next_timestamp();
        let note = NoteRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.notes.push(note.clone());
        note
    }

    pub async fn edit_direct(&self, id: Uuid, content: &str) {
        let mut state = self.state.lock().await;
        if let Some(note) = state.notes.iter_mut().find(|note| note.id == id) {
            note.content = content.to_string();
        }
    }

    pub async fn remove_direct(&self, id: Uuid) {
        self.state.lock().await.notes.retain(|note| note.id != id);
    }

    pub async fn snapshot(&self) -> Vec<NoteRecord> {
        self.state.lock().await.notes.clone()
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl NotesRepo for InMemoryNotesRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<NoteRecord>, RepoError> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state.notes.iter().find(|note| note.id == id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<NoteRecord>, RepoError> {
        self.check()?;
        let state = self.state.lock().await;
        Ok(state.notes.iter().find(|note| note.title == title).cloned())
    }

    async fn list_all(&self) -> Result<Vec<NoteRecord>, RepoError> {
        self.check()?;
        Ok(self.state.lock().await.notes.clone())
    }

    async fn create_note(&self, params: CreateNoteParams) -> Result<NoteRecord, RepoError> {
        self.check()?;
        let mut state = self.state.lock().await;
        if state.notes.iter().any(|note| note.title == params.title) {
            return Err(RepoError::Duplicate {
                constraint: "notes_title_key".to_string(),
            });
        }
        let now = state.next_timestamp();
        let note = NoteRecord {
            id: Uuid::new_v4(),
            title: params.title,
            content: params.content,
            created_at: now,
            updated_at: now,
        };
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn update_note(
        &self,
        params: UpdateNoteParams,
    ) -> Result<Option<NoteRecord>, RepoError> {
        self.check()?;
        if let Some(barrier) = self.update_barrier.as_ref() {
            barrier.wait().await;
        }

        let mut state = self.state.lock().await;
        if state
            .notes
            .iter()
            .any(|note| note.title == params.title && note.id != params.id)
        {
            return Err(RepoError::Duplicate {
                constraint: "notes_title_key".to_string(),
            });
        }
        let now = state.next_timestamp();
        let Some(note) = state.notes.iter_mut().find(|note| note.id == params.id) else {
            return Ok(None);
        };
        note.title = params.title;
        note.content = params.content;
        note.updated_at = now;
        Ok(Some(note.clone()))
    }

    async fn delete_note(&self, id: Uuid) -> Result<Option<NoteRecord>, RepoError> {
        self.check()?;
        let mut state = self.state.lock().await;
        let index = state.notes.iter().position(|note| note.id == id);
        Ok(index.map(|index| state.notes.remove(index)))
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.check()
    }
}

/// Cache backend that is never reachable.
pub struct UnreachableCache;

#[async_trait]
impl CacheBackend for UnreachableCache {
    async fn load(&self) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn store(&self, _payload: String, _ttl: StdDuration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

pub const TTL: StdDuration = StdDuration::from_secs(60);

pub fn cache() -> AggregateCache {
    AggregateCache::in_memory(&CacheConfig { ttl: TTL })
}

pub fn service(store: Arc<InMemoryNotesRepo>) -> NoteService {
    NoteService::new(store, cache())
}
