//! Wire shapes of the notes API.

use serde::{Deserialize, Serialize};

use crate::domain::entities::NoteRecord;

/// Body of create and update requests. Absent or `null` fields read as empty.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct NoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl NoteRequest {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NoteEnvelope {
    pub message: String,
    pub note: NoteRecord,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// `getAllNotes` answers with a bare list from the cache and a tagged object
/// from the store.
#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NoteListResponse {
    Cached(Vec<NoteRecord>),
    Stored { msg: String, data: Vec<NoteRecord> },
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
