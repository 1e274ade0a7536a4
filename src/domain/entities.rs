//! Domain entities mirrored from persistent storage.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A note as persisted by the store and snapshotted into the aggregate cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl NoteRecord {
    /// Overwrite the editable fields in place, leaving identity and timestamps untouched.
    pub fn merge_edit(&mut self, title: &str, content: &str) {
        self.title = title.to_string();
        self.content = content.to_string();
    }
}
