//! Validated note input.

use super::error::DomainError;

/// Title and content of a note about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    title: String,
    content: String,
}

impl NoteDraft {
    /// Both fields must be non-empty. Values are kept exactly as given, so
    /// whitespace is significant for title uniqueness.
    pub fn new(title: &str, content: &str) -> Result<Self, DomainError> {
        if title.is_empty() || content.is_empty() {
            return Err(DomainError::validation("title and content are required"));
        }

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}
