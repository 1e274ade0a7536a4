//! Notes handlers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::application::notes::{NoteServiceError, NoteSource};

use super::HttpState;
use super::error::ApiError;
use super::models::{MessageResponse, NoteEnvelope, NoteListResponse, NoteRequest};

const SOURCE: &str = "infra::http::notes";
const STORE_MARKER: &str = "database";

pub async fn create_note(
    State(state): State<HttpState>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(body_rejection)?;

    let note = state
        .notes
        .create(payload.title(), payload.content())
        .await
        .map_err(|err| service_error(err, "Failed to create note"))?;

    Ok((
        StatusCode::CREATED,
        Json(NoteEnvelope {
            message: "Note created successfully".to_string(),
            note,
        }),
    ))
}

pub async fn get_note_by_id(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_note_id(&id)?;

    let note = state
        .notes
        .get_by_id(id)
        .await
        .map_err(|err| service_error(err, "Failed to retrieve note"))?;

    Ok(Json(note))
}

pub async fn get_all_notes(State(state): State<HttpState>) -> Result<impl IntoResponse, ApiError> {
    let listing = state
        .notes
        .get_all()
        .await
        .map_err(|err| service_error(err, "Failed to retrieve notes"))?;

    let body = match listing.source {
        NoteSource::Cache => NoteListResponse::Cached(listing.notes),
        NoteSource::Store => NoteListResponse::Stored {
            msg: STORE_MARKER.to_string(),
            data: listing.notes,
        },
    };

    Ok(Json(body))
}

pub async fn update_note(
    State(state): State<HttpState>,
    Path(id): Path<String>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_note_id(&id)?;
    let Json(payload) = payload.map_err(body_rejection)?;

    let updated = state
        .notes
        .update_by_id(id, payload.title(), payload.content())
        .await
        .map_err(|err| service_error(err, "Failed to update note"))?;

    let message = match updated.source {
        NoteSource::Cache => "Note updated successfully in cache and database",
        NoteSource::Store => "Note updated successfully in database, cache refreshed",
    };

    Ok(Json(NoteEnvelope {
        message: message.to_string(),
        note: updated.note,
    }))
}

pub async fn delete_note(
    State(state): State<HttpState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_note_id(&id)?;

    state
        .notes
        .delete_by_id(id)
        .await
        .map_err(|err| service_error(err, "Failed to delete note"))?;

    Ok(Json(MessageResponse {
        message: "Note deleted successfully".to_string(),
    }))
}

/// Anything that is not a UUID cannot name a stored note.
fn parse_note_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|err| {
        ApiError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Note not found",
            format!("`{raw}` is not a note id: {err}"),
        )
    })
}

fn body_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::new(
        SOURCE,
        StatusCode::BAD_REQUEST,
        "Title and content are required",
        rejection.body_text(),
    )
}

fn service_error(err: NoteServiceError, failure: &'static str) -> ApiError {
    let (status, message) = match &err {
        NoteServiceError::Validation(_) => {
            (StatusCode::BAD_REQUEST, "Title and content are required")
        }
        NoteServiceError::Conflict { .. } => (
            StatusCode::BAD_REQUEST,
            "A note with this title already exists",
        ),
        NoteServiceError::NotFound => (StatusCode::NOT_FOUND, "Note not found"),
        NoteServiceError::Repo(_) | NoteServiceError::Cache(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, failure)
        }
    };

    ApiError::from_error(SOURCE, status, message, &err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::RepoError;
    use crate::cache::CacheError;
    use crate::domain::error::DomainError;

    #[test]
    fn validation_and_conflict_are_bad_requests() {
        let validation = service_error(
            NoteServiceError::Validation(DomainError::validation("missing")),
            "Failed to create note",
        );
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let conflict = service_error(
            NoteServiceError::Conflict {
                title: "A".to_string(),
            },
            "Failed to create note",
        );
        assert_eq!(conflict.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn collaborator_failures_are_server_errors() {
        let repo = service_error(
            NoteServiceError::Repo(RepoError::Timeout),
            "Failed to update note",
        );
        assert_eq!(repo.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let cache = service_error(
            NoteServiceError::Cache(CacheError::Unavailable("refused".to_string())),
            "Failed to update note",
        );
        assert_eq!(cache.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_ids_read_as_not_found() {
        let err = parse_note_id("not-a-uuid").expect_err("invalid id");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
