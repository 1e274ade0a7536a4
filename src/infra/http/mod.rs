pub mod error;
pub mod middleware;
pub mod models;
mod notes;

pub use error::ApiError;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};

use crate::application::{error::ErrorReport, notes::NoteService, repos::RepoError};

use middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub notes: Arc<NoteService>,
}

pub fn build_router(state: HttpState) -> Router {
    let notes_routes = Router::new()
        .route("/createnote", post(notes::create_note))
        .route("/getNoteById/{id}", get(notes::get_note_by_id))
        .route("/getAllNotes", get(notes::get_all_notes))
        .route("/updateNotes/{id}", put(notes::update_note))
        .route("/deleteNotes/{id}", delete(notes::delete_note));

    Router::new()
        .nest("/api", notes_routes)
        .route("/_health/db", get(db_health))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn db_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.notes.store_health().await)
}

fn db_health_response(result: Result<(), RepoError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
