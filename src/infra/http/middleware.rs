use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

/// Per-request identity shared by the logging middleware and handlers.
#[derive(Clone)]
pub struct RequestContext {
    pub request_id: String,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext {
        request_id: Uuid::new_v4().to_string(),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(ctx);
    response
}

/// What is known about a request before it reaches the handler.
struct RequestSummary {
    method: String,
    path: String,
    query: Option<String>,
    route: Option<String>,
    note_id: Option<String>,
    request_id: String,
    started: Instant,
}

impl RequestSummary {
    fn capture(request: &Request<Body>) -> Self {
        let path = request.uri().path().to_string();
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(|matched| matched.as_str().to_string());
        let note_id = route
            .as_deref()
            .filter(|route| route.ends_with("/{id}"))
            .and_then(|_| path.rsplit('/').next())
            .map(str::to_string);

        Self {
            method: request.method().to_string(),
            query: request.uri().query().map(str::to_string),
            route,
            note_id,
            request_id: request
                .extensions()
                .get::<RequestContext>()
                .map(|ctx| ctx.request_id.clone())
                .unwrap_or_default(),
            started: Instant::now(),
            path,
        }
    }

    fn log_failure(&self, status: StatusCode, report: Option<ErrorReport>) {
        let (source, messages) = report
            .map(|report| (report.source, report.messages))
            .unwrap_or(("unknown", Vec::new()));
        let detail = messages
            .first()
            .map(String::as_str)
            .unwrap_or("no diagnostic available");
        let elapsed_ms = self.started.elapsed().as_millis();
        let route = self.route.as_deref().unwrap_or("-");
        let query = self.query.as_deref().unwrap_or("");
        let note_id = self.note_id.as_deref().unwrap_or("");

        if status.is_server_error() {
            error!(
                target = "notecache::http::response",
                status = status.as_u16(),
                method = %self.method,
                path = %self.path,
                route,
                query,
                note_id,
                elapsed_ms,
                source,
                detail,
                chain = ?messages,
                request_id = %self.request_id,
                "note request failed",
            );
        } else {
            warn!(
                target = "notecache::http::response",
                status = status.as_u16(),
                method = %self.method,
                path = %self.path,
                route,
                query,
                note_id,
                elapsed_ms,
                source,
                detail,
                chain = ?messages,
                request_id = %self.request_id,
                "note request rejected",
            );
        }
    }
}

/// Log every 4xx/5xx with the `ErrorReport` the handler attached, if any.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let summary = RequestSummary::capture(&request);

    let mut response = next.run(request).await;
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let report = response.extensions_mut().remove::<ErrorReport>();
        summary.log_failure(status, report);
    }

    response
}
