//! HTTP binding of the sync endpoint.
//!
//! | Method | Query | Result |
//! |--------|-------|--------|
//! | `GET` | none | `200` JSON fingerprint map |
//! | `GET` | `filename=<name>` | `200` plain text, `404` if absent |
//! | `POST` | none | `200` JSON `{"synced": ...}` |
//!
//! A bad key is `401`, a malformed name or body `400`, an oversized
//! document `413`, and a storage failure `500`. Other methods get `405`.

use crate::error::{ServerError, ServerResult};
use crate::handler::RequestHandler;
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{DefaultBodyLimit, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use hsync_protocol::{FetchQuery, ReconcileRequest, KEY_HEADER, SYNC_PATH};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Builds the router serving [`SYNC_PATH`].
pub fn router(handler: Arc<RequestHandler>) -> Router {
    let body_limit = handler.config().max_body_bytes();

    Router::new()
        .route(SYNC_PATH, get(get_sync).post(post_sync))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(handler)
}

async fn get_sync(
    State(handler): State<Arc<RequestHandler>>,
    headers: HeaderMap,
    query: Result<Query<FetchQuery>, QueryRejection>,
) -> ServerResult<Response> {
    let key = presented_key(&headers);

    handler.authenticate(key.as_deref())?;
    let Query(query) = query.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;

    match query.filename.filter(|name| !name.is_empty()) {
        Some(name) => {
            let content = blocking(move || handler.handle_fetch(key.as_deref(), &name)).await?;
            Ok((
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                content,
            )
                .into_response())
        }
        None => {
            let map = blocking(move || handler.handle_list(key.as_deref())).await?;
            Ok(Json(map).into_response())
        }
    }
}

async fn post_sync(
    State(handler): State<Arc<RequestHandler>>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let key = presented_key(&headers);

    // Authenticate before reporting anything about the body.
    handler.authenticate(key.as_deref())?;

    let request = ReconcileRequest::decode(&body)
        .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;

    let response = blocking(move || handler.handle_reconcile(key.as_deref(), request)).await?;
    Ok(Json(response).into_response())
}

fn presented_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Runs a store-touching handler on the blocking pool.
async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> ServerResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(format!("handler task failed: {e}")))?
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Storage(_) | ServerError::Internal(_) | ServerError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_server_error() {
            error!(error = %self, "request failed");
        }

        // 401 and 404 bodies stay generic; the rest echo the reason.
        let body = match &self {
            ServerError::AuthenticationFailed(_) => "unauthorized".to_string(),
            ServerError::NotFound(_) => "not found".to_string(),
            other => other.to_string(),
        };
        (status, body).into_response()
    }
}
