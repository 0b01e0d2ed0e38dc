//! Whiteboard HTTP routes — request submission and session close.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use tracing::{info, warn};

use crate::protocol::{ChangeMessage, ErrorCode};
use crate::services::whiteboard::{self, Outcome};
use crate::state::AppState;

/// `POST /api/whiteboard/{id}` — apply one request without a websocket.
/// Changes still fan out to every websocket bound to `{id}`.
pub async fn submit(State(state): State<AppState>, Path(id): Path<String>, body: String) -> Response {
    let session = state.sessions.get_or_create(&id, None).await;

    let result = match whiteboard::parse_request(&body) {
        Ok(request) => whiteboard::handle_request(&state, &session, request).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(Outcome::Done) => Json(json!({"ok": true})).into_response(),
        Ok(Outcome::Reply(message)) => Json(message).into_response(),
        Err(e) => {
            warn!(whiteboard_id = %id, code = e.error_code(), error = %e, "http: rejected request");
            (StatusCode::BAD_REQUEST, Json(ChangeMessage::error_from(&e))).into_response()
        }
    }
}

/// `DELETE /api/whiteboard/{id}` — close the session and drop its clients.
pub async fn close(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    if !state.sessions.close(&id).await {
        return StatusCode::NOT_FOUND;
    }
    let open = state.sessions.session_count().await;
    info!(whiteboard_id = %id, open, "http: whiteboard closed");
    StatusCode::NO_CONTENT
}

#[cfg(test)]
#[path = "whiteboards_test.rs"]
mod tests;
