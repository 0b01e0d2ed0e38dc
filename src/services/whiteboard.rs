//! Whiteboard service — request dispatch for one session.
//!
//! DESIGN
//! ======
//! Transports parse one `Request` and hand it here together with the bound
//! session. Every state change is fanned out by the session itself; the
//! returned `Outcome` only says what, if anything, goes back to the caller.

use tracing::{error, info};

use crate::protocol::{ChangeMessage, ErrorCode, Request};
use crate::services::persistence;
use crate::services::session::{Session, SessionError};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("malformed request: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ErrorCode for RequestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "E_MALFORMED_REQUEST",
            Self::Session(e) => e.error_code(),
        }
    }
}

/// What the caller receives after a request. Broadcasts are not included.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Done,
    Reply(ChangeMessage),
}

/// Parse one inbound request body.
///
/// # Errors
///
/// Returns `RequestError::Malformed` for invalid json or an unknown `type`.
pub fn parse_request(text: &str) -> Result<Request, RequestError> {
    Ok(serde_json::from_str(text)?)
}

/// Apply one request to `session`.
///
/// # Errors
///
/// Returns `RequestError::Session` when an element or background payload is
/// malformed. A failed save is not an error: it replies `saved` with `ok: false`.
pub async fn handle_request(state: &AppState, session: &Session, request: Request) -> Result<Outcome, RequestError> {
    match request {
        Request::EditedElement { element } => {
            session.submit_edit(&element).await?;
            Ok(Outcome::Done)
        }
        Request::Background { background } => {
            session.submit_background(&background).await?;
            Ok(Outcome::Done)
        }
        Request::Undo => {
            session.undo().await;
            Ok(Outcome::Done)
        }
        Request::EraseAll => {
            session.erase_all().await;
            Ok(Outcome::Done)
        }
        Request::Save => Ok(Outcome::Reply(save(state, session).await)),
        Request::ClipArt => {
            session.publish_clip_arts(state.assets.clip_arts().await).await;
            Ok(Outcome::Done)
        }
        Request::DocList => {
            session.publish_documents(state.assets.documents().await).await;
            Ok(Outcome::Done)
        }
        Request::DocComponents { doc_base_name } => {
            let groups = state.assets.documents().await;
            session.publish_document_components(groups, &doc_base_name).await;
            Ok(Outcome::Done)
        }
    }
}

async fn save(state: &AppState, session: &Session) -> ChangeMessage {
    let snapshot = session.snapshot().await;
    match persistence::save_to_dir(&state.config.save_dir, &snapshot).await {
        Ok(path) => {
            let file = path.file_name().map(|name| name.to_string_lossy().into_owned());
            info!(whiteboard_id = %session.id(), path = %path.display(), elements = snapshot.elements.len(), "whiteboard saved");
            ChangeMessage::Saved { ok: true, file }
        }
        Err(e) => {
            error!(whiteboard_id = %session.id(), error = %e, code = e.error_code(), "whiteboard save failed");
            ChangeMessage::Saved { ok: false, file: None }
        }
    }
}

#[cfg(test)]
#[path = "whiteboard_test.rs"]
mod tests;
