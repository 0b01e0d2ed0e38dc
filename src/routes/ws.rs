//! WebSocket handler — one connection bound to one whiteboard.
//!
//! DESIGN
//! ======
//! On upgrade the connection joins session `{id}` and enters a `select!` loop:
//! - Incoming text frames → parse one `Request` → dispatch to the session
//! - Change messages fanned out by the session → forward to the client
//!
//! Replies meant for the sender alone (`saved`, `error`) are written straight
//! to the socket; everything else arrives through the session fan-out, the
//! sender's own edits included.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → join session → send `initWhiteboard`
//! 2. Client sends requests → dispatch → optional direct reply
//! 3. Close, socket error, or session closed → part session

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::protocol::{ChangeMessage, ErrorCode};
use crate::services::persistence::{self, PersistError};
use crate::services::session::Session;
use crate::services::whiteboard::{self, Outcome};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Saved file to hydrate from when this connection creates the session.
    pub load: Option<String>,
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let session = match open_session(&state, &id, params.load.as_deref()).await {
        Ok(session) => session,
        Err(e) => {
            warn!(whiteboard_id = %id, error = %e, "ws: rejected load");
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    ws.on_upgrade(move |socket| run_ws(socket, state, session))
}

/// Find or create the session for `id`. Saved content is only read when the
/// session does not exist yet; an unreadable file starts it empty.
pub(crate) async fn open_session(state: &AppState, id: &str, load: Option<&str>) -> Result<Arc<Session>, PersistError> {
    if let Some(session) = state.sessions.get(id).await {
        return Ok(session);
    }

    let content = match load {
        None => None,
        Some(name) => match persistence::load_from_dir(&state.config.save_dir, name).await {
            Ok(content) => Some(content),
            Err(e @ PersistError::InvalidName(_)) => return Err(e),
            Err(e) => {
                warn!(whiteboard_id = %id, file = name, error = %e, "ws: saved whiteboard unreadable; starting empty");
                None
            }
        },
    };

    Ok(state.sessions.get_or_create(id, content.as_deref()).await)
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState, session: Arc<Session>) {
    let client_id = Uuid::new_v4();

    let (client_tx, mut client_rx) = mpsc::channel::<ChangeMessage>(state.config.client_channel_capacity);

    let init = session.join(client_id, client_tx).await;
    info!(%client_id, whiteboard_id = %session.id(), "ws: client joined");
    if send_message(&mut socket, &init).await.is_err() {
        session.part(client_id).await;
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        if let Some(reply) = process_inbound_text(&state, &session, client_id, &text).await {
                            if send_message(&mut socket, &reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            message = client_rx.recv() => {
                // Sender dropped: the session was closed.
                let Some(message) = message else { break };
                if send_message(&mut socket, &message).await.is_err() {
                    break;
                }
            }
        }
    }

    let remaining = session.part(client_id).await;
    info!(%client_id, whiteboard_id = %session.id(), remaining, "ws: client left");
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Handle one inbound text frame and return the message for the sender, if any.
///
/// Kept apart from the socket so tests can drive dispatch directly.
pub(crate) async fn process_inbound_text(
    state: &AppState,
    session: &Session,
    client_id: Uuid,
    text: &str,
) -> Option<ChangeMessage> {
    let result = match whiteboard::parse_request(text) {
        Ok(request) => {
            let name = request.name();
            let result = whiteboard::handle_request(state, session, request).await;
            if result.is_ok() && name != "editedElement" {
                info!(%client_id, whiteboard_id = %session.id(), request = name, "ws: handled request");
            }
            result
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(Outcome::Done) => None,
        Ok(Outcome::Reply(message)) => Some(message),
        Err(e) => {
            warn!(%client_id, whiteboard_id = %session.id(), code = e.error_code(), error = %e, "ws: rejected request");
            Some(ChangeMessage::error_from(&e))
        }
    }
}

async fn send_message(socket: &mut WebSocket, message: &ChangeMessage) -> Result<(), ()> {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, kind = message.kind(), "ws: failed to serialize message");
            return Err(());
        }
    };
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
