//! Protocol — inbound requests and outbound change messages.
//!
//! ARCHITECTURE
//! ============
//! Clients submit exactly one `Request` per call, over the websocket or the
//! plain HTTP endpoint. Every accepted state change is fanned out to all
//! connections of the whiteboard as a `ChangeMessage`, an envelope of the
//! form `{type, ...payload}`.
//!
//! DESIGN
//! ======
//! - Element and background payloads stay raw `Value`s on the way in, so a
//!   malformed record surfaces as a typed session error rather than a
//!   generic parse failure, and the accepted record is echoed as submitted.
//! - `initWhiteboard`, `saved` and `error` go to the requesting connection
//!   only; every other message is a broadcast.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::background::Background;
use crate::element::{Element, ElementId};

// =============================================================================
// INBOUND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    /// Create or edit one element.
    EditedElement { element: Value },
    Undo,
    EraseAll,
    Save,
    ClipArt,
    DocList,
    DocComponents {
        #[serde(rename = "docBaseName")]
        doc_base_name: String,
    },
    Background { background: Value },
}

impl Request {
    /// Short label for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::EditedElement { .. } => "editedElement",
            Self::Undo => "undo",
            Self::EraseAll => "eraseAll",
            Self::Save => "save",
            Self::ClipArt => "clipArt",
            Self::DocList => "docList",
            Self::DocComponents { .. } => "docComponents",
            Self::Background { .. } => "background",
        }
    }
}

// =============================================================================
// OUTBOUND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChangeMessage {
    /// An accepted element record, exactly as submitted.
    AddElement { json: Value },
    /// The new or reverted background; `{}` when the background was removed.
    AddBackground { json: Value },
    UndoList {
        #[serde(rename = "changeList")]
        change_list: Vec<Element>,
        /// Comma-joined ids, empty when nothing was deleted.
        #[serde(rename = "deleteList")]
        delete_list: String,
    },
    /// Always an empty list: clear everything.
    EraseElements { json: Vec<Value> },
    ClipArtList { json: Vec<String> },
    DocumentList { json: Vec<String> },
    DocumentComponentList { json: Vec<String> },
    /// Current content for a connection that just joined.
    InitWhiteboard { elements: Vec<Element>, background: Option<Background> },
    Saved { ok: bool, file: Option<String> },
    Error { code: String, message: String },
}

impl ChangeMessage {
    #[must_use]
    pub fn add_background(background: Option<&Background>) -> Self {
        let json = match background {
            Some(background) => serde_json::to_value(background).unwrap_or_default(),
            None => Value::Object(serde_json::Map::new()),
        };
        Self::AddBackground { json }
    }

    #[must_use]
    pub fn undo_list(change_list: Vec<Element>, deleted: &[ElementId]) -> Self {
        let delete_list = deleted
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Self::UndoList { change_list, delete_list }
    }

    #[must_use]
    pub fn erase_elements() -> Self {
        Self::EraseElements { json: Vec::new() }
    }

    /// Structured error reply from a typed error.
    #[must_use]
    pub fn error_from(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self::Error { code: err.error_code().to_owned(), message: err.to_string() }
    }

    /// Wire name of the `type` tag, for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddElement { .. } => "addElement",
            Self::AddBackground { .. } => "addBackground",
            Self::UndoList { .. } => "undoList",
            Self::EraseElements { .. } => "eraseElements",
            Self::ClipArtList { .. } => "clipArtList",
            Self::DocumentList { .. } => "documentList",
            Self::DocumentComponentList { .. } => "documentComponentList",
            Self::InitWhiteboard { .. } => "initWhiteboard",
            Self::Saved { .. } => "saved",
            Self::Error { .. } => "error",
        }
    }
}

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code for structured error replies.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// TESTS
// =============================================================================
