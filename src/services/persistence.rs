//! Persistence service — saved-whiteboard files.
//!
//! DESIGN
//! ======
//! A save is one JSON object: `elements` (ordered by id) plus an optional
//! `background`. The same shape is accepted when hydrating a new session, so
//! whatever `save_to_dir` writes, `parse_saved` reads back unchanged.
//!
//! ERROR HANDLING
//! ==============
//! Saves are best-effort single-file writes. A failure is reported to the
//! caller and never touches in-memory state. Hydration is lenient: a record
//! with an unknown `type` is logged and skipped instead of failing the load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::warn;

use crate::background::Background;
use crate::element::Element;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("save i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("saved content is not valid json: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid save file name: {0}")]
    InvalidName(String),
}

impl crate::protocol::ErrorCode for PersistError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) | Self::Serialize(_) => "E_PERSIST_IO",
            Self::InvalidName(_) => "E_PERSIST_NAME",
        }
    }
}

/// Persisted whiteboard content. Also the hydration input format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedWhiteboard {
    pub elements: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,
}

/// Loosely-typed view used while hydrating, so one bad record can be skipped.
#[derive(Deserialize)]
struct RawSavedWhiteboard {
    #[serde(default)]
    elements: Vec<Value>,
    #[serde(default)]
    background: Option<Value>,
}

// =============================================================================
// PARSE
// =============================================================================

/// Parse saved content, skipping element records that do not parse.
///
/// # Errors
///
/// Returns `PersistError::Serialize` when the document itself is not a save object.
pub fn parse_saved(content: &str) -> Result<SavedWhiteboard, PersistError> {
    let raw: RawSavedWhiteboard = serde_json::from_str(content)?;

    let mut elements = Vec::with_capacity(raw.elements.len());
    for record in &raw.elements {
        match Element::deserialize(record) {
            Ok(element) => elements.push(element),
            Err(e) => {
                let kind = record.get("type").and_then(Value::as_str).unwrap_or("-");
                warn!(error = %e, kind, "skipping unreadable saved element");
            }
        }
    }

    let background = match raw.background {
        Some(Value::Null) | None => None,
        Some(record) => match Background::deserialize(&record) {
            Ok(background) => Some(background),
            Err(e) => {
                warn!(error = %e, "skipping unreadable saved background");
                None
            }
        },
    };

    Ok(SavedWhiteboard { elements, background })
}

// =============================================================================
// FILES
// =============================================================================

/// `Whiteboard_yyyy_MM_dd_HH_mm_ss.json` for the given instant.
#[must_use]
pub fn save_file_name(at: OffsetDateTime) -> String {
    format!(
        "Whiteboard_{:04}_{:02}_{:02}_{:02}_{:02}_{:02}.json",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Write a timestamped snapshot into `dir`, creating it if needed.
///
/// # Errors
///
/// Returns `PersistError::Io` if the folder or file cannot be written.
pub async fn save_to_dir(dir: &Path, snapshot: &SavedWhiteboard) -> Result<PathBuf, PersistError> {
    let body = serde_json::to_vec(snapshot)?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(save_file_name(OffsetDateTime::now_utc()));
    tokio::fs::write(&path, body).await?;
    Ok(path)
}

/// Read a previously saved file from `dir` by bare file name.
///
/// # Errors
///
/// Returns `PersistError::InvalidName` for names that would leave `dir`, or
/// `PersistError::Io` if the file cannot be read.
pub async fn load_from_dir(dir: &Path, name: &str) -> Result<String, PersistError> {
    let is_bare = Path::new(name)
        .file_name()
        .is_some_and(|file_name| file_name == name);
    if !is_bare {
        return Err(PersistError::InvalidName(name.to_owned()));
    }
    Ok(tokio::fs::read_to_string(dir.join(name)).await?)
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
