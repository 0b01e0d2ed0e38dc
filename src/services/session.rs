//! Session service — the authoritative state of one whiteboard.
//!
//! DESIGN
//! ======
//! `SessionState` owns the live element store, the loaded baseline, the
//! background, the undo history, the asset caches and the connected clients.
//! Its methods are synchronous and hold the edit-acceptance rules.
//!
//! `Session` wraps the state in one mutex and exposes only whole operations
//! (submit an edit, undo, erase, ...). Each operation mutates and fans out
//! under the same lock, so every connection observes changes in the order
//! they were applied and never sees half of a batch.
//!
//! COALESCING
//! ==========
//! - A `PencilCurve` resubmitted under the id that ends the newest batch
//!   extends that batch, so one stroke undoes as one action.
//! - A created `ClipArt` absorbs the batch right before it (the label the
//!   client creates while placing it). This trusts client submission order;
//!   nothing ties the two by id.
//! - `PointFree` is presence data and is never recorded.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::background::Background;
use crate::element::{Element, ElementId};
use crate::protocol::ChangeMessage;
use crate::services::assets::{self, DocumentGroups};
use crate::services::persistence::SavedWhiteboard;
use crate::undo::{UndoBatch, UndoEntry, UndoHistory};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("malformed element edit: {0}")]
    MalformedEdit(#[source] serde_json::Error),
    #[error("malformed background: {0}")]
    MalformedBackground(#[source] serde_json::Error),
}

impl crate::protocol::ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MalformedEdit(_) => "E_MALFORMED_EDIT",
            Self::MalformedBackground(_) => "E_MALFORMED_BACKGROUND",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Identical to the loaded baseline; nothing changed.
    Duplicate,
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UndoOutcome {
    Nothing,
    /// Net effect of reverting one element batch.
    Elements { restored: Vec<Element>, deleted: Vec<ElementId> },
    /// The background now in effect.
    Background(Option<Background>),
}

// =============================================================================
// SESSION STATE
// =============================================================================

pub struct SessionState {
    elements: BTreeMap<ElementId, Element>,
    /// Content restored from a save at creation. Only pruned by undo.
    loaded: BTreeMap<ElementId, Element>,
    /// Cleared for good once any loaded element is undone away.
    baseline_active: bool,
    background: Option<Background>,
    history: UndoHistory,
    clip_art_urls: Vec<String>,
    document_groups: DocumentGroups,
    clients: HashMap<Uuid, mpsc::Sender<ChangeMessage>>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: BTreeMap::new(),
            loaded: BTreeMap::new(),
            baseline_active: false,
            background: None,
            history: UndoHistory::new(),
            clip_art_urls: Vec::new(),
            document_groups: DocumentGroups::new(),
            clients: HashMap::new(),
        }
    }

    /// Build state from saved content. The whole load undoes as one creation
    /// batch; a loaded background undoes (to none) before it.
    #[must_use]
    pub fn hydrate(content: SavedWhiteboard) -> Self {
        let mut state = Self::new();

        let mut batch = UndoBatch::new();
        for element in content.elements {
            state.loaded.insert(element.id, element.clone());
            state.elements.insert(element.id, element.clone());
            batch.record_creation(element);
        }
        state.baseline_active = !state.loaded.is_empty();
        if !batch.is_empty() {
            state.history.push_elements(batch);
        }

        if let Some(background) = content.background {
            state.background = Some(background);
            state.history.push_background(None);
        }

        state
    }

    // -------------------------------------------------------------------------
    // Edits
    // -------------------------------------------------------------------------

    /// Accept one element edit: dedupe against the baseline, record undo,
    /// then store it (last write wins per id).
    pub fn apply_edit(&mut self, element: Element) -> EditOutcome {
        if self.is_loaded_duplicate(&element) {
            return EditOutcome::Duplicate;
        }

        let previous = self.elements.get(&element.id).cloned();
        let created = previous.is_none();

        if !element.shape.is_presence_marker() {
            let mut batch = UndoBatch::new();
            match previous {
                Some(previous) => batch.record_edit(previous),
                None => batch.record_creation(element.clone()),
            }
            self.record_batch(&element, created, batch);
        }

        self.elements.insert(element.id, element);
        if created { EditOutcome::Created } else { EditOutcome::Updated }
    }

    fn is_loaded_duplicate(&self, element: &Element) -> bool {
        self.baseline_active && !self.elements.is_empty() && self.loaded.get(&element.id) == Some(element)
    }

    fn record_batch(&mut self, element: &Element, created: bool, batch: UndoBatch) {
        if element.shape.is_stroke() {
            if let Some(open) = self.history.last_batch_mut()
                && open
                    .last()
                    .is_some_and(|tail| tail.snapshot.id == element.id && tail.snapshot.shape.is_stroke())
            {
                open.extend(batch);
                return;
            }
        } else if element.shape.is_clip_art() && created {
            if let Some(mut placement) = self.history.take_last_batch() {
                placement.extend(batch);
                self.history.push_elements(placement);
                return;
            }
        }
        self.history.push_elements(batch);
    }

    /// Replace the background, remembering the previous one for undo.
    pub fn apply_background(&mut self, background: Background) {
        let previous = self.background.replace(background);
        self.history.push_background(previous);
    }

    /// Clear all elements. Not undoable: the history is left as it was.
    pub fn erase_all(&mut self) {
        self.elements.clear();
    }

    // -------------------------------------------------------------------------
    // Undo
    // -------------------------------------------------------------------------

    pub fn undo(&mut self) -> UndoOutcome {
        match self.history.pop_last() {
            None => UndoOutcome::Nothing,
            Some(UndoEntry::Elements(batch)) => self.revert_batch(batch),
            Some(UndoEntry::Background(previous)) => {
                self.background.clone_from(&previous);
                UndoOutcome::Background(previous)
            }
        }
    }

    /// Revert newest change first so repeated edits of one id unwind to the
    /// value before the batch, and a creation inside the batch wins.
    fn revert_batch(&mut self, batch: UndoBatch) -> UndoOutcome {
        let mut touched: Vec<ElementId> = Vec::new();
        for change in batch.changes() {
            if !touched.contains(&change.snapshot.id) {
                touched.push(change.snapshot.id);
            }
        }

        for change in batch.into_changes().into_iter().rev() {
            let id = change.snapshot.id;
            if change.created {
                self.elements.remove(&id);
                if self.loaded.remove(&id).is_some() {
                    self.baseline_active = false;
                }
            } else {
                self.elements.insert(id, change.snapshot);
            }
        }

        let mut restored = Vec::new();
        let mut deleted = Vec::new();
        for id in touched {
            match self.elements.get(&id) {
                Some(element) => restored.push(element.clone()),
                None => deleted.push(id),
            }
        }
        UndoOutcome::Elements { restored, deleted }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Elements ordered by id, plus the background.
    #[must_use]
    pub fn snapshot(&self) -> SavedWhiteboard {
        SavedWhiteboard { elements: self.elements.values().cloned().collect(), background: self.background.clone() }
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_baseline_active(&self) -> bool {
        self.baseline_active
    }

    // -------------------------------------------------------------------------
    // Clients
    // -------------------------------------------------------------------------

    /// Best-effort delivery to every connected client. A full or closed
    /// channel only loses this message for that client.
    pub fn broadcast(&self, message: &ChangeMessage) {
        for (client_id, tx) in &self.clients {
            if let Err(e) = tx.try_send(message.clone()) {
                warn!(%client_id, kind = message.kind(), error = %e, "dropped change message");
            }
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// One whiteboard, shared by every connection bound to its id.
pub struct Session {
    id: String,
    state: Mutex<SessionState>,
}

impl Session {
    #[must_use]
    pub fn new(id: impl Into<String>, state: SessionState) -> Self {
        Self { id: id.into(), state: Mutex::new(state) }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Parse and accept one element edit, then fan it out as submitted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MalformedEdit` if the record is not a known
    /// element; nothing is mutated or broadcast in that case.
    pub async fn submit_edit(&self, raw: &Value) -> Result<EditOutcome, SessionError> {
        let element = Element::deserialize(raw).map_err(SessionError::MalformedEdit)?;
        let (id, kind) = (element.id, element.kind());

        let mut state = self.state.lock().await;
        let outcome = state.apply_edit(element);
        if outcome == EditOutcome::Duplicate {
            debug!(whiteboard_id = %self.id, id, kind, "ignored edit identical to loaded content");
        } else {
            state.broadcast(&ChangeMessage::AddElement { json: raw.clone() });
        }
        Ok(outcome)
    }

    /// Parse and apply a background change, then fan it out as submitted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::MalformedBackground` if the record does not parse.
    pub async fn submit_background(&self, raw: &Value) -> Result<(), SessionError> {
        let background = Background::deserialize(raw).map_err(SessionError::MalformedBackground)?;

        let mut state = self.state.lock().await;
        state.apply_background(background);
        state.broadcast(&ChangeMessage::AddBackground { json: raw.clone() });
        Ok(())
    }

    /// Undo the most recent action and fan out its inverse.
    pub async fn undo(&self) -> UndoOutcome {
        let mut state = self.state.lock().await;
        let outcome = state.undo();
        match &outcome {
            UndoOutcome::Nothing => {}
            UndoOutcome::Elements { restored, deleted } => {
                state.broadcast(&ChangeMessage::undo_list(restored.clone(), deleted));
            }
            UndoOutcome::Background(background) => {
                state.broadcast(&ChangeMessage::add_background(background.as_ref()));
            }
        }
        outcome
    }

    pub async fn erase_all(&self) {
        let mut state = self.state.lock().await;
        state.erase_all();
        state.broadcast(&ChangeMessage::erase_elements());
    }

    pub async fn snapshot(&self) -> SavedWhiteboard {
        self.state.lock().await.snapshot()
    }

    /// Register a client and return the content it should start from.
    /// Registration and snapshot happen under one lock, so the client misses
    /// no change and sees none twice.
    pub async fn join(&self, client_id: Uuid, tx: mpsc::Sender<ChangeMessage>) -> ChangeMessage {
        let mut state = self.state.lock().await;
        state.clients.insert(client_id, tx);
        let snapshot = state.snapshot();
        ChangeMessage::InitWhiteboard { elements: snapshot.elements, background: snapshot.background }
    }

    /// Remove a client. Returns the number still connected.
    pub async fn part(&self, client_id: Uuid) -> usize {
        let mut state = self.state.lock().await;
        state.clients.remove(&client_id);
        state.clients.len()
    }

    /// Drop every client sender, ending their connection loops.
    pub async fn disconnect_all(&self) {
        self.state.lock().await.clients.clear();
    }

    // -------------------------------------------------------------------------
    // Asset listings
    // -------------------------------------------------------------------------

    pub async fn publish_clip_arts(&self, urls: Vec<String>) {
        let mut state = self.state.lock().await;
        state.clip_art_urls = urls;
        let message = ChangeMessage::ClipArtList { json: state.clip_art_urls.clone() };
        state.broadcast(&message);
    }

    pub async fn publish_documents(&self, groups: DocumentGroups) {
        let mut state = self.state.lock().await;
        state.document_groups = groups;
        let message = ChangeMessage::DocumentList { json: assets::document_list(&state.document_groups) };
        state.broadcast(&message);
    }

    /// Cache `groups` and fan out the pages of `document`; an unknown
    /// document lists as empty.
    pub async fn publish_document_components(&self, groups: DocumentGroups, document: &str) {
        let mut state = self.state.lock().await;
        state.document_groups = groups;
        let pages = state
            .document_groups
            .get(document)
            .cloned()
            .unwrap_or_default();
        state.broadcast(&ChangeMessage::DocumentComponentList { json: pages });
    }

    /// Run a read against the current state.
    pub async fn inspect<R>(&self, read: impl FnOnce(&SessionState) -> R) -> R {
        let state = self.state.lock().await;
        read(&state)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
