//! Undo history — bounded, chronologically ordered edit batches.
//!
//! DESIGN
//! ======
//! Element batches and background changes share one bounded sequence of
//! `UndoEntry` values, so the tail is always the most recent action no matter
//! which kind it was. A full history evicts its oldest entry on push; pushes
//! never fail and never wait.
//!
//! The history only records. Reverting an entry against the element store is
//! the session's job, because it owns the stores being reverted.

use std::collections::VecDeque;

use crate::background::Background;
use crate::element::Element;

/// Maximum number of undoable actions kept per whiteboard.
pub const UNDO_CAPACITY: usize = 20;

// =============================================================================
// BATCH
// =============================================================================

/// One element change inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoChange {
    /// For a creation, the created element. For an edit, the value before it.
    pub snapshot: Element,
    pub created: bool,
}

/// Element changes that undo together as a single user action, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UndoBatch {
    changes: Vec<UndoChange>,
}

impl UndoBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_creation(&mut self, created: Element) {
        self.changes.push(UndoChange { snapshot: created, created: true });
    }

    pub fn record_edit(&mut self, previous: Element) {
        self.changes.push(UndoChange { snapshot: previous, created: false });
    }

    /// Append another batch's changes after this batch's own.
    pub fn extend(&mut self, later: UndoBatch) {
        self.changes.extend(later.changes);
    }

    #[must_use]
    pub fn last(&self) -> Option<&UndoChange> {
        self.changes.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn changes(&self) -> impl Iterator<Item = &UndoChange> {
        self.changes.iter()
    }

    #[must_use]
    pub fn into_changes(self) -> Vec<UndoChange> {
        self.changes
    }
}

// =============================================================================
// HISTORY
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum UndoEntry {
    Elements(UndoBatch),
    /// The background in effect before the change; `None` means there was none.
    Background(Option<Background>),
}

#[derive(Debug, Clone)]
pub struct UndoHistory {
    entries: VecDeque<UndoEntry>,
    capacity: usize,
}

impl UndoHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(UNDO_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn push_elements(&mut self, batch: UndoBatch) {
        self.push(UndoEntry::Elements(batch));
    }

    pub fn push_background(&mut self, previous: Option<Background>) {
        self.push(UndoEntry::Background(previous));
    }

    fn push(&mut self, entry: UndoEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Remove and return the most recent entry.
    pub fn pop_last(&mut self) -> Option<UndoEntry> {
        self.entries.pop_back()
    }

    /// The most recent entry, if it is an element batch still open for coalescing.
    pub fn last_batch_mut(&mut self) -> Option<&mut UndoBatch> {
        match self.entries.back_mut() {
            Some(UndoEntry::Elements(batch)) => Some(batch),
            _ => None,
        }
    }

    /// Remove the most recent entry if it is an element batch.
    pub fn take_last_batch(&mut self) -> Option<UndoBatch> {
        if !matches!(self.entries.back(), Some(UndoEntry::Elements(_))) {
            return None;
        }
        match self.entries.pop_back() {
            Some(UndoEntry::Elements(batch)) => Some(batch),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "undo_test.rs"]
mod tests;
