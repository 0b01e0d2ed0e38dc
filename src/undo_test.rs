use super::*;
use crate::element::Shape;

fn segment(id: i64) -> Element {
    Element {
        id,
        label: String::new(),
        color: "black".into(),
        hidden: false,
        trace: false,
        shape: Shape::Segment { p1: 1, p2: 2 },
    }
}

fn creation_batch(id: i64) -> UndoBatch {
    let mut batch = UndoBatch::new();
    batch.record_creation(segment(id));
    batch
}

fn backdrop(url: &str) -> Background {
    Background { label: "Background".into(), url: url.into(), left: 0.0, top: 0.0, width: 100.0, height: 100.0 }
}

fn batch_id(entry: Option<UndoEntry>) -> i64 {
    match entry {
        Some(UndoEntry::Elements(batch)) => batch.last().expect("non-empty batch").snapshot.id,
        other => panic!("expected element batch, got {other:?}"),
    }
}

#[test]
fn empty_history_pops_nothing() {
    let mut history = UndoHistory::new();
    assert!(history.is_empty());
    assert!(history.pop_last().is_none());
}

#[test]
fn pop_returns_entries_newest_first() {
    let mut history = UndoHistory::new();
    history.push_elements(creation_batch(1));
    history.push_elements(creation_batch(2));

    assert_eq!(batch_id(history.pop_last()), 2);
    assert_eq!(batch_id(history.pop_last()), 1);
    assert!(history.pop_last().is_none());
}

#[test]
fn overflow_evicts_oldest_entry() {
    let mut history = UndoHistory::new();
    for id in 1..=25 {
        history.push_elements(creation_batch(id));
    }
    assert_eq!(history.len(), UNDO_CAPACITY);

    let mut popped = Vec::new();
    while let Some(entry) = history.pop_last() {
        popped.push(batch_id(Some(entry)));
    }
    assert_eq!(popped.len(), 20);
    assert_eq!(popped.first(), Some(&25));
    assert_eq!(popped.last(), Some(&6));
}

#[test]
fn background_and_element_entries_interleave_chronologically() {
    let mut history = UndoHistory::new();
    history.push_elements(creation_batch(1));
    history.push_background(None);
    history.push_elements(creation_batch(2));

    assert_eq!(batch_id(history.pop_last()), 2);
    assert_eq!(history.pop_last(), Some(UndoEntry::Background(None)));
    assert_eq!(batch_id(history.pop_last()), 1);
}

#[test]
fn background_entries_count_against_capacity() {
    let mut history = UndoHistory::with_capacity(3);
    history.push_elements(creation_batch(1));
    history.push_background(Some(backdrop("/a.jpg")));
    history.push_background(Some(backdrop("/b.jpg")));
    history.push_elements(creation_batch(2));

    assert_eq!(history.len(), 3);
    assert_eq!(batch_id(history.pop_last()), 2);
    assert_eq!(history.pop_last(), Some(UndoEntry::Background(Some(backdrop("/b.jpg")))));
    assert_eq!(history.pop_last(), Some(UndoEntry::Background(Some(backdrop("/a.jpg")))));
    assert!(history.pop_last().is_none());
}

#[test]
fn last_batch_mut_ignores_background_tail() {
    let mut history = UndoHistory::new();
    history.push_elements(creation_batch(1));
    history.push_background(None);
    assert!(history.last_batch_mut().is_none());
    assert!(history.take_last_batch().is_none());
    assert_eq!(history.len(), 2);
}

#[test]
fn last_batch_mut_extends_in_place() {
    let mut history = UndoHistory::new();
    history.push_elements(creation_batch(1));

    let open = history.last_batch_mut().expect("tail is a batch");
    let mut later = UndoBatch::new();
    later.record_edit(segment(1));
    open.extend(later);

    assert_eq!(history.len(), 1);
    let Some(UndoEntry::Elements(batch)) = history.pop_last() else {
        panic!("expected element batch");
    };
    assert_eq!(batch.len(), 2);
    let flags: Vec<bool> = batch.changes().map(|c| c.created).collect();
    assert_eq!(flags, vec![true, false]);
}

#[test]
fn take_last_batch_removes_tail() {
    let mut history = UndoHistory::new();
    history.push_elements(creation_batch(1));
    history.push_elements(creation_batch(2));

    let taken = history.take_last_batch().expect("tail is a batch");
    assert_eq!(taken.last().map(|c| c.snapshot.id), Some(2));
    assert_eq!(history.len(), 1);
}

#[test]
fn zero_capacity_history_records_nothing() {
    let mut history = UndoHistory::with_capacity(0);
    history.push_elements(creation_batch(1));
    assert!(history.is_empty());
}
