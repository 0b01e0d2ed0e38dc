use super::*;
use crate::element::Shape;
use serde_json::json;
use uuid::Uuid;

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("wb-persist-{}", Uuid::new_v4()))
}

fn sample() -> SavedWhiteboard {
    SavedWhiteboard {
        elements: vec![
            Element {
                id: 1,
                label: "A".into(),
                color: "#000".into(),
                hidden: false,
                trace: false,
                shape: Shape::PointFree { x: 10.0, y: 20.0 },
            },
            Element {
                id: 2,
                label: String::new(),
                color: "#00f".into(),
                hidden: true,
                trace: false,
                shape: Shape::Segment { p1: 1, p2: 3 },
            },
        ],
        background: Some(Background {
            label: "Background".into(),
            url: "/docs/intro.jpg".into(),
            left: 0.0,
            top: 0.0,
            width: 800.0,
            height: 600.0,
        }),
    }
}

// =============================================================================
// parse_saved
// =============================================================================

#[test]
fn parse_saved_reads_elements_and_background() {
    let content = serde_json::to_string(&sample()).unwrap();
    let parsed = parse_saved(&content).unwrap();
    assert_eq!(parsed, sample());
}

#[test]
fn parse_saved_without_background() {
    let parsed = parse_saved(r#"{"elements": []}"#).unwrap();
    assert!(parsed.elements.is_empty());
    assert!(parsed.background.is_none());
}

#[test]
fn parse_saved_skips_unknown_element_types() {
    let content = json!({
        "elements": [
            {"id": 1, "type": "Segment", "p1": 2, "p2": 3},
            {"id": 2, "type": "Hologram"},
            {"id": 3, "type": "PointFree", "x": 0.0, "y": 0.0}
        ]
    })
    .to_string();
    let parsed = parse_saved(&content).unwrap();
    let ids: Vec<i64> = parsed.elements.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn parse_saved_drops_malformed_background() {
    let content = json!({"elements": [], "background": {"url": "x"}}).to_string();
    let parsed = parse_saved(&content).unwrap();
    assert!(parsed.background.is_none());
}

#[test]
fn parse_saved_rejects_non_json() {
    assert!(matches!(parse_saved("not json").unwrap_err(), PersistError::Serialize(_)));
}

#[test]
fn serialized_save_omits_absent_background() {
    let value = serde_json::to_value(SavedWhiteboard::default()).unwrap();
    assert_eq!(value, json!({"elements": []}));
}

// =============================================================================
// files
// =============================================================================

#[test]
fn save_file_name_is_zero_padded_timestamp() {
    let at = time::Date::from_calendar_date(2024, time::Month::March, 5)
        .unwrap()
        .with_hms(7, 8, 9)
        .unwrap()
        .assume_utc();
    assert_eq!(save_file_name(at), "Whiteboard_2024_03_05_07_08_09.json");
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let dir = scratch_dir();
    let path = save_to_dir(&dir, &sample()).await.unwrap();
    assert!(path.starts_with(&dir));

    let name = path.file_name().and_then(|n| n.to_str()).unwrap().to_owned();
    assert!(name.starts_with("Whiteboard_"));

    let content = load_from_dir(&dir, &name).await.unwrap();
    assert_eq!(parse_saved(&content).unwrap(), sample());

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn load_rejects_path_traversal() {
    let dir = scratch_dir();
    for name in ["../secret.json", "a/b.json", "..", ""] {
        let err = load_from_dir(&dir, name).await.unwrap_err();
        assert!(matches!(err, PersistError::InvalidName(_)), "{name} should be rejected");
    }
}

#[tokio::test]
async fn load_missing_file_is_io_error() {
    let err = load_from_dir(&scratch_dir(), "Whiteboard_missing.json").await.unwrap_err();
    assert!(matches!(err, PersistError::Io(_)));
}

#[tokio::test]
async fn save_into_unwritable_location_fails() {
    let dir = scratch_dir();
    tokio::fs::write(&dir, b"not a folder").await.unwrap();
    let err = save_to_dir(&dir, &sample()).await.unwrap_err();
    assert!(matches!(err, PersistError::Io(_)));
    let _ = tokio::fs::remove_file(&dir).await;
}
