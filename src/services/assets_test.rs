use super::*;
use uuid::Uuid;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|n| (*n).to_string()).collect()
}

#[test]
fn clip_art_urls_keep_picture_files_only() {
    let urls = clip_art_urls(&names(&["cat.png", "dog.JPG", "notes.txt", "README", "sun.gif"]), "", "clipart");
    assert_eq!(urls, vec!["/clipart/cat.png", "/clipart/sun.gif"]);
}

#[test]
fn extensions_match_exactly() {
    let urls = clip_art_urls(&names(&["Photo.JPG", "Photo.jpg", "icon.Png"]), "", "clipart");
    assert_eq!(urls, vec!["/clipart/Photo.jpg"]);

    let groups = group_documents(&names(&["deck.JPG", "slides.jpg", "slides_2.JPG"]), "", "docs");
    assert!(!groups.contains_key("deck"));
    assert_eq!(groups["slides"], vec!["/docs/slides.jpg"]);
}

#[test]
fn clip_art_urls_are_deduplicated() {
    let urls = clip_art_urls(&names(&["cat.png", "cat.png"]), "https://wb.example.org", "art");
    assert_eq!(urls, vec!["https://wb.example.org/art/cat.png"]);
}

#[test]
fn documents_group_pages_under_base_image() {
    let groups = group_documents(
        &names(&["intro_2.jpg", "intro.jpg", "intro_3.jpg", "outro.jpg", "intro.png"]),
        "",
        "docs",
    );
    assert_eq!(groups.len(), 2);
    assert_eq!(groups["intro"], vec!["/docs/intro.jpg", "/docs/intro_2.jpg", "/docs/intro_3.jpg"]);
    assert_eq!(groups["outro"], vec!["/docs/outro.jpg"]);
}

#[test]
fn documents_ignore_orphan_pages() {
    let groups = group_documents(&names(&["lost_1.jpg", "found.jpg"]), "", "docs");
    assert!(!groups.contains_key("lost"));
    assert!(groups.contains_key("found"));
}

#[test]
fn document_list_takes_first_page_of_each_group() {
    let groups = group_documents(&names(&["b.jpg", "a.jpg", "a_2.jpg"]), "", "docs");
    assert_eq!(document_list(&groups), vec!["/docs/a.jpg", "/docs/b.jpg"]);
}

#[tokio::test]
async fn catalog_scans_configured_folders() {
    let root = std::env::temp_dir().join(format!("wb-assets-{}", Uuid::new_v4()));
    tokio::fs::create_dir_all(root.join("clipart/nested")).await.unwrap();
    tokio::fs::create_dir_all(root.join("docs")).await.unwrap();
    for file in ["clipart/star.png", "clipart/notes.txt", "docs/deck.jpg", "docs/deck_2.jpg"] {
        tokio::fs::write(root.join(file), b"x").await.unwrap();
    }

    let config = ServerConfig {
        asset_root: root.clone(),
        clip_art_folder: Some("clipart".into()),
        document_folder: Some("docs".into()),
        ..ServerConfig::default()
    };
    let catalog = AssetCatalog::from_config(&config);

    assert_eq!(catalog.clip_arts().await, vec!["/clipart/star.png"]);
    let groups = catalog.documents().await;
    assert_eq!(groups["deck"], vec!["/docs/deck.jpg", "/docs/deck_2.jpg"]);

    let _ = tokio::fs::remove_dir_all(&root).await;
}

#[tokio::test]
async fn missing_folder_lists_as_empty() {
    let config = ServerConfig {
        asset_root: std::env::temp_dir().join(format!("wb-missing-{}", Uuid::new_v4())),
        clip_art_folder: Some("clipart".into()),
        document_folder: Some("docs".into()),
        ..ServerConfig::default()
    };
    let catalog = AssetCatalog::from_config(&config);
    assert!(catalog.clip_arts().await.is_empty());
    assert!(catalog.documents().await.is_empty());
}

#[tokio::test]
async fn unconfigured_folders_list_as_empty() {
    let catalog = AssetCatalog::from_config(&ServerConfig::default());
    assert!(catalog.clip_arts().await.is_empty());
    assert!(catalog.documents().await.is_empty());
}

#[tokio::test]
async fn list_file_names_reports_io_error() {
    let missing = std::env::temp_dir().join(format!("wb-none-{}", Uuid::new_v4()));
    let err = list_file_names(&missing).await.unwrap_err();
    assert!(matches!(err, AssetError::Io { .. }));
}
