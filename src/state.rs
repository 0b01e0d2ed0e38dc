//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the parsed configuration, the registry of live whiteboard sessions
//! and the asset catalog. Cloning is cheap; every field is shared.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::assets::AssetCatalog;
use crate::services::registry::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sessions: SessionRegistry,
    pub assets: AssetCatalog,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self::with_registry(config, SessionRegistry::new())
    }

    #[must_use]
    pub fn with_registry(config: ServerConfig, sessions: SessionRegistry) -> Self {
        let assets = AssetCatalog::from_config(&config);
        Self { config: Arc::new(config), sessions, assets }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    /// Fresh scratch folder path under the system temp dir. Not created.
    #[must_use]
    pub fn scratch_dir(prefix: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{prefix}-{}", Uuid::new_v4()))
    }

    /// `AppState` with its own save and asset folders, both initially absent.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(ServerConfig {
            save_dir: scratch_dir("wb-saves"),
            asset_root: scratch_dir("wb-public"),
            clip_art_folder: Some("clipart".into()),
            document_folder: Some("docs".into()),
            ..ServerConfig::default()
        })
    }

    /// Create `files` (paths relative to the asset root) with dummy content.
    pub async fn seed_assets(state: &AppState, files: &[&str]) {
        for file in files {
            let path = state.config.asset_root.join(file);
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await.expect("create asset folder");
            }
            tokio::fs::write(&path, b"asset").await.expect("write asset");
        }
    }

    /// Remove the scratch folders of a test state.
    pub async fn cleanup(state: &AppState) {
        let _ = tokio::fs::remove_dir_all(&state.config.save_dir).await;
        let _ = tokio::fs::remove_dir_all(&state.config.asset_root).await;
    }
}
