//! Asset service — clip-art and document discovery.
//!
//! DESIGN
//! ======
//! Asset folders live under the static asset root and are rescanned on every
//! listing request, so files dropped in while the server runs show up on the
//! next request. URLs are `{base}/{folder}/{file}` and resolve through the
//! static file service.
//!
//! Documents are page images: `intro.jpg` starts group `intro` and
//! `intro_2.jpg`, `intro_3.jpg` append to it. A page whose group has no base
//! image is ignored.
//!
//! ERROR HANDLING
//! ==============
//! An unreadable folder is logged and treated as empty. Listing never fails.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::ServerConfig;

const CLIP_ART_EXTENSIONS: &[&str] = &["jpg", "bmp", "png", "jpeg", "gif"];
const DOCUMENT_EXTENSION: &str = "jpg";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset folder unreadable: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl crate::protocol::ErrorCode for AssetError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "E_ASSET_IO",
        }
    }
}

/// Document group name -> page URLs, base page first.
pub type DocumentGroups = BTreeMap<String, Vec<String>>;

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone)]
pub struct AssetCatalog {
    root: PathBuf,
    base_url: String,
    clip_art_folder: Option<String>,
    document_folder: Option<String>,
}

impl AssetCatalog {
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            root: config.asset_root.clone(),
            base_url: config.public_base_url.clone(),
            clip_art_folder: config.clip_art_folder.clone(),
            document_folder: config.document_folder.clone(),
        }
    }

    /// Current clip-art URLs. Empty when no folder is configured or readable.
    pub async fn clip_arts(&self) -> Vec<String> {
        let Some(folder) = &self.clip_art_folder else {
            return Vec::new();
        };
        match list_file_names(&self.root.join(folder)).await {
            Ok(names) => clip_art_urls(&names, &self.base_url, folder),
            Err(e) => {
                warn!(error = %e, "clip-art listing failed; treating as empty");
                Vec::new()
            }
        }
    }

    /// Current document groups. Empty when no folder is configured or readable.
    pub async fn documents(&self) -> DocumentGroups {
        let Some(folder) = &self.document_folder else {
            return DocumentGroups::new();
        };
        match list_file_names(&self.root.join(folder)).await {
            Ok(names) => group_documents(&names, &self.base_url, folder),
            Err(e) => {
                warn!(error = %e, "document listing failed; treating as empty");
                DocumentGroups::new()
            }
        }
    }
}

// =============================================================================
// SCANNING
// =============================================================================

/// Regular file names in `dir`, sorted.
async fn list_file_names(dir: &Path) -> Result<Vec<String>, AssetError> {
    let io_err = |source| AssetError::Io { path: dir.to_path_buf(), source };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_owned());
        }
    }
    names.sort();
    Ok(names)
}

fn has_extension(name: &str, accepted: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| accepted.contains(&ext))
}

fn asset_url(base_url: &str, folder: &str, name: &str) -> String {
    format!("{base_url}/{folder}/{name}")
}

pub(crate) fn clip_art_urls(names: &[String], base_url: &str, folder: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for name in names {
        if !has_extension(name, CLIP_ART_EXTENSIONS) {
            continue;
        }
        let url = asset_url(base_url, folder, name);
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

pub(crate) fn group_documents(names: &[String], base_url: &str, folder: &str) -> DocumentGroups {
    let mut pages: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|name| has_extension(name, &[DOCUMENT_EXTENSION]))
        .collect();
    // Base images first so every page finds its group regardless of naming.
    pages.sort_by_key(|name| (stem(name).contains('_'), *name));

    let mut groups = DocumentGroups::new();
    for name in pages {
        let document = stem(name);
        let url = asset_url(base_url, folder, name);
        match document.rsplit_once('_') {
            None => {
                groups.insert(document.to_owned(), vec![url]);
            }
            Some((group, _page)) => {
                if let Some(urls) = groups.get_mut(group) {
                    urls.push(url);
                }
            }
        }
    }
    groups
}

fn stem(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(stem, _)| stem)
}

/// One representative URL per document: its first page.
#[must_use]
pub fn document_list(groups: &DocumentGroups) -> Vec<String> {
    groups
        .values()
        .filter_map(|urls| urls.first().cloned())
        .collect()
}

#[cfg(test)]
#[path = "assets_test.rs"]
mod tests;
