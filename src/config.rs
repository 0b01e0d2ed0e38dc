//! Server configuration parsed from environment variables.
//!
//! All keys are optional. Values are read through a lookup function so the
//! same parser serves `std::env` in production and plain maps in tests.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SAVE_DIR: &str = "Saved_Whiteboards";
pub const DEFAULT_ASSET_ROOT: &str = "public";
pub const DEFAULT_CLIENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Folder receiving saved whiteboard snapshots.
    pub save_dir: PathBuf,
    /// Folder served as static files; asset folders are resolved against it.
    pub asset_root: PathBuf,
    pub clip_art_folder: Option<String>,
    pub document_folder: Option<String>,
    /// Prefix for discovered asset URLs.
    pub public_base_url: String,
    /// Outbound queue depth per connection.
    pub client_channel_capacity: usize,
}

impl ServerConfig {
    /// Build config from the process environment.
    ///
    /// Keys:
    /// - `PORT`: default 3000
    /// - `SAVE_DIR`: default `Saved_Whiteboards`
    /// - `ASSET_ROOT`: default `public`
    /// - `CLIP_ART_FOLDER`, `DOCUMENT_FOLDER`: unset disables the listing
    /// - `PUBLIC_BASE_URL`: default empty (root-relative URLs)
    /// - `CLIENT_CHANNEL_CAPACITY`: default 256, must be positive
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when a numeric key does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when a numeric key does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let client_channel_capacity =
            parse_or("CLIENT_CHANNEL_CAPACITY", lookup("CLIENT_CHANNEL_CAPACITY"), DEFAULT_CLIENT_CHANNEL_CAPACITY)?;
        if client_channel_capacity == 0 {
            return Err(ConfigError::Invalid { key: "CLIENT_CHANNEL_CAPACITY", value: "0".into() });
        }

        Ok(Self {
            port,
            save_dir: lookup("SAVE_DIR").map_or_else(|| PathBuf::from(DEFAULT_SAVE_DIR), PathBuf::from),
            asset_root: lookup("ASSET_ROOT").map_or_else(|| PathBuf::from(DEFAULT_ASSET_ROOT), PathBuf::from),
            clip_art_folder: non_empty(lookup("CLIP_ART_FOLDER")),
            document_folder: non_empty(lookup("DOCUMENT_FOLDER")),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .unwrap_or_default()
                .trim_end_matches('/')
                .to_string(),
            client_channel_capacity,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            save_dir: PathBuf::from(DEFAULT_SAVE_DIR),
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            clip_art_folder: None,
            document_folder: None,
            public_base_url: String::new(),
            client_channel_capacity: DEFAULT_CLIENT_CHANNEL_CAPACITY,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|v| v.trim().trim_matches('/').to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
