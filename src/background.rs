//! Background model — the single backdrop record of a whiteboard.
//!
//! A background has no identity. Setting one replaces whatever the session
//! held; "no background" is represented as `None` by the owner.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    #[serde(default)]
    pub label: String,
    /// Image (or document page) URL. Empty for a plain backdrop.
    #[serde(default)]
    pub url: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}
