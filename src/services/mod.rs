//! Whiteboard services used by websocket and HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Services own the whiteboard state, its persistence and asset discovery,
//! so route handlers stay thin: they parse one request, hand it to
//! `whiteboard::handle_request`, and write back the reply. `session` holds
//! the per-whiteboard rules, `registry` maps ids to live sessions.

pub mod assets;
pub mod persistence;
pub mod registry;
pub mod session;
pub mod whiteboard;
