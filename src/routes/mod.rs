//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router carries the whiteboard websocket, the plain HTTP
//! submission and close endpoints, and a health check. Everything else falls
//! through to the static asset folder, which is also where discovered
//! clip-art and document URLs resolve.

pub mod whiteboards;
pub mod ws;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let assets = ServeDir::new(&state.config.asset_root).append_index_html_on_directories(true);

    Router::new()
        .route("/api/whiteboard/{id}/ws", get(ws::handle_ws))
        .route("/api/whiteboard/{id}", post(whiteboards::submit).delete(whiteboards::close))
        .route("/healthz", get(healthz))
        .fallback_service(assets)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
