mod background;
mod config;
mod element;
mod protocol;
mod routes;
mod services;
mod state;
mod undo;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env().expect("invalid configuration");
    let port = config.port;
    tracing::info!(
        save_dir = %config.save_dir.display(),
        asset_root = %config.asset_root.display(),
        clip_art = config.clip_art_folder.as_deref().unwrap_or("-"),
        documents = config.document_folder.as_deref().unwrap_or("-"),
        "configuration loaded"
    );

    let state = state::AppState::new(config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "whiteboard server listening");
    axum::serve(listener, app).await.expect("server failed");
}
