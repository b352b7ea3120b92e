//! Frame server binary.
//!
//! Starts the axum web server, the upload cleanup loop, and signal handling.

use tracing_subscriber::EnvFilter;

use kindle_frame_lib::app::SharedState;
use kindle_frame_lib::background;
use kindle_frame_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting Kindle frame server");

    let config = kindle_frame_lib::init_foundation()?;
    let state = SharedState::new(config);

    let server_state = state.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(server_state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    let s = state.clone();
    tokio::spawn(async move { background::upload_cleanup_loop(s).await });

    tracing::info!(
        port = state.server_port(),
        "Server running. Press Ctrl+C to stop."
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    state.shutdown_token().cancel();
    if let Err(e) = server_handle.await {
        tracing::warn!("Server task ended abnormally: {e}");
    }
    Ok(())
}
