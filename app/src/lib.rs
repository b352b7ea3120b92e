pub mod app;
pub mod background;
pub mod config;
pub mod server;
pub mod services;

use config::AppConfig;

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}

/// Load config and create the upload/output directories.
pub fn init_foundation() -> Result<AppConfig, anyhow::Error> {
    load_dotenv();

    let config = AppConfig::from_env();
    std::fs::create_dir_all(config.upload_dir())?;
    std::fs::create_dir_all(config.output_dir())?;

    tracing::info!(
        data_dir = %config.data_dir.display(),
        frame_size = %format!("{}x{}", config.target_width, config.target_height),
        rotation = %config.rotation_direction,
        "Settings loaded (port={})",
        config.server_port
    );
    Ok(config)
}
