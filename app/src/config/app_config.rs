//! Runtime application configuration loaded from the environment.

use std::path::PathBuf;

use kindle_image::RotationDirection;

use super::defaults::get_default;
use super::validation::validate_setting;

/// Runtime configuration shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub bind_address: String,
    pub data_dir: PathBuf,
    pub target_width: u32,
    pub target_height: u32,
    pub max_upload_bytes: usize,
    pub preview_quality: u8,
    pub frame_cache_seconds: u64,
    pub rotation_direction: RotationDirection,
    pub upload_retention_hours: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8088,
            bind_address: "0.0.0.0".into(),
            data_dir: default_data_dir(),
            target_width: kindle_image::TARGET_WIDTH,
            target_height: kindle_image::TARGET_HEIGHT,
            max_upload_bytes: 16 * 1024 * 1024,
            preview_quality: kindle_image::PREVIEW_QUALITY,
            frame_cache_seconds: 300,
            rotation_direction: RotationDirection::Clockwise,
            upload_retention_hours: 24,
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for
    /// missing or invalid values.
    pub fn load(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let g = |key: &str| -> String {
            let default = get_default(key).unwrap_or_default();
            match lookup(key).map(|v| v.trim().to_string()) {
                Some(v) if !v.is_empty() => match validate_setting(key, &v) {
                    Ok(()) => v,
                    Err(e) => {
                        tracing::warn!(key, value = %v, "Invalid setting ({e}), using default");
                        default.to_string()
                    }
                },
                _ => default.to_string(),
            }
        };

        let defaults = Self::default();
        let data_dir = {
            let dir = g("KINDLE_FRAME_DATA_DIR");
            if dir.is_empty() { defaults.data_dir } else { PathBuf::from(dir) }
        };

        Self {
            server_port: g("SERVER_PORT").parse().unwrap_or(defaults.server_port),
            bind_address: g("BIND_ADDRESS"),
            data_dir,
            target_width: g("TARGET_WIDTH").parse().unwrap_or(defaults.target_width),
            target_height: g("TARGET_HEIGHT").parse().unwrap_or(defaults.target_height),
            max_upload_bytes: g("MAX_UPLOAD_MB")
                .parse::<usize>()
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(defaults.max_upload_bytes),
            preview_quality: g("PREVIEW_QUALITY").parse().unwrap_or(defaults.preview_quality),
            frame_cache_seconds: g("FRAME_CACHE_SECONDS")
                .parse()
                .unwrap_or(defaults.frame_cache_seconds),
            rotation_direction: g("ROTATION_DIRECTION")
                .parse()
                .unwrap_or(defaults.rotation_direction),
            upload_retention_hours: g("UPLOAD_RETENTION_HOURS")
                .parse()
                .unwrap_or(defaults.upload_retention_hours),
        }
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.data_dir.join("output")
    }

    pub fn listen_address(&self) -> String {
        if self.bind_address.contains(':') {
            format!("[{}]:{}", self.bind_address, self.server_port)
        } else {
            format!("{}:{}", self.bind_address, self.server_port)
        }
    }
}

/// Priority: KINDLE_FRAME_DATA_DIR env var > ~/.kindle-frame
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kindle-frame")
}
