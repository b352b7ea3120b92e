//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    ("SERVER_PORT", "8088", "HTTP listen port"),
    ("BIND_ADDRESS", "0.0.0.0", "HTTP listen address"),
    (
        "KINDLE_FRAME_DATA_DIR",
        "",
        "Base directory for uploads/ and output/ (empty: ~/.kindle-frame)",
    ),
    ("TARGET_WIDTH", "600", "Frame width in pixels"),
    ("TARGET_HEIGHT", "800", "Frame height in pixels"),
    ("MAX_UPLOAD_MB", "16", "Request body limit for upload and process"),
    ("PREVIEW_QUALITY", "85", "JPEG quality of inline previews"),
    ("FRAME_CACHE_SECONDS", "300", "Client cache lifetime of /frame.png"),
    (
        "ROTATION_DIRECTION",
        "clockwise",
        "How positive UI rotation angles turn the picture",
    ),
    (
        "UPLOAD_RETENTION_HOURS",
        "24",
        "Delete uploads older than this many hours (0 keeps them forever)",
    ),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
