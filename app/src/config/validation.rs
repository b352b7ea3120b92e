//! Setting value validation.

use std::net::IpAddr;

use kindle_image::RotationDirection;

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
///
/// Empty values are accepted everywhere; they fall back to defaults.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    match key {
        "SERVER_PORT" => validate_int_range(value, 1, 65535)?,
        "BIND_ADDRESS" => {
            value
                .parse::<IpAddr>()
                .map_err(|_| "must be an IP address".to_string())?;
        }
        "TARGET_WIDTH" | "TARGET_HEIGHT" => validate_int_range(value, 1, 10_000)?,
        "MAX_UPLOAD_MB" => validate_int_range(value, 1, 512)?,
        "PREVIEW_QUALITY" => validate_int_range(value, 1, 100)?,
        "FRAME_CACHE_SECONDS" => validate_int_range(value, 0, 86_400)?,
        "UPLOAD_RETENTION_HOURS" => validate_int_range(value, 0, 8_760)?,
        "ROTATION_DIRECTION" => {
            value.parse::<RotationDirection>()?;
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
