//! Background task loops: upload retention sweeping.

use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::app::SharedState;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}

/// Periodically delete uploads older than the configured retention.
pub async fn upload_cleanup_loop(state: SharedState) {
    let hours = state.config().upload_retention_hours;
    if hours == 0 {
        tracing::info!("Upload cleanup disabled (retention = 0)");
        return;
    }
    let max_age = Duration::from_secs(hours * 3600);
    let shutdown_token = state.shutdown_token().clone();

    loop {
        let uploads = state.uploads().clone();
        match tokio::task::spawn_blocking(move || uploads.cleanup_older_than(max_age)).await {
            Ok(Ok(deleted)) if deleted > 0 => {
                tracing::info!(deleted, retention_hours = hours, "Old uploads removed")
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => tracing::warn!("Upload cleanup failed: {e}"),
            Err(e) => tracing::error!("Upload cleanup task panicked: {e}"),
        }

        if sleep_or_cancel(&shutdown_token, CLEANUP_INTERVAL).await {
            tracing::info!("Upload cleanup loop stopped (shutdown)");
            return;
        }
    }
}
