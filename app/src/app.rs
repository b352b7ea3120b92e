use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::services::frame_store::{FileFrameStore, FrameStore};
use crate::services::pipeline::{Pipeline, PipelineSettings};
use crate::services::uploads::UploadStore;

/// Application shared state handed to every axum handler.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    config: AppConfig,
    uploads: UploadStore,
    frame_store: Arc<dyn FrameStore>,
    shutdown_token: CancellationToken,
}

impl SharedState {
    /// Create state backed by the on-disk frame store under the config's output dir.
    pub fn new(config: AppConfig) -> Self {
        let frame_store = Arc::new(FileFrameStore::new(config.output_dir()));
        Self::with_frame_store(config, frame_store)
    }

    /// Create state with an explicit frame store implementation.
    pub fn with_frame_store(config: AppConfig, frame_store: Arc<dyn FrameStore>) -> Self {
        let uploads = UploadStore::new(config.upload_dir());
        Self {
            inner: Arc::new(SharedStateInner {
                config,
                uploads,
                frame_store,
                shutdown_token: CancellationToken::new(),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn server_port(&self) -> u16 {
        self.inner.config.server_port
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.inner.uploads
    }

    pub fn frame_store(&self) -> &Arc<dyn FrameStore> {
        &self.inner.frame_store
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown_token
    }

    /// Build a pipeline for one process request.
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            self.inner.uploads.clone(),
            self.inner.frame_store.clone(),
            PipelineSettings::from(&self.inner.config),
        )
    }
}
