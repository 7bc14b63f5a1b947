//! Per-item upload pipeline: validate → authorize → transfer → record.
//!
//! A [`Pipeline`] runs the storage and recording stages for one item and
//! knows nothing about the pending list. The session manager owns state
//! transitions and reconciles the result.

use std::sync::Arc;

use campground_core::models::{ImageRecordRequest, PendingUploadItem, UploadTarget};
use campground_core::{
    ImageRecorder, LogLevel, RecordingMode, SessionProvider, UploadError,
};
use campground_storage::keys::temp_namespace;
use campground_storage::{ProgressCallback, Storage, TransferProgress};

use crate::validator::ImageValidator;

/// Durable reference produced by a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub storage_path: String,
    pub public_url: String,
}

pub struct Pipeline {
    target: UploadTarget,
    mode: RecordingMode,
    validator: ImageValidator,
    storage: Arc<dyn Storage>,
    recorder: Arc<dyn ImageRecorder>,
    session: Arc<dyn SessionProvider>,
}

impl Pipeline {
    pub fn new(
        target: UploadTarget,
        mode: RecordingMode,
        validator: ImageValidator,
        storage: Arc<dyn Storage>,
        recorder: Arc<dyn ImageRecorder>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            target,
            mode,
            validator,
            storage,
            recorder,
            session,
        }
    }

    pub fn target(&self) -> UploadTarget {
        self.target
    }

    pub fn mode(&self) -> RecordingMode {
        self.mode
    }

    #[tracing::instrument(
        skip(self, item, on_progress),
        fields(item_id = %item.id, file_name = %item.file_name, size_bytes = item.size)
    )]
    pub async fn execute(
        &self,
        item: &PendingUploadItem,
        on_progress: ProgressCallback,
    ) -> Result<StoredImage, UploadError> {
        let start = std::time::Instant::now();
        self.validator.validate_all(&item.content_type, item.size)?;

        let storage_path = match self.target {
            UploadTarget::Existing(campground_id) => {
                self.upload_authorized(campground_id, item, on_progress)
                    .await?
            }
            UploadTarget::New => self.upload_to_temp(item, on_progress).await?,
        };
        let public_url = self.storage.public_url(&storage_path);

        if let (RecordingMode::Auto, UploadTarget::Existing(campground_id)) =
            (self.mode, self.target)
        {
            self.record(campground_id, &storage_path, item).await?;
        }

        tracing::info!(
            storage_path = %storage_path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image uploaded"
        );

        Ok(StoredImage {
            storage_path,
            public_url,
        })
    }

    async fn upload_authorized(
        &self,
        campground_id: i64,
        item: &PendingUploadItem,
        on_progress: ProgressCallback,
    ) -> Result<String, UploadError> {
        let authorization = self
            .storage
            .authorize(campground_id, &item.file_name, &item.content_type)
            .await
            .map_err(|e| UploadError::Authorization(e.to_string()))?;

        self.storage
            .transfer(
                &authorization,
                &item.content_type,
                item.data.clone(),
                on_progress,
            )
            .await?;

        Ok(authorization.path)
    }

    async fn upload_to_temp(
        &self,
        item: &PendingUploadItem,
        on_progress: ProgressCallback,
    ) -> Result<String, UploadError> {
        let user = self.session.current().ok_or(UploadError::Unauthenticated)?;
        let namespace = temp_namespace(user.user_id);

        on_progress(TransferProgress::started(item.size));
        let path = self
            .storage
            .upload_direct(
                &namespace,
                &item.file_name,
                &item.content_type,
                item.data.clone(),
            )
            .await?;
        on_progress(TransferProgress::completed(item.size));

        Ok(path)
    }

    async fn record(
        &self,
        campground_id: i64,
        storage_path: &str,
        item: &PendingUploadItem,
    ) -> Result<(), UploadError> {
        let request = ImageRecordRequest {
            campground_id,
            path: storage_path.to_string(),
            alt: Some(item.file_name.clone()),
        };

        self.recorder.record(&request).await.map_err(|e| {
            let message = format!("{:#}", e);
            tracing::warn!(
                campground_id = campground_id,
                storage_path = %storage_path,
                error = %message,
                "Image stored but not recorded; storage object left orphaned"
            );
            UploadError::Recording(message)
        })
    }
}

/// Log a failed item at the level its error calls for.
pub(crate) fn log_failure(item: &PendingUploadItem, err: &UploadError) {
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(
            item_id = %item.id,
            file_name = %item.file_name,
            error_code = err.error_code(),
            error = %err,
            "Upload failed"
        ),
        LogLevel::Warn => tracing::warn!(
            item_id = %item.id,
            file_name = %item.file_name,
            error_code = err.error_code(),
            error = %err,
            "Upload failed"
        ),
        LogLevel::Error => tracing::error!(
            item_id = %item.id,
            file_name = %item.file_name,
            error_code = err.error_code(),
            error = %err,
            "Upload failed"
        ),
    }
}
