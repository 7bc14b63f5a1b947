use std::path::PathBuf;

use anyhow::{Context, Result};
use campground_core::models::{
    AssociatedImage, CandidateFile, IntakeSummary, PendingUploadItem, UploadStatus, UploadTarget,
};
use campground_upload::UploadSessionManager;
use serde::Serialize;

/// What one CLI run did, printed as JSON.
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub target: UploadTarget,
    pub intake: IntakeSummary,
    /// Items uploaded by this run
    pub uploaded: Vec<PendingUploadItem>,
    /// Items rejected at intake or failed during upload
    pub failed: Vec<PendingUploadItem>,
    /// Associated list after the run, in order
    pub images: Vec<AssociatedImage>,
}

impl UploadReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Read files from disk in the order given. Files over `max_bytes` are
/// taken in by size only and fail intake.
pub async fn load_candidates(paths: &[PathBuf], max_bytes: u64) -> Result<Vec<CandidateFile>> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        let file = CandidateFile::from_path(path, max_bytes)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        candidates.push(file);
    }
    Ok(candidates)
}

/// Take in `candidates`, upload everything queued and collect the outcome.
pub async fn run_upload(
    manager: &UploadSessionManager,
    candidates: Vec<CandidateFile>,
) -> UploadReport {
    let intake = manager.add_files(candidates);
    let outcomes = manager.start_queued().await;

    let uploaded = outcomes
        .into_iter()
        .filter(|item| item.status == UploadStatus::Done)
        .collect();
    let failed = manager
        .pending()
        .into_iter()
        .filter(|item| item.status == UploadStatus::Error)
        .collect();

    UploadReport {
        target: manager.target(),
        intake,
        uploaded,
        failed,
        images: manager.images(),
    }
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays JSON.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use campground_core::{
        NoOpImageRecorder, RecordingMode, StaticSessionProvider, UploadLimits,
    };
    use campground_storage::LocalStorage;
    use std::path::Path;
    use std::sync::Arc;

    async fn local_manager(root: &Path, limits: &UploadLimits) -> UploadSessionManager {
        let storage = LocalStorage::new(root, "http://localhost:3000/media".to_string(), None)
            .await
            .unwrap();
        UploadSessionManager::new(
            UploadTarget::Existing(42),
            limits,
            RecordingMode::Manual,
            Arc::new(storage),
            Arc::new(NoOpImageRecorder),
            Arc::new(StaticSessionProvider::signed_out()),
        )
    }

    #[tokio::test]
    async fn load_candidates_keeps_order_and_fails_on_missing() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.jpg");
        tokio::fs::write(&a, b"aaaa").await.unwrap();
        tokio::fs::write(&b, b"bb").await.unwrap();

        let files = load_candidates(&[b.clone(), a.clone()], 1024).await.unwrap();
        assert_eq!(files[0].name, "b.jpg");
        assert_eq!(files[0].content_type, "image/jpeg");
        assert_eq!(files[1].name, "a.png");

        let missing = dir.path().join("missing.jpg");
        let err = load_candidates(&[a, missing], 1024).await.unwrap_err();
        assert!(err.to_string().contains("missing.jpg"));
    }

    #[tokio::test]
    async fn run_upload_reports_uploaded_and_failed() {
        let storage_dir = tempfile::tempdir().unwrap();
        let files_dir = tempfile::tempdir().unwrap();
        let photo = files_dir.path().join("photo.jpg");
        let notes = files_dir.path().join("notes.txt");
        tokio::fs::write(&photo, vec![0xFFu8; 2048]).await.unwrap();
        tokio::fs::write(&notes, b"not an image").await.unwrap();

        let limits = UploadLimits::default();
        let manager = local_manager(storage_dir.path(), &limits).await;

        let candidates = load_candidates(&[photo, notes], limits.max_file_size_bytes)
            .await
            .unwrap();
        let report = run_upload(&manager, candidates).await;

        assert_eq!(report.intake.accepted, 1);
        assert_eq!(report.uploaded.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].file_name, "notes.txt");
        assert_eq!(report.images.len(), 1);
        assert!(report.has_failures());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["target"]["kind"], "existing");
        assert_eq!(json["target"]["campground_id"], 42);
        assert_eq!(json["failed"][0]["error"], "Unsupported file type.");
    }

    #[tokio::test]
    async fn oversized_file_fails_without_being_read() {
        let storage_dir = tempfile::tempdir().unwrap();
        let files_dir = tempfile::tempdir().unwrap();
        let huge = files_dir.path().join("huge.jpg");
        std::fs::File::create(&huge)
            .unwrap()
            .set_len(8 * 1024 * 1024 * 1024)
            .unwrap();

        let limits = UploadLimits::default();
        let manager = local_manager(storage_dir.path(), &limits).await;

        let candidates = load_candidates(&[huge], limits.max_file_size_bytes)
            .await
            .unwrap();
        assert!(candidates[0].data.is_empty());

        let report = run_upload(&manager, candidates).await;
        assert!(report.uploaded.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].error.as_deref(), Some("File too large"));
        assert_eq!(report.failed[0].size, 8 * 1024 * 1024 * 1024);
    }
}
