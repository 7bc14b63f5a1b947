//! Upload session tests against the local filesystem backend.
//!
//! Run with: `cargo test -p campground-upload --test local_storage_test`

#[path = "helpers/mod.rs"]
mod helpers;

use std::sync::Arc;

use campground_core::models::{SessionUser, UploadStatus, UploadTarget};
use campground_core::{NoOpImageRecorder, RecordingMode, StaticSessionProvider, UploadLimits};
use campground_storage::{LocalStorage, Storage};
use campground_upload::UploadSessionManager;
use helpers::fixtures::{jpeg, MB};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:3000/media";

async fn local_manager(
    dir: &tempfile::TempDir,
    target: UploadTarget,
    user_id: Uuid,
) -> (UploadSessionManager, Arc<LocalStorage>) {
    let storage = Arc::new(
        LocalStorage::new(dir.path(), BASE_URL.to_string(), Some("test-secret".to_string()))
            .await
            .unwrap(),
    );
    let manager = UploadSessionManager::new(
        target,
        &UploadLimits::default(),
        RecordingMode::Manual,
        storage.clone(),
        Arc::new(NoOpImageRecorder),
        Arc::new(StaticSessionProvider::new(Some(SessionUser::new(user_id)))),
    );
    (manager, storage)
}

#[tokio::test]
async fn test_two_megabyte_jpeg_lands_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (manager, storage) = local_manager(&dir, UploadTarget::Existing(42), Uuid::new_v4()).await;

    manager.add_files(vec![jpeg("photo.jpg", 2 * MB)]);
    let outcomes = manager.start_queued().await;

    assert_eq!(outcomes[0].status, UploadStatus::Done);
    let path = outcomes[0].storage_path.clone().unwrap();
    assert!(path.starts_with("campgrounds/42/"));

    let on_disk = tokio::fs::read(dir.path().join(&path)).await.unwrap();
    assert_eq!(on_disk.len(), 2 * MB);
    assert_eq!(&on_disk[..3], &[0xFF, 0xD8, 0xFF]);
    assert!(storage.exists(&path).await.unwrap());

    assert_eq!(manager.image_urls(), vec![format!("{}/{}", BASE_URL, path)]);
}

#[tokio::test]
async fn test_new_campground_writes_under_user_namespace() {
    let dir = tempfile::tempdir().unwrap();
    let user_id = Uuid::new_v4();
    let (manager, storage) = local_manager(&dir, UploadTarget::New, user_id).await;

    manager.add_files(vec![jpeg("tent.jpeg", 1024)]);
    let outcomes = manager.start_queued().await;

    let path = outcomes[0].storage_path.clone().unwrap();
    assert!(path.starts_with(&format!("campgrounds/temp/{}/", user_id)));
    assert!(path.ends_with(".jpeg"));
    assert!(storage.exists(&path).await.unwrap());
}
