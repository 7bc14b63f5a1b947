//! Test helpers: in-memory collaborators and file fixtures.
//!
//! Run from workspace root: `cargo test -p campground-upload`.

#![allow(dead_code)]

pub mod fixtures;
pub mod recorder;
pub mod storage;

use std::sync::Arc;

use campground_core::models::{AssociatedImage, SessionUser, UploadTarget};
use campground_core::{ImageRecorder, RecordingMode, StaticSessionProvider, UploadLimits};
use campground_upload::UploadSessionManager;
use uuid::Uuid;

use recorder::FakeRecorder;
use storage::FakeStorage;

/// A session manager wired to fakes, plus handles to inspect them.
pub struct TestSession {
    pub manager: UploadSessionManager,
    pub storage: Arc<FakeStorage>,
    pub recorder: Arc<FakeRecorder>,
    pub session: Arc<StaticSessionProvider>,
    pub user_id: Uuid,
}

pub struct TestSessionBuilder {
    target: UploadTarget,
    limits: UploadLimits,
    mode: RecordingMode,
    signed_in: bool,
    existing: Vec<AssociatedImage>,
    recorder: FakeRecorder,
}

impl TestSessionBuilder {
    pub fn existing(campground_id: i64) -> Self {
        Self::with_target(UploadTarget::Existing(campground_id))
    }

    pub fn new_campground() -> Self {
        Self::with_target(UploadTarget::New)
    }

    fn with_target(target: UploadTarget) -> Self {
        Self {
            target,
            limits: UploadLimits::default(),
            mode: RecordingMode::Auto,
            signed_in: true,
            existing: Vec::new(),
            recorder: FakeRecorder::new(),
        }
    }

    pub fn max_images(mut self, max_images: usize) -> Self {
        self.limits.max_images = max_images;
        self
    }

    pub fn manual(mut self) -> Self {
        self.mode = RecordingMode::Manual;
        self
    }

    pub fn signed_out(mut self) -> Self {
        self.signed_in = false;
        self
    }

    pub fn failing_recorder(mut self) -> Self {
        self.recorder = FakeRecorder::failing();
        self
    }

    pub fn existing_images(mut self, images: Vec<AssociatedImage>) -> Self {
        self.existing = images;
        self
    }

    pub fn build(self) -> TestSession {
        let user_id = Uuid::new_v4();
        let session = Arc::new(if self.signed_in {
            StaticSessionProvider::new(Some(SessionUser::new(user_id)))
        } else {
            StaticSessionProvider::signed_out()
        });
        let storage = Arc::new(FakeStorage::new());
        let recorder = Arc::new(self.recorder);

        let manager = UploadSessionManager::new(
            self.target,
            &self.limits,
            self.mode,
            storage.clone(),
            recorder.clone() as Arc<dyn ImageRecorder>,
            session.clone(),
        )
        .with_existing_images(self.existing);

        TestSession {
            manager,
            storage,
            recorder,
            session,
            user_id,
        }
    }
}

/// An already persisted image.
pub fn persisted_image(campground_id: i64, name: &str, sort_order: usize) -> AssociatedImage {
    let storage_path = format!("campgrounds/{}/{}-{}", campground_id, Uuid::new_v4(), name);
    AssociatedImage {
        url: format!("{}/{}", storage::PUBLIC_BASE_URL, storage_path),
        storage_path,
        sort_order,
    }
}
