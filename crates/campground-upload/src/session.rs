//! Upload session manager.
//!
//! One manager per editing session of one campground. It owns two
//! single-writer cells published over `tokio::sync::watch`:
//!
//! - the pending list: every file taken in and not yet done or removed
//! - the associated list: committed image references in completion order
//!
//! Every mutation computes the next list from the current one and replaces
//! it. Subscribers always observe whole lists.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use campground_core::models::{
    AssociatedImage, CampgroundImagesUpdate, CandidateFile, FileFingerprint, IntakeSummary,
    PendingUploadItem, UploadStatus, UploadTarget,
};
use campground_core::{
    ImageRecorder, RecordingMode, SessionProvider, UploadError, UploadLimits,
};
use campground_storage::{ProgressCallback, Storage, TransferProgress};
use futures::future::join_all;
use tokio::sync::watch;
use uuid::Uuid;

use crate::intake::{intake, remaining_slots};
use crate::pipeline::{log_failure, Pipeline, StoredImage};
use crate::preview::PreviewRegistry;
use crate::reconciler::AssociationReconciler;
use crate::validator::ImageValidator;

/// Handle to an upload session. Clones share the same state.
#[derive(Clone)]
pub struct UploadSessionManager {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    max_images: usize,
    validator: ImageValidator,
    pipeline: Pipeline,
    previews: PreviewRegistry,
    reconciler: AssociationReconciler,
    /// Fingerprints with a run in progress
    started: Mutex<HashSet<FileFingerprint>>,
    pending: watch::Sender<Vec<PendingUploadItem>>,
    images: watch::Sender<Vec<AssociatedImage>>,
}

impl UploadSessionManager {
    pub fn new(
        target: UploadTarget,
        limits: &UploadLimits,
        mode: RecordingMode,
        storage: Arc<dyn Storage>,
        recorder: Arc<dyn ImageRecorder>,
        session: Arc<dyn SessionProvider>,
    ) -> Self {
        let validator = ImageValidator::from_limits(limits);
        let pipeline = Pipeline::new(
            target,
            mode,
            validator.clone(),
            storage,
            recorder,
            session,
        );

        Self {
            inner: Arc::new(SessionInner {
                max_images: limits.max_images,
                validator,
                pipeline,
                previews: PreviewRegistry::new(),
                reconciler: AssociationReconciler::new(),
                started: Mutex::new(HashSet::new()),
                pending: watch::Sender::new(Vec::new()),
                images: watch::Sender::new(Vec::new()),
            }),
        }
    }

    /// Load the campground's persisted images.
    pub fn with_existing_images(self, images: Vec<AssociatedImage>) -> Self {
        self.inner.reconciler.seed(&images);
        self.inner.images.send_replace(images);
        self
    }

    pub fn target(&self) -> UploadTarget {
        self.inner.pipeline.target()
    }

    pub fn mode(&self) -> RecordingMode {
        self.inner.pipeline.mode()
    }

    /// Take in a batch of selected files.
    ///
    /// Duplicates and files beyond capacity are skipped silently; invalid
    /// files are added as error items. Nothing is uploaded until
    /// [`start_queued`](Self::start_queued).
    pub fn add_files(&self, candidates: Vec<CandidateFile>) -> IntakeSummary {
        let inner = &self.inner;
        let mut summary = IntakeSummary::default();

        inner.pending.send_if_modified(|items| {
            let slots = remaining_slots(inner.max_images, inner.images.borrow().len(), items.len());
            let batch = intake(
                candidates,
                items,
                slots,
                &inner.validator,
                &inner.previews,
            );
            summary = batch.summary;
            let changed = !batch.items.is_empty();
            items.extend(batch.items);
            changed
        });

        tracing::info!(
            accepted = summary.accepted,
            rejected = summary.rejected,
            duplicates = summary.duplicates,
            dropped = summary.dropped,
            "Files taken in"
        );
        summary
    }

    /// Upload every queued item concurrently and wait for all of them.
    ///
    /// Safe to call again while a previous call is still running: items
    /// already started are skipped. Returns the final state of each item run
    /// by this call; done items are no longer in the pending list.
    pub async fn start_queued(&self) -> Vec<PendingUploadItem> {
        let queued: Vec<PendingUploadItem> = self
            .inner
            .pending
            .borrow()
            .iter()
            .filter(|item| item.status == UploadStatus::Queued)
            .cloned()
            .collect();

        let claimed: Vec<PendingUploadItem> = queued
            .into_iter()
            .filter(|item| self.inner.claim(&item.fingerprint))
            .collect();

        if claimed.is_empty() {
            return Vec::new();
        }
        tracing::debug!(count = claimed.len(), "Starting queued uploads");

        let runs = claimed
            .into_iter()
            .map(|item| Arc::clone(&self.inner).run(item));

        join_all(runs).await.into_iter().flatten().collect()
    }

    /// Remove a pending item.
    ///
    /// A queued item will not start. An uploading item finishes its transfer
    /// and the result is discarded.
    pub fn remove_pending(&self, id: Uuid) -> bool {
        let mut removed = None;
        self.inner.pending.send_if_modified(|items| {
            match items.iter().position(|item| item.id == id) {
                Some(index) => {
                    removed = Some(items.remove(index));
                    true
                }
                None => false,
            }
        });

        match removed {
            Some(item) => {
                self.inner.previews.release(&item.preview);
                tracing::debug!(item_id = %id, status = ?item.status, "Pending item removed");
                true
            }
            None => false,
        }
    }

    /// Drop an image from the associated list. The stored object is kept.
    pub fn remove_image(&self, storage_path: &str) {
        let reconciler = &self.inner.reconciler;
        self.inner
            .images
            .send_modify(|images| *images = reconciler.remove(images, storage_path));
    }

    pub fn pending(&self) -> Vec<PendingUploadItem> {
        self.inner.pending.borrow().clone()
    }

    pub fn images(&self) -> Vec<AssociatedImage> {
        self.inner.images.borrow().clone()
    }

    pub fn subscribe_pending(&self) -> watch::Receiver<Vec<PendingUploadItem>> {
        self.inner.pending.subscribe()
    }

    pub fn subscribe_images(&self) -> watch::Receiver<Vec<AssociatedImage>> {
        self.inner.images.subscribe()
    }

    /// Ordered image URLs for the campground create/update submission.
    pub fn image_urls(&self) -> Vec<String> {
        self.inner
            .images
            .borrow()
            .iter()
            .map(|image| image.url.clone())
            .collect()
    }

    pub fn images_update(&self) -> CampgroundImagesUpdate {
        CampgroundImagesUpdate::from_images(&self.inner.images.borrow())
    }

    pub fn remaining_slots(&self) -> usize {
        // Never hold an images guard while waiting on pending; add_files
        // locks them in the opposite order.
        let associated = self.inner.images.borrow().len();
        let pending = self.inner.pending.borrow().len();
        remaining_slots(self.inner.max_images, associated, pending)
    }

    /// Preview handles not yet released.
    pub fn live_previews(&self) -> usize {
        self.inner.previews.live_count()
    }
}

impl SessionInner {
    /// Atomically claim a fingerprint. False if a run already holds it.
    fn claim(&self, fingerprint: &FileFingerprint) -> bool {
        self.started_set().insert(fingerprint.clone())
    }

    fn release(&self, fingerprint: &FileFingerprint) {
        self.started_set().remove(fingerprint);
    }

    fn started_set(&self) -> std::sync::MutexGuard<'_, HashSet<FileFingerprint>> {
        self.started.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn run(self: Arc<Self>, item: PendingUploadItem) -> Option<PendingUploadItem> {
        let fingerprint = item.fingerprint.clone();
        let outcome = self.run_claimed(item).await;
        self.release(&fingerprint);
        outcome
    }

    async fn run_claimed(self: &Arc<Self>, item: PendingUploadItem) -> Option<PendingUploadItem> {
        if !self.mark_uploading(item.id) {
            tracing::debug!(item_id = %item.id, "Item removed before start");
            return None;
        }

        let result = self
            .pipeline
            .execute(&item, self.progress_callback(item.id))
            .await;

        self.finish(item, result)
    }

    fn mark_uploading(&self, id: Uuid) -> bool {
        self.pending.send_if_modified(|items| {
            match items
                .iter_mut()
                .find(|item| item.id == id && item.status == UploadStatus::Queued)
            {
                Some(item) => {
                    item.status = UploadStatus::Uploading;
                    item.progress = 0;
                    true
                }
                None => false,
            }
        })
    }

    /// Progress sink that only ever raises the item's percentage.
    fn progress_callback(self: &Arc<Self>, id: Uuid) -> ProgressCallback {
        let inner = Arc::clone(self);
        Arc::new(move |progress: TransferProgress| {
            let percent = progress.percent();
            inner.pending.send_if_modified(|items| {
                match items.iter_mut().find(|item| item.id == id) {
                    Some(item)
                        if item.status == UploadStatus::Uploading && percent > item.progress =>
                    {
                        item.progress = percent;
                        true
                    }
                    _ => false,
                }
            });
        })
    }

    fn finish(
        &self,
        item: PendingUploadItem,
        result: Result<StoredImage, UploadError>,
    ) -> Option<PendingUploadItem> {
        match result {
            Ok(stored) => self.complete(item, stored),
            Err(err) => self.fail(item, err),
        }
    }

    fn complete(&self, item: PendingUploadItem, stored: StoredImage) -> Option<PendingUploadItem> {
        let mut tracked = None;
        self.pending.send_if_modified(|items| {
            match items.iter().position(|pending| pending.id == item.id) {
                Some(index) => {
                    tracked = Some(items.remove(index));
                    true
                }
                None => false,
            }
        });

        let Some(mut done) = tracked else {
            tracing::info!(
                item_id = %item.id,
                storage_path = %stored.storage_path,
                "Upload finished after removal; result discarded"
            );
            return None;
        };

        self.previews.release(&done.preview);
        let reconciler = &self.reconciler;
        self.images.send_modify(|images| {
            *images = reconciler.merge(images, &stored.storage_path, &stored.public_url)
        });

        done.status = UploadStatus::Done;
        done.progress = 100;
        done.storage_path = Some(stored.storage_path);
        done.public_url = Some(stored.public_url);
        Some(done)
    }

    fn fail(&self, item: PendingUploadItem, err: UploadError) -> Option<PendingUploadItem> {
        log_failure(&item, &err);

        let message = err.client_message();
        let mut failed = None;
        self.pending.send_if_modified(|items| {
            match items.iter_mut().find(|pending| pending.id == item.id) {
                Some(pending) => {
                    pending.status = UploadStatus::Error;
                    pending.error = Some(message.clone());
                    failed = Some(pending.clone());
                    true
                }
                None => false,
            }
        });

        if failed.is_none() {
            tracing::debug!(item_id = %item.id, "Failed item was already removed");
        }
        failed
    }
}
