//! File intake: dedup, capacity, validation.
//!
//! Order of operations for one batch:
//! 1. skip files whose fingerprint is already pending or repeats earlier in the batch
//! 2. keep at most `remaining_slots` of what is left, drop the rest
//! 3. validate each kept file; failures become error items, never queued

use std::collections::HashSet;

use campground_core::models::{CandidateFile, FileFingerprint, IntakeSummary, PendingUploadItem};

use crate::preview::PreviewRegistry;
use crate::validator::ImageValidator;

/// Free slots left for new files, saturating at zero.
pub fn remaining_slots(max_images: usize, associated: usize, pending: usize) -> usize {
    max_images
        .saturating_sub(associated)
        .saturating_sub(pending)
}

/// Items created by one intake call, in selection order.
#[derive(Debug, Default)]
pub struct IntakeBatch {
    pub items: Vec<PendingUploadItem>,
    pub summary: IntakeSummary,
}

pub fn intake(
    candidates: Vec<CandidateFile>,
    pending: &[PendingUploadItem],
    slots: usize,
    validator: &ImageValidator,
    previews: &PreviewRegistry,
) -> IntakeBatch {
    let mut seen: HashSet<FileFingerprint> =
        pending.iter().map(|item| item.fingerprint.clone()).collect();
    let mut batch = IntakeBatch::default();

    let fresh: Vec<CandidateFile> = candidates
        .into_iter()
        .filter(|file| {
            let fresh = seen.insert(file.fingerprint());
            if !fresh {
                tracing::debug!(fingerprint = %file.fingerprint(), "Skipping duplicate file");
                batch.summary.duplicates += 1;
            }
            fresh
        })
        .collect();

    if fresh.len() > slots {
        batch.summary.dropped = fresh.len() - slots;
        tracing::debug!(
            dropped = batch.summary.dropped,
            remaining_slots = slots,
            "Dropping files beyond image capacity"
        );
    }

    for file in fresh.into_iter().take(slots) {
        let preview = previews.allocate();
        match validator.validate_all(&file.content_type, file.size()) {
            Ok(()) => {
                batch.summary.accepted += 1;
                batch.items.push(PendingUploadItem::queued(&file, preview));
            }
            Err(e) => {
                tracing::debug!(
                    file_name = %file.name,
                    content_type = %file.content_type,
                    size_bytes = file.size(),
                    error_code = e.error_code(),
                    "File rejected at intake"
                );
                batch.summary.rejected += 1;
                batch
                    .items
                    .push(PendingUploadItem::rejected(&file, preview, e.client_message()));
            }
        }
    }

    batch
}
