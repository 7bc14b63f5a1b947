//! Association reconciler.
//!
//! Folds completed uploads into a campground's image list. Both operations
//! are pure: they take the current list and return the next one, leaving
//! the caller to swap it in. Storage bytes are never touched here.

use std::collections::HashSet;
use std::sync::Mutex;

use campground_core::models::AssociatedImage;

#[derive(Debug, Default)]
pub struct AssociationReconciler {
    /// Paths merged at least once in this process. Only grows.
    seen: Mutex<HashSet<String>>,
}

impl AssociationReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register persisted images so a late duplicate completion cannot re-add them.
    pub fn seed(&self, images: &[AssociatedImage]) {
        let mut seen = self.seen_set();
        seen.extend(images.iter().map(|image| image.storage_path.clone()));
    }

    /// Append `path` unless it was merged before or is already listed.
    pub fn merge(&self, current: &[AssociatedImage], path: &str, url: &str) -> Vec<AssociatedImage> {
        let mut seen = self.seen_set();
        let listed = current.iter().any(|image| image.storage_path == path);
        if !seen.insert(path.to_string()) || listed {
            tracing::debug!(storage_path = %path, "Image already associated");
            return current.to_vec();
        }

        let mut next = current.to_vec();
        next.push(AssociatedImage {
            url: url.to_string(),
            storage_path: path.to_string(),
            sort_order: current.len(),
        });
        next
    }

    /// Drop `path` from the list. Remaining entries keep their sort order.
    pub fn remove(&self, current: &[AssociatedImage], path: &str) -> Vec<AssociatedImage> {
        current
            .iter()
            .filter(|image| image.storage_path != path)
            .cloned()
            .collect()
    }

    fn seen_set(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
