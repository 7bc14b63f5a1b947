//! Preview handle registry.
//!
//! Every pending item owns one local preview reference from intake until it
//! leaves the pending set. The registry tracks live handles so releases can
//! be checked and leaks show up in `live_count`.

use std::collections::HashSet;
use std::sync::Mutex;

use campground_core::models::PreviewHandle;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: Mutex<HashSet<PreviewHandle>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&self) -> PreviewHandle {
        let handle = PreviewHandle(format!("preview:{}", Uuid::new_v4()));
        self.live_set().insert(handle.clone());
        handle
    }

    /// Release a handle. Returns false if it was already released.
    pub fn release(&self, handle: &PreviewHandle) -> bool {
        let released = self.live_set().remove(handle);
        if !released {
            tracing::debug!(preview = %handle, "Preview handle already released");
        }
        released
    }

    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.live_set().contains(handle)
    }

    pub fn live_count(&self) -> usize {
        self.live_set().len()
    }

    fn live_set(&self) -> std::sync::MutexGuard<'_, HashSet<PreviewHandle>> {
        // A panic while holding the lock cannot leave the set half-updated.
        self.live.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
