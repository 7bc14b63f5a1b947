//! Hooks and traits for external collaborators
//!
//! The upload pipeline never reaches for ambient global state. The signed-in
//! user comes from an injected [`SessionProvider`], and completed uploads are
//! persisted through an injected [`ImageRecorder`]. The API client and tests
//! provide the implementations.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::models::{ImageRecordRequest, SessionUser};

/// Source of the current authentication session
///
/// Lifecycle: `current` reads, `subscribe` observes changes, `teardown`
/// ends the session for good; after teardown `current` returns `None`.
pub trait SessionProvider: Send + Sync {
    fn current(&self) -> Option<SessionUser>;

    fn subscribe(&self) -> watch::Receiver<Option<SessionUser>>;

    fn teardown(&self);
}

/// In-process session holder for CLIs and tests.
pub struct StaticSessionProvider {
    user: watch::Sender<Option<SessionUser>>,
    torn_down: AtomicBool,
}

impl StaticSessionProvider {
    pub fn new(user: Option<SessionUser>) -> Self {
        Self {
            user: watch::Sender::new(user),
            torn_down: AtomicBool::new(false),
        }
    }

    pub fn signed_out() -> Self {
        Self::new(None)
    }

    /// Replace the signed-in user. Ignored once torn down.
    pub fn sign_in(&self, user: SessionUser) {
        if self.torn_down.load(Ordering::Acquire) {
            tracing::debug!("Sign-in ignored on a torn down session");
            return;
        }
        self.user.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        self.user.send_replace(None);
    }
}

impl SessionProvider for StaticSessionProvider {
    fn current(&self) -> Option<SessionUser> {
        if self.torn_down.load(Ordering::Acquire) {
            return None;
        }
        self.user.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<SessionUser>> {
        self.user.subscribe()
    }

    fn teardown(&self) {
        self.torn_down.store(true, Ordering::Release);
        self.user.send_replace(None);
    }
}

/// Trait for persisting an uploaded image against its campground
///
/// Called only for existing campgrounds in auto-record mode.
#[async_trait]
pub trait ImageRecorder: Send + Sync {
    async fn record(&self, request: &ImageRecordRequest) -> anyhow::Result<()>;
}

/// No-op implementation for manual recording mode
pub struct NoOpImageRecorder;

#[async_trait]
impl ImageRecorder for NoOpImageRecorder {
    async fn record(&self, _request: &ImageRecordRequest) -> anyhow::Result<()> {
        Ok(())
    }
}
