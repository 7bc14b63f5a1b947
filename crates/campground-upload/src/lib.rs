//! Campground Upload Library
//!
//! Drives image files from selection to a campground's image list:
//!
//! - **intake**: dedup by fingerprint, capacity limit, validation
//! - **session**: per-item state machine and concurrent runs
//! - **pipeline**: authorize, transfer and record one item
//! - **reconciler**: idempotent merge into the associated list
//!
//! Storage and recording are reached through the `Storage` and
//! `ImageRecorder` traits so the whole flow runs against fakes in tests.

pub mod intake;
pub mod pipeline;
pub mod preview;
pub mod reconciler;
pub mod session;
pub mod validator;

pub use intake::{remaining_slots, IntakeBatch};
pub use pipeline::{Pipeline, StoredImage};
pub use preview::PreviewRegistry;
pub use reconciler::AssociationReconciler;
pub use session::UploadSessionManager;
pub use validator::ImageValidator;
