//! Campground Storage Library
//!
//! Storage binding for campground images: the `Storage` trait and its S3 and
//! local filesystem implementations.
//!
//! # Storage key format
//!
//! - **Existing campground**: `campgrounds/{campground_id}/{uuid}-{sanitized_name}`
//! - **Campground being created**: `{namespace}/{uuid}.{ext}`, where the
//!   namespace is `campgrounds/temp/{user_id}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod progress;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use campground_core::StorageBackend;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use progress::{ProgressCallback, TransferProgress};
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
