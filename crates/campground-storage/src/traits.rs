//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::progress::ProgressCallback;
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use campground_core::models::UploadAuthorization;
use campground_core::UploadError;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AuthorizationFailed(msg) => UploadError::Authorization(msg),
            StorageError::InvalidKey(msg) => UploadError::Authorization(msg),
            StorageError::ConfigError(msg) => UploadError::Authorization(msg),
            other => UploadError::Transfer(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// The upload pipeline only talks to this trait, so backends can be swapped
/// (or faked in tests) without touching the session manager.
///
/// No method retries. A failure is returned once and the caller decides.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Issue a single-use upload authorization for an existing campground.
    ///
    /// The returned path is `campgrounds/{campground_id}/{uuid}-{sanitized_name}`.
    async fn authorize(
        &self,
        campground_id: i64,
        original_filename: &str,
        content_type: &str,
    ) -> StorageResult<UploadAuthorization>;

    /// Send file bytes to an authorized target.
    ///
    /// `on_progress` receives byte-level progress when the channel supports it.
    /// Backends that cannot observe progress report only the start (0%) and
    /// completion (100%).
    async fn transfer(
        &self,
        authorization: &UploadAuthorization,
        content_type: &str,
        data: Bytes,
        on_progress: ProgressCallback,
    ) -> StorageResult<()>;

    /// Write bytes straight into `namespace` without an authorization round
    /// trip. Used while the campground has no id yet. Returns the storage key.
    async fn upload_direct(
        &self,
        namespace: &str,
        original_filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> StorageResult<String>;

    /// Publicly resolvable URL for a storage key
    fn public_url(&self, storage_key: &str) -> String;

    /// Delete a file by its storage key
    ///
    /// The upload pipeline never calls this; the campground CRUD layer does
    /// when an image or campground is removed for good.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
