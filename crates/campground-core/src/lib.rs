//! Campground Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, and
//! collaborator traits shared by the storage binding, the upload pipeline,
//! the API client, and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod hooks;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, StorageConfig, UploadLimits};
pub use error::{LogLevel, UploadError, UploadStage};
pub use hooks::{
    ImageRecorder, NoOpImageRecorder, SessionProvider, StaticSessionProvider,
};
pub use models::RecordingMode;
pub use storage_types::StorageBackend;
