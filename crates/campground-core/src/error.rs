//! Error types module
//!
//! Every failure of the upload pipeline resolves to one `UploadError`
//! attached to a single pending item. Errors never abort sibling uploads and
//! are never retried automatically; the human-readable text shown next to the
//! failed item comes from [`UploadError::client_message`].

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a failed network round-trip
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStage {
    Validation,
    Authorization,
    Transfer,
    Recording,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Unsupported file type: {content_type}")]
    UnsupportedType { content_type: String },

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Empty file")]
    EmptyFile,

    #[error("No signed-in user")]
    Unauthenticated,

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Recording failed: {0}")]
    Recording(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Static metadata for each variant: (stage, error_code, recoverable, log_level).
///
/// `recoverable` means a manual re-upload of the same file may succeed; the
/// pipeline itself never retries.
fn upload_error_static_metadata(
    err: &UploadError,
) -> (UploadStage, &'static str, bool, LogLevel) {
    match err {
        UploadError::UnsupportedType { .. } => (
            UploadStage::Validation,
            "UNSUPPORTED_FILE_TYPE",
            false,
            LogLevel::Debug,
        ),
        UploadError::FileTooLarge { .. } => (
            UploadStage::Validation,
            "FILE_TOO_LARGE",
            false,
            LogLevel::Debug,
        ),
        UploadError::EmptyFile => (
            UploadStage::Validation,
            "EMPTY_FILE",
            false,
            LogLevel::Debug,
        ),
        UploadError::Unauthenticated => (
            UploadStage::Authorization,
            "UNAUTHENTICATED",
            false,
            LogLevel::Debug,
        ),
        UploadError::Authorization(_) => (
            UploadStage::Authorization,
            "AUTHORIZATION_FAILED",
            true,
            LogLevel::Warn,
        ),
        UploadError::Transfer(_) => (
            UploadStage::Transfer,
            "TRANSFER_FAILED",
            true,
            LogLevel::Warn,
        ),
        UploadError::Recording(_) => (
            UploadStage::Recording,
            "RECORDING_FAILED",
            true,
            LogLevel::Warn,
        ),
        UploadError::Internal(_) => (
            UploadStage::Internal,
            "INTERNAL_ERROR",
            true,
            LogLevel::Error,
        ),
    }
}

impl UploadError {
    pub fn stage(&self) -> UploadStage {
        upload_error_static_metadata(self).0
    }

    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    pub fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).1
    }

    pub fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).2
    }

    pub fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).3
    }

    /// Message shown next to the failed item.
    pub fn client_message(&self) -> String {
        match self {
            UploadError::UnsupportedType { .. } => "Unsupported file type.".to_string(),
            UploadError::FileTooLarge { .. } => "File too large".to_string(),
            UploadError::EmptyFile => "File is empty".to_string(),
            UploadError::Unauthenticated => "Sign in to upload images".to_string(),
            UploadError::Authorization(_) => "Could not authorize the upload".to_string(),
            UploadError::Transfer(_) => "Upload failed".to_string(),
            UploadError::Recording(_) => "Uploaded, but the image could not be saved".to_string(),
            UploadError::Internal(_) => "Something went wrong".to_string(),
        }
    }
}
