use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A short-lived permission to write one file to one storage path.
///
/// Requested immediately before a transfer, used once, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadAuthorization {
    /// Storage key the file will be written to
    pub path: String,
    /// URL accepting a single PUT of the file bytes
    pub signed_url: String,
    /// URL expiration time
    pub expires_at: DateTime<Utc>,
}

impl UploadAuthorization {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
