use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a physical file: (name, byte size, last-modified millis).
///
/// Selecting the same file twice yields the same fingerprint, which is how
/// intake and the start guard recognise repeats.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileFingerprint {
    pub name: String,
    pub size: u64,
    pub last_modified_ms: i64,
}

impl Display for FileFingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}:{}", self.name, self.size, self.last_modified_ms)
    }
}

/// A file selected or dropped by the user, not yet validated.
///
/// `size` is the size on disk. It matches `data` except for files loaded
/// with [`CandidateFile::from_path`] above the read limit, which carry no
/// bytes at all.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
    size: u64,
    pub data: Bytes,
}

impl CandidateFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        last_modified: DateTime<Utc>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            content_type: content_type.into(),
            last_modified,
            size: data.len() as u64,
            data,
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    ///
    /// Files larger than `max_bytes` are not read; intake rejects them by
    /// size alone.
    pub async fn from_path(path: impl AsRef<Path>, max_bytes: u64) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let size = metadata.len();
        let data = if size > max_bytes {
            Bytes::new()
        } else {
            Bytes::from(tokio::fs::read(path).await?)
        };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Self {
            name,
            content_type,
            last_modified,
            size,
            data,
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn fingerprint(&self) -> FileFingerprint {
        FileFingerprint {
            name: self.name.clone(),
            size: self.size(),
            last_modified_ms: self.last_modified.timestamp_millis(),
        }
    }
}

/// Local preview reference for a pending file.
///
/// Allocated at intake and released when the item leaves the pending set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreviewHandle(pub String);

impl Display for PreviewHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Per-item upload state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Queued,
    Uploading,
    Done,
    Error,
}

/// One file in flight.
#[derive(Debug, Clone, Serialize)]
pub struct PendingUploadItem {
    pub id: Uuid,
    pub fingerprint: FileFingerprint,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    #[serde(skip)]
    pub data: Bytes,
    pub preview: PreviewHandle,
    /// 0-100, never decreases within one transfer
    pub progress: u8,
    pub status: UploadStatus,
    pub error: Option<String>,
    pub storage_path: Option<String>,
    pub public_url: Option<String>,
}

impl PendingUploadItem {
    pub fn queued(file: &CandidateFile, preview: PreviewHandle) -> Self {
        Self {
            id: Uuid::new_v4(),
            fingerprint: file.fingerprint(),
            file_name: file.name.clone(),
            content_type: file.content_type.clone(),
            size: file.size(),
            data: file.data.clone(),
            preview,
            progress: 0,
            status: UploadStatus::Queued,
            error: None,
            storage_path: None,
            public_url: None,
        }
    }

    /// An item that failed validation. Its bytes are never kept.
    pub fn rejected(file: &CandidateFile, preview: PreviewHandle, message: String) -> Self {
        Self {
            data: Bytes::new(),
            status: UploadStatus::Error,
            error: Some(message),
            ..Self::queued(file, preview)
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, UploadStatus::Done | UploadStatus::Error)
    }
}

/// Where uploads for one editing session go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "campground_id")]
pub enum UploadTarget {
    /// A persisted campground; uploads are authorized against its id.
    Existing(i64),
    /// A campground still being created; uploads go to the temporary namespace.
    New,
}

/// Whether completed uploads are recorded one by one or returned to the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingMode {
    /// Each completed upload to an existing campground is sent to the
    /// metadata endpoint before it is associated.
    #[default]
    Auto,
    /// The accumulated list is handed back for a later form submission.
    Manual,
}

impl FromStr for RecordingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(RecordingMode::Auto),
            "manual" => Ok(RecordingMode::Manual),
            _ => Err(anyhow::anyhow!("Invalid recording mode: {}", s)),
        }
    }
}

/// Outcome counts of one intake call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntakeSummary {
    /// Items queued for upload
    pub accepted: usize,
    /// Items created directly in error status
    pub rejected: usize,
    /// Files already pending, skipped silently
    pub duplicates: usize,
    /// Files beyond the remaining capacity, dropped silently
    pub dropped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn photo() -> CandidateFile {
        CandidateFile::new(
            "photo.jpg",
            "image/jpeg",
            Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            vec![1u8, 2, 3],
        )
    }

    #[test]
    fn fingerprint_is_stable_across_selections() {
        let a = photo();
        let b = photo();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().to_string(), "photo.jpg:3:1700000000000");
    }

    #[test]
    fn fingerprint_changes_with_last_modified() {
        let a = photo();
        let mut b = photo();
        b.last_modified = Utc.timestamp_millis_opt(1_700_000_000_001).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn rejected_item_drops_bytes() {
        let item = PendingUploadItem::rejected(
            &photo(),
            PreviewHandle("preview:1".to_string()),
            "File too large".to_string(),
        );
        assert_eq!(item.status, UploadStatus::Error);
        assert!(item.data.is_empty());
        assert_eq!(item.size, 3);
        assert!(item.is_terminal());
    }

    #[test]
    fn recording_mode_parses() {
        assert_eq!("AUTO".parse::<RecordingMode>().unwrap(), RecordingMode::Auto);
        assert_eq!(
            "manual".parse::<RecordingMode>().unwrap(),
            RecordingMode::Manual
        );
        assert!("sometimes".parse::<RecordingMode>().is_err());
    }

    #[tokio::test]
    async fn candidate_from_path_guesses_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tent.png");
        tokio::fs::write(&path, b"not really a png").await.unwrap();

        let file = CandidateFile::from_path(&path, 1024).await.unwrap();
        assert_eq!(file.name, "tent.png");
        assert_eq!(file.content_type, "image/png");
        assert_eq!(file.size(), 16);
        assert_eq!(file.data.len(), 16);
    }

    #[tokio::test]
    async fn candidate_from_path_skips_reading_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panorama.jpg");
        let sparse = std::fs::File::create(&path).unwrap();
        sparse.set_len(4 * 1024 * 1024 * 1024).unwrap();

        let file = CandidateFile::from_path(&path, 10 * 1024 * 1024).await.unwrap();
        assert_eq!(file.size(), 4 * 1024 * 1024 * 1024);
        assert!(file.data.is_empty());
        assert_eq!(file.fingerprint().size, 4 * 1024 * 1024 * 1024);
    }
}
