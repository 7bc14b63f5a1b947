//! Byte-level transfer progress.

use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt};

/// Bytes handed to the transport so far, out of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_sent: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    pub fn started(total_bytes: u64) -> Self {
        Self {
            bytes_sent: 0,
            total_bytes,
        }
    }

    pub fn completed(total_bytes: u64) -> Self {
        Self {
            bytes_sent: total_bytes,
            total_bytes,
        }
    }

    /// Integer percentage, clamped to 0..=100. An empty body counts as complete.
    pub fn percent(&self) -> u8 {
        if self.total_bytes == 0 {
            return 100;
        }
        let pct = self.bytes_sent.saturating_mul(100) / self.total_bytes;
        pct.min(100) as u8
    }
}

/// Progress sink handed to [`Storage::transfer`](crate::Storage::transfer).
pub type ProgressCallback = Arc<dyn Fn(TransferProgress) + Send + Sync>;

/// A callback that discards every event.
pub fn ignore_progress() -> ProgressCallback {
    Arc::new(|_| {})
}

/// Split `data` into chunks and report progress as each chunk is pulled by
/// the consumer.
pub fn chunked_with_progress(
    data: Bytes,
    chunk_size: usize,
    on_progress: ProgressCallback,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + Sync + 'static {
    let chunk_size = chunk_size.max(1);
    let total = data.len() as u64;
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
        .collect();

    let mut sent = 0u64;
    futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        on_progress(TransferProgress {
            bytes_sent: sent,
            total_bytes: total,
        });
        Ok(chunk)
    })
}
