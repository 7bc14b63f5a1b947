//! Test fixtures: candidate files with fixed timestamps.

use campground_core::models::CandidateFile;
use chrono::{DateTime, TimeZone, Utc};

pub const MB: usize = 1024 * 1024;

fn fixed_time() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_718_000_000_000).unwrap()
}

/// JPEG magic bytes padded with zeros to `size`.
pub fn jpeg_bytes(size: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0];
    data.resize(size.max(4), 0);
    data.truncate(size);
    data
}

pub fn jpeg(name: &str, size: usize) -> CandidateFile {
    CandidateFile::new(name, "image/jpeg", fixed_time(), jpeg_bytes(size))
}

pub fn png(name: &str, size: usize) -> CandidateFile {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(size.max(8), 0);
    CandidateFile::new(name, "image/png", fixed_time(), data)
}

pub fn pdf(name: &str) -> CandidateFile {
    CandidateFile::new(
        name,
        "application/pdf",
        fixed_time(),
        b"%PDF-1.4\n%%EOF\n".to_vec(),
    )
}
