//! Shared fixtures for integration tests
//!
//! Small but structurally complete images. None of them contains another
//! format's start signature, and each holds exactly one copy of its own
//! end signature, at the very end.

#![allow(dead_code)]

use carvex::domain::repositories::{
    ArtifactWriteError, ArtifactWriter, SavedArtifact, WriteOptions,
};
use carvex::{FormatId, LocalArtifactWriter};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Baseline JFIF header stream, 16x16 (101 bytes)
pub const JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01,
    0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xDB, 0x00, 0x43,
    0x00, 0x08, 0x06, 0x06, 0x07, 0x06, 0x05, 0x08, 0x07, 0x07, 0x07, 0x09,
    0x09, 0x08, 0x0A, 0x0C, 0x14, 0x0D, 0x0C, 0x0B, 0x0B, 0x0C, 0x19, 0x12,
    0x13, 0x0F, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x10, 0x00, 0x10, 0x03,
    0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01, 0xFF, 0xC4, 0x00,
    0x1F, 0x00, 0x00, 0x01, 0x05, 0x01, 0x01, 0x01, 0x01, 0x01, 0x01, 0x00,
    0x00, 0x00, 0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00,
    0xD2, 0xCF, 0x20, 0xFF, 0xD9,
];

/// 1x1 grayscale PNG (67 bytes)
pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01,
    0x08, 0x00, 0x00, 0x00, 0x00, 0x3A, 0x7E, 0x9B, 0x55, 0x00, 0x00, 0x00,
    0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x60, 0x00, 0x00, 0x00,
    0x02, 0x00, 0x01, 0x48, 0xAF, 0xA4, 0x71, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// 1x1 GIF89a with a comment extension (79 bytes)
pub const GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00,
    0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x21, 0xF9, 0x04, 0x01, 0x00,
    0x00, 0x00, 0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00,
    0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x21, 0xFE, 0x20, 0x63, 0x61, 0x72,
    0x76, 0x65, 0x64, 0x20, 0x74, 0x65, 0x73, 0x74, 0x20, 0x66, 0x69, 0x78,
    0x74, 0x75, 0x72, 0x65, 0x20, 0x70, 0x61, 0x64, 0x64, 0x69, 0x6E, 0x67,
    0x20, 0x74, 0x65, 0x78, 0x74, 0x00, 0x3B,
];

/// Bytes that can never begin a start signature
pub fn is_neutral(byte: u8) -> bool {
    !matches!(byte, 0xFF | 0x89 | 0x47 | 0x42 | 0x52)
}

/// 1024 zeros, JPEG, 512 x FF, PNG, JPEG, 1024 zeros
pub fn scenario_volume() -> Vec<u8> {
    let mut volume = vec![0u8; 1024];
    volume.extend_from_slice(JPEG);
    volume.extend(std::iter::repeat_n(0xFF, 512));
    volume.extend_from_slice(PNG);
    volume.extend_from_slice(JPEG);
    volume.extend(std::iter::repeat_n(0u8, 1024));
    volume
}

/// A local writer whose first `failures` saves report a full disk
pub struct FlakyWriter {
    inner: LocalArtifactWriter,
    failures: AtomicUsize,
}

impl FlakyWriter {
    pub fn new(output_dir: &Path, failures: usize) -> Self {
        Self {
            inner: LocalArtifactWriter::new(output_dir, WriteOptions::default()).unwrap(),
            failures: AtomicUsize::new(failures),
        }
    }
}

impl ArtifactWriter for FlakyWriter {
    fn save(
        &self,
        bytes: &[u8],
        format: FormatId,
        sequence_index: u64,
    ) -> Result<SavedArtifact, ArtifactWriteError> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(ArtifactWriteError::StorageFull(format!(
                "index {sequence_index}"
            )));
        }
        self.inner.save(bytes, format, sequence_index)
    }

    fn output_dir(&self) -> &Path {
        self.inner.output_dir()
    }

    fn files_written(&self) -> usize {
        self.inner.files_written()
    }

    fn bytes_written(&self) -> u64 {
        self.inner.bytes_written()
    }
}

/// Sorted file names in `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
