//! Artifact writer trait
//!
//! Defines the interface for persisting validated candidates.

use crate::domain::entities::FormatId;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when saving an artifact
#[derive(Error, Debug)]
pub enum ArtifactWriteError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Storage full: {0}")]
    StorageFull(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ArtifactWriteError {
    /// Classifies an I/O failure on `path`
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let shown = path.display().to_string();
        match err.kind() {
            io::ErrorKind::PermissionDenied => ArtifactWriteError::PermissionDenied(shown),
            io::ErrorKind::NotFound => ArtifactWriteError::DirectoryNotFound(shown),
            io::ErrorKind::AlreadyExists => ArtifactWriteError::AlreadyExists(shown),
            io::ErrorKind::StorageFull => ArtifactWriteError::StorageFull(shown),
            _ => ArtifactWriteError::Io(err),
        }
    }
}

/// Options for writing artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Replace an existing file with the same name
    pub overwrite: bool,
    /// Write into one subdirectory per format extension
    pub organize_by_type: bool,
    /// Stem prefix of every artifact name
    pub filename_prefix: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            organize_by_type: false,
            filename_prefix: "recovered".to_string(),
        }
    }
}

/// A saved artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedArtifact {
    pub path: PathBuf,
    pub bytes_written: u64,
    /// Lowercase hex SHA-256 of the written bytes
    pub sha256: String,
}

/// Name of the artifact with the given sequence index
///
/// ```
/// use carvex::domain::entities::FormatId;
/// use carvex::domain::repositories::artifact_file_name;
///
/// assert_eq!(artifact_file_name("recovered", 3, FormatId::Png), "recovered_3.png");
/// ```
pub fn artifact_file_name(prefix: &str, sequence_index: u64, format: FormatId) -> String {
    format!("{}_{}.{}", prefix, sequence_index, format.extension())
}

/// Trait for persisting carved objects
///
/// The caller owns the sequence index; a writer never invents one. A failed
/// save must leave no partially named artifact behind that a later index
/// could collide with.
pub trait ArtifactWriter: Send + Sync {
    /// Writes `bytes` as artifact number `sequence_index` of `format`
    fn save(
        &self,
        bytes: &[u8],
        format: FormatId,
        sequence_index: u64,
    ) -> Result<SavedArtifact, ArtifactWriteError>;

    /// Returns the output directory
    fn output_dir(&self) -> &Path;

    /// Returns the number of artifacts written so far
    fn files_written(&self) -> usize;

    /// Returns the total bytes written so far
    fn bytes_written(&self) -> u64;
}
