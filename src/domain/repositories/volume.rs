//! Volume buffer trait
//!
//! A volume is the whole input exposed as one contiguous, read-only byte
//! slice. Offsets reported anywhere in the crate are offsets into it.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when opening or reading a volume
#[derive(Error, Debug)]
pub enum VolumeError {
    #[error("Volume not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not a regular file: {0}")]
    NotAFile(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to map {path}: {source}")]
    Map {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid range: {offset}+{length} exceeds volume size {size}")]
    InvalidRange {
        offset: usize,
        length: usize,
        size: usize,
    },
}

impl VolumeError {
    /// Classifies an I/O failure on `path`
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let shown = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => VolumeError::NotFound(shown),
            io::ErrorKind::PermissionDenied => VolumeError::PermissionDenied(shown),
            _ => VolumeError::Io {
                path: shown,
                source: err,
            },
        }
    }
}

/// Read-only view of a whole volume
///
/// Implementations may map the file or read it into memory; callers only
/// ever see a `&[u8]` that stays valid for the lifetime of the buffer.
///
/// # Example
///
/// ```no_run
/// use carvex::domain::repositories::VolumeBuffer;
/// use carvex::infrastructure::MmapVolume;
/// use std::path::Path;
///
/// let volume = MmapVolume::open(Path::new("disk.img"))?;
/// println!("{} bytes", volume.size());
/// # Ok::<(), carvex::domain::repositories::VolumeError>(())
/// ```
pub trait VolumeBuffer: Send + Sync {
    /// Opens the volume at `path`
    fn open(path: &Path) -> Result<Self, VolumeError>
    where
        Self: Sized;

    /// The whole volume
    fn bytes(&self) -> &[u8];

    /// Where the volume was opened from
    fn path(&self) -> &Path;

    /// Total size in bytes
    fn size(&self) -> u64 {
        self.bytes().len() as u64
    }

    /// Borrows `length` bytes starting at `offset`
    fn slice_at(&self, offset: usize, length: usize) -> Result<&[u8], VolumeError> {
        let bytes = self.bytes();
        offset
            .checked_add(length)
            .and_then(|end| bytes.get(offset..end))
            .ok_or(VolumeError::InvalidRange {
                offset,
                length,
                size: bytes.len(),
            })
    }
}
