//! Buffered volume
//!
//! Reads the whole image into memory. Used where mapping is unavailable
//! (pipes, some network filesystems) and by tests that build volumes from
//! byte vectors.

use crate::domain::repositories::{VolumeBuffer, VolumeError};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct InMemoryVolume {
    data: Vec<u8>,
    path: PathBuf,
}

impl InMemoryVolume {
    /// Wraps bytes that did not come from a file
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            path: PathBuf::from("<memory>"),
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl VolumeBuffer for InMemoryVolume {
    fn open(path: &Path) -> Result<Self, VolumeError> {
        if path.is_dir() {
            return Err(VolumeError::NotAFile(path.display().to_string()));
        }
        let data = fs::read(path).map_err(|e| VolumeError::from_io(path, e))?;
        Ok(Self {
            data,
            path: path.to_path_buf(),
        })
    }

    fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
