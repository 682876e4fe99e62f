//! Memory-mapped volume
//!
//! Zero-copy access to an image file. The kernel pages data in as the
//! locator walks it, so a multi-gigabyte image never has to fit in RAM.

use crate::domain::repositories::{VolumeBuffer, VolumeError};
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Volume backed by a read-only memory map
///
/// Zero-length files cannot be mapped on every platform; they are exposed
/// as an empty slice instead. Block devices report a metadata length of 0,
/// so their size is taken by seeking to the end.
pub struct MmapVolume {
    mmap: Option<Mmap>,
    path: PathBuf,
}

impl VolumeBuffer for MmapVolume {
    fn open(path: &Path) -> Result<Self, VolumeError> {
        let file = File::open(path).map_err(|e| VolumeError::from_io(path, e))?;
        let metadata = file.metadata().map_err(|e| VolumeError::from_io(path, e))?;

        if metadata.is_dir() {
            return Err(VolumeError::NotAFile(path.display().to_string()));
        }

        let mut handle = &file;
        let len = volume_len(&mut handle, metadata.is_file(), metadata.len())
            .map_err(|e| VolumeError::from_io(path, e))?;

        let mmap = if len == 0 {
            None
        } else {
            let len = usize::try_from(len).map_err(|_| VolumeError::Map {
                path: path.display().to_string(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "volume exceeds address space"),
            })?;
            // SAFETY: the map is read-only; concurrent truncation of the
            // image by another process is outside what the carver supports.
            let mmap = unsafe { MmapOptions::new().len(len).map(&file) }.map_err(|source| {
                VolumeError::Map {
                    path: path.display().to_string(),
                    source,
                }
            })?;
            Some(mmap)
        };

        Ok(Self {
            mmap,
            path: path.to_path_buf(),
        })
    }

    #[inline]
    fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Length of a volume source
///
/// Regular files trust their metadata. Anything else (block devices in
/// particular) is measured by seeking to the end, then rewound.
fn volume_len<S: Seek>(source: &mut S, is_file: bool, reported: u64) -> io::Result<u64> {
    if is_file {
        return Ok(reported);
    }
    let len = source.seek(SeekFrom::End(0))?;
    source.seek(SeekFrom::Start(0))?;
    Ok(len)
}

impl std::fmt::Debug for MmapVolume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapVolume")
            .field("path", &self.path)
            .field("size", &self.size())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn open_nonexistent() {
        let result = MmapVolume::open(Path::new("/nonexistent/volume.img"));
        assert!(matches!(result, Err(VolumeError::NotFound(_))));
    }

    #[test]
    fn maps_file_contents() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Hello, memory-mapped world!").unwrap();
        file.flush().unwrap();

        let volume = MmapVolume::open(file.path()).unwrap();
        assert_eq!(volume.size(), 27);
        assert_eq!(volume.slice_at(0, 5).unwrap(), b"Hello");
        assert!(volume.slice_at(20, 10).is_err());
    }

    #[test]
    fn empty_file_is_an_empty_volume() {
        let file = NamedTempFile::new().unwrap();
        let volume = MmapVolume::open(file.path()).unwrap();
        assert!(volume.bytes().is_empty());
        assert_eq!(volume.size(), 0);
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = MmapVolume::open(dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn device_length_comes_from_seeking() {
        let mut device = Cursor::new(vec![0xABu8; 65536]);
        device.set_position(4096);

        assert_eq!(volume_len(&mut device, false, 0).unwrap(), 65536);
        assert_eq!(device.position(), 0);
    }

    #[test]
    fn regular_file_length_comes_from_metadata() {
        let mut file = Cursor::new(vec![1u8; 10]);
        assert_eq!(volume_len(&mut file, true, 10).unwrap(), 10);
        assert_eq!(volume_len(&mut file, true, 0).unwrap(), 0);
    }
}
