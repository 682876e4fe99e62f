//! Local artifact writer
//!
//! Writes carved objects to a directory on the local filesystem, one file
//! per object, named by sequence index.

use crate::domain::entities::FormatId;
use crate::domain::repositories::{
    ArtifactWriteError, ArtifactWriter, SavedArtifact, WriteOptions, artifact_file_name,
};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Local file system writer
pub struct LocalArtifactWriter {
    output_dir: PathBuf,
    options: WriteOptions,
    files_written: AtomicUsize,
    bytes_written: AtomicU64,
}

impl LocalArtifactWriter {
    /// Creates the writer, creating `output_dir` if needed
    ///
    /// With `overwrite` off, a directory that already holds artifacts under
    /// the same prefix is refused up front. Indices restart at 0 on every
    /// run, so the first collision would otherwise block its whole format.
    pub fn new(output_dir: &Path, options: WriteOptions) -> Result<Self, ArtifactWriteError> {
        fs::create_dir_all(output_dir).map_err(|e| ArtifactWriteError::from_io(output_dir, e))?;
        if !output_dir.is_dir() {
            return Err(ArtifactWriteError::DirectoryNotFound(
                output_dir.display().to_string(),
            ));
        }

        if !options.overwrite {
            if let Some(existing) = find_existing_artifact(output_dir, &options)? {
                return Err(ArtifactWriteError::AlreadyExists(
                    existing.display().to_string(),
                ));
            }
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            options,
            files_written: AtomicUsize::new(0),
            bytes_written: AtomicU64::new(0),
        })
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Path the artifact with this index would be written to
    pub fn artifact_path(&self, format: FormatId, sequence_index: u64) -> PathBuf {
        let mut path = self.output_dir.clone();
        if self.options.organize_by_type {
            path.push(format.extension());
        }
        path.push(artifact_file_name(
            &self.options.filename_prefix,
            sequence_index,
            format,
        ));
        path
    }

    fn open_target(&self, path: &Path) -> Result<File, ArtifactWriteError> {
        let mut open = OpenOptions::new();
        open.write(true);
        if self.options.overwrite {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }
        open.open(path)
            .map_err(|e| ArtifactWriteError::from_io(path, e))
    }
}

/// First file under `output_dir` named like `<prefix>_<N>.<ext>`
fn find_existing_artifact(
    output_dir: &Path,
    options: &WriteOptions,
) -> Result<Option<PathBuf>, ArtifactWriteError> {
    let mut dirs = vec![output_dir.to_path_buf()];
    if options.organize_by_type {
        dirs.extend(
            FormatId::ALL
                .iter()
                .map(|format| output_dir.join(format.extension()))
                .filter(|dir| dir.is_dir()),
        );
    }

    for dir in dirs {
        let entries = fs::read_dir(&dir).map_err(|e| ArtifactWriteError::from_io(&dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| ArtifactWriteError::from_io(&dir, e))?;
            let name = entry.file_name();
            if is_artifact_name(&name.to_string_lossy(), &options.filename_prefix) {
                return Ok(Some(entry.path()));
            }
        }
    }
    Ok(None)
}

fn is_artifact_name(name: &str, prefix: &str) -> bool {
    let Some(rest) = name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };
    let Some((index, extension)) = rest.split_once('.') else {
        return false;
    };
    !index.is_empty()
        && index.bytes().all(|b| b.is_ascii_digit())
        && FormatId::ALL.iter().any(|f| f.extension() == extension)
}

impl ArtifactWriter for LocalArtifactWriter {
    fn save(
        &self,
        bytes: &[u8],
        format: FormatId,
        sequence_index: u64,
    ) -> Result<SavedArtifact, ArtifactWriteError> {
        let path = self.artifact_path(format, sequence_index);

        if self.options.organize_by_type {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| ArtifactWriteError::from_io(parent, e))?;
            }
        }

        let mut file = self.open_target(&path)?;
        let written = file.write_all(bytes).and_then(|()| file.sync_all());
        if let Err(e) = written {
            drop(file);
            // a half-written file must not survive under a valid name
            let _ = fs::remove_file(&path);
            return Err(ArtifactWriteError::from_io(&path, e));
        }

        let size = bytes.len() as u64;
        self.files_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(size, Ordering::Relaxed);

        Ok(SavedArtifact {
            path,
            bytes_written: size,
            sha256: hex::encode(Sha256::digest(bytes)),
        })
    }

    fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn files_written(&self) -> usize {
        self.files_written.load(Ordering::Relaxed)
    }

    fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }
}
