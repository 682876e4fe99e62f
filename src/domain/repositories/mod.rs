//! Repository traits (interfaces)
//!
//! Contracts for the two things the carver touches outside memory: the
//! volume it reads and the directory it writes artifacts into.

mod artifact_writer;
mod volume;

pub use artifact_writer::{
    ArtifactWriteError, ArtifactWriter, SavedArtifact, WriteOptions, artifact_file_name,
};
pub use volume::{VolumeBuffer, VolumeError};
