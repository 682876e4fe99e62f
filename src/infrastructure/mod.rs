//! Infrastructure layer
//!
//! Concrete implementations of the domain repositories: how volumes are
//! read and where artifacts land.

pub mod persistence;
pub mod volume;

pub use persistence::LocalArtifactWriter;
pub use volume::{InMemoryVolume, MmapVolume};
