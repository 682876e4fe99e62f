//! Domain entities
//!
//! Core business objects of the carving domain.

mod candidate;
mod format;

pub use candidate::{Candidate, RecoveredObject, SequenceCounter};
pub use format::{CatalogError, DEFAULT_MAX_OBJECT_SIZE, FormatId, FormatSpec, UnknownFormat};
