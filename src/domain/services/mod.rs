//! Domain services
//!
//! The carving pipeline stages: locating candidate ranges and deciding
//! whether a candidate is plausibly the format it claims to be.

mod boundary_locator;
mod format_catalog;
mod signature_index;
mod structural_validator;

pub use boundary_locator::{BoundaryLocator, Location};
pub use format_catalog::FormatCatalog;
pub use signature_index::SignatureIndex;
pub use structural_validator::{DEFAULT_MIN_OBJECT_SIZE, StructuralValidator, Verdict};
