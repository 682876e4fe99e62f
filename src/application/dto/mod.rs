//! Data Transfer Objects

mod carve_report;

pub use carve_report::{ArtifactRecord, CarveReport, FormatTally};
