//! Application layer
//!
//! The carve use case and the report it produces.

mod carve_volume;
pub mod dto;

pub use carve_volume::{CarveError, CarveOrchestrator, CarveProgress, CarveState, ProgressCallback};
