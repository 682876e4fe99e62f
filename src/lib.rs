//! carvex
//!
//! Signature-based carving of image files (JPEG, PNG, GIF, BMP, WEBP) from
//! raw volume images.
//!
//! Layers follow the usual split: `domain` holds the format data and the
//! locate/validate services, `infrastructure` the volume readers and the
//! artifact writer, `application` the orchestrator that ties them together.
//!
//! ```no_run
//! use carvex::{CarveConfig, CarveOrchestrator, LocalArtifactWriter, MmapVolume};
//! use std::path::Path;
//!
//! let config = CarveConfig::default().with_output_dir("recovered");
//! let mut orchestrator = CarveOrchestrator::from_config(&config)?;
//! let report = orchestrator.run::<MmapVolume, _, _>(Path::new("disk.img"), || {
//!     LocalArtifactWriter::new(&config.output_dir, config.write_options())
//! })?;
//! println!("{}", report.summary());
//! # Ok::<(), carvex::CarveError>(())
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod presentation;

pub use application::dto::{ArtifactRecord, CarveReport, FormatTally};
pub use application::{CarveError, CarveOrchestrator, CarveProgress, CarveState};
pub use config::{CarveConfig, CatalogKind, ConfigError, ReadMode, ScanStrategy};
pub use domain::entities::{Candidate, FormatId, FormatSpec, RecoveredObject};
pub use domain::services::{BoundaryLocator, FormatCatalog, SignatureIndex, StructuralValidator};
pub use infrastructure::{InMemoryVolume, LocalArtifactWriter, MmapVolume};
