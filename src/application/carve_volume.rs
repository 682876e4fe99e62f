//! Carve volume use case
//!
//! Drives one run over one volume: for each catalog format, locate
//! candidates, validate them, and hand the survivors to the writer. Sequence
//! indices are handed out in catalog order, then candidate order, whether or
//! not the locate/validate phase ran in parallel.

use crate::application::dto::{ArtifactRecord, CarveReport, FormatTally};
use crate::config::{CarveConfig, ConfigError, ScanStrategy};
use crate::domain::entities::{
    Candidate, CatalogError, FormatId, FormatSpec, RecoveredObject, SequenceCounter,
};
use crate::domain::repositories::{ArtifactWriteError, ArtifactWriter, VolumeBuffer, VolumeError};
use crate::domain::services::{
    BoundaryLocator, FormatCatalog, SignatureIndex, StructuralValidator, Verdict,
};
use rayon::prelude::*;
use std::fmt;
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum CarveError {
    #[error("failed to read volume: {0}")]
    VolumeRead(#[from] VolumeError),

    #[error("output directory unavailable: {0}")]
    OutputUnavailable(#[source] ArtifactWriteError),

    #[error("orchestrator is {0}, not idle")]
    NotIdle(CarveState),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Lifecycle of a [`CarveOrchestrator`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CarveState {
    Idle,
    Scanning { format: FormatId },
    Done { recovered: u64 },
    Failed { reason: String },
}

impl CarveState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CarveState::Done { .. } | CarveState::Failed { .. })
    }
}

impl fmt::Display for CarveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarveState::Idle => write!(f, "idle"),
            CarveState::Scanning { format } => write!(f, "scanning {}", format.extension()),
            CarveState::Done { recovered } => write!(f, "done ({recovered} recovered)"),
            CarveState::Failed { reason } => write!(f, "failed ({reason})"),
        }
    }
}

/// Snapshot passed to the progress callback after each format
#[derive(Debug, Clone)]
pub struct CarveProgress {
    pub format: FormatId,
    pub formats_done: usize,
    pub formats_total: usize,
    pub candidates: usize,
    pub validated: usize,
    pub total_recovered: u64,
}

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(&CarveProgress) + Send + Sync>;

/// Locate + validate output for one format
struct FormatPass {
    tally: FormatTally,
    accepted: Vec<Candidate>,
}

/// Single-use carving state machine
///
/// `Idle` moves to `Scanning` per format and ends in `Done`, or goes
/// straight to `Failed` when the volume cannot be read. Both terminal
/// states are final.
pub struct CarveOrchestrator {
    catalog: FormatCatalog,
    validator: StructuralValidator,
    locator: BoundaryLocator,
    strategy: ScanStrategy,
    parallel: bool,
    state: CarveState,
    counter: SequenceCounter,
    progress_callback: Option<ProgressCallback>,
}

impl CarveOrchestrator {
    pub fn new(catalog: FormatCatalog, validator: StructuralValidator) -> Self {
        Self {
            catalog,
            validator,
            locator: BoundaryLocator::new(),
            strategy: ScanStrategy::default(),
            parallel: false,
            state: CarveState::Idle,
            counter: SequenceCounter::new(),
            progress_callback: None,
        }
    }

    /// Builds an orchestrator from a validated config
    pub fn from_config(config: &CarveConfig) -> Result<Self, CarveError> {
        config.validate()?;
        Ok(Self::new(config.catalog()?, config.validator())
            .with_strategy(config.scan_strategy)
            .with_parallel(config.parallel))
    }

    pub fn with_strategy(mut self, strategy: ScanStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn state(&self) -> &CarveState {
        &self.state
    }

    pub fn catalog(&self) -> &FormatCatalog {
        &self.catalog
    }

    /// Number of artifacts saved so far
    pub fn recovered(&self) -> u64 {
        self.counter.issued()
    }

    /// Opens the volume at `path`, then the writer, then carves
    ///
    /// The writer is only opened once the volume is readable, so a bad
    /// volume path leaves the output location untouched.
    pub fn run<V, W, F>(&mut self, path: &Path, open_writer: F) -> Result<CarveReport, CarveError>
    where
        V: VolumeBuffer,
        W: ArtifactWriter,
        F: FnOnce() -> Result<W, ArtifactWriteError>,
    {
        self.ensure_idle()?;
        let volume = self.open_volume::<V>(path)?;
        let writer = match open_writer() {
            Ok(writer) => writer,
            Err(e) => {
                error!("Output unavailable: {}", e);
                self.state = CarveState::Failed {
                    reason: e.to_string(),
                };
                return Err(CarveError::OutputUnavailable(e));
            }
        };
        self.carve(&volume, &writer)
    }

    /// Opens the volume at `path` and reports what would be carved
    pub fn scan<V: VolumeBuffer>(&mut self, path: &Path) -> Result<CarveReport, CarveError> {
        self.ensure_idle()?;
        let volume = self.open_volume::<V>(path)?;
        self.dry_run(&volume)
    }

    /// Carves an already opened volume into `writer`
    pub fn carve(
        &mut self,
        volume: &dyn VolumeBuffer,
        writer: &dyn ArtifactWriter,
    ) -> Result<CarveReport, CarveError> {
        self.ensure_idle()?;
        let report = CarveReport::new(
            volume.path().to_path_buf(),
            Some(writer.output_dir().to_path_buf()),
        );
        self.execute(volume.bytes(), Some(writer), report)
    }

    /// Locates and validates without writing anything
    pub fn dry_run(&mut self, volume: &dyn VolumeBuffer) -> Result<CarveReport, CarveError> {
        self.ensure_idle()?;
        let report = CarveReport::new(volume.path().to_path_buf(), None);
        self.execute(volume.bytes(), None, report)
    }

    fn ensure_idle(&self) -> Result<(), CarveError> {
        match self.state {
            CarveState::Idle => Ok(()),
            ref other => Err(CarveError::NotIdle(other.clone())),
        }
    }

    fn open_volume<V: VolumeBuffer>(&mut self, path: &Path) -> Result<V, CarveError> {
        V::open(path).map_err(|e| {
            error!("Cannot read volume {}: {}", path.display(), e);
            self.state = CarveState::Failed {
                reason: e.to_string(),
            };
            CarveError::VolumeRead(e)
        })
    }

    fn execute(
        &mut self,
        bytes: &[u8],
        writer: Option<&dyn ArtifactWriter>,
        mut report: CarveReport,
    ) -> Result<CarveReport, CarveError> {
        let start_time = Instant::now();
        report.bytes_scanned = bytes.len() as u64;

        info!(
            "Carving {} bytes from {} for {} formats",
            bytes.len(),
            report.source.display(),
            self.catalog.len()
        );

        let starts = self.precomputed_starts(bytes)?;
        let validator = self.validator;
        let locator = self.locator;
        let examine = |slot: usize, spec: &FormatSpec| {
            let slot_starts = starts.as_ref().and_then(|all| all.get(slot));
            examine_format(bytes, spec, slot_starts, locator, validator)
        };

        let mut planned = SequenceCounter::new();
        let mut passes = if self.parallel {
            let specs = self.catalog.specs();
            specs
                .par_iter()
                .enumerate()
                .map(|(slot, spec)| examine(slot, spec))
                .collect::<Vec<_>>()
        } else {
            Vec::new()
        }
        .into_iter();

        let specs: Vec<FormatSpec> = self.catalog.specs().to_vec();
        let formats_total = specs.len();

        for (slot, spec) in specs.iter().enumerate() {
            let format = spec.id();
            self.state = CarveState::Scanning { format };

            let FormatPass { mut tally, accepted } =
                passes.next().unwrap_or_else(|| examine(slot, spec));

            for candidate in &accepted {
                match writer {
                    Some(writer) => self.persist(bytes, candidate, writer, &mut tally, &mut report),
                    None => {
                        let object = RecoveredObject::new(candidate, planned.advance());
                        report.artifacts.push(ArtifactRecord::planned(&object));
                    }
                }
            }

            info!(
                "{}: {} starts, {} candidates, {} validated, {} saved",
                format.extension(),
                tally.starts,
                tally.candidates,
                tally.validated,
                tally.saved
            );

            if let Some(callback) = &self.progress_callback {
                callback(&CarveProgress {
                    format,
                    formats_done: slot + 1,
                    formats_total,
                    candidates: tally.candidates,
                    validated: tally.validated,
                    total_recovered: self.counter.issued(),
                });
            }

            report.formats.push(tally);
        }

        self.state = CarveState::Done {
            recovered: self.counter.issued(),
        };
        report.duration = start_time.elapsed();

        info!(
            "Run complete: {} found, {} validated, {} saved in {:.2}s",
            report.total_found(),
            report.total_validated(),
            report.total_saved(),
            report.duration.as_secs_f64()
        );

        Ok(report)
    }

    /// Start offsets for every format from one automaton pass, if enabled
    fn precomputed_starts(&self, bytes: &[u8]) -> Result<Option<Vec<Vec<usize>>>, CarveError> {
        match self.strategy {
            ScanStrategy::PerFormat => Ok(None),
            ScanStrategy::SinglePass => {
                let index = SignatureIndex::new(&self.catalog)?;
                let starts = index
                    .start_offsets_by_format(bytes)
                    .into_iter()
                    .map(|(_, offsets)| offsets)
                    .collect();
                Ok(Some(starts))
            }
        }
    }

    fn persist(
        &mut self,
        bytes: &[u8],
        candidate: &Candidate,
        writer: &dyn ArtifactWriter,
        tally: &mut FormatTally,
        report: &mut CarveReport,
    ) {
        let index = self.counter.peek();
        match writer.save(candidate.bytes(bytes), candidate.format(), index) {
            Ok(saved) => {
                self.counter.advance();
                debug!(
                    "Saved {} bytes at {:#x} to {}",
                    saved.bytes_written,
                    candidate.start_offset(),
                    saved.path.display()
                );
                tally.saved += 1;
                tally.bytes_saved += saved.bytes_written;
                let object = RecoveredObject::new(candidate, index);
                report.artifacts.push(ArtifactRecord::saved(&object, saved));
            }
            Err(e) => {
                warn!(
                    "Failed to save {} candidate at {:#x}: {}",
                    candidate.format().extension(),
                    candidate.start_offset(),
                    e
                );
                tally.write_failures += 1;
                report.errors.push(format!(
                    "{} at offset {}: {}",
                    candidate.format().extension(),
                    candidate.start_offset(),
                    e
                ));
            }
        }
    }
}

fn examine_format(
    bytes: &[u8],
    spec: &FormatSpec,
    starts: Option<&Vec<usize>>,
    locator: BoundaryLocator,
    validator: StructuralValidator,
) -> FormatPass {
    let location = match starts {
        Some(starts) => locator.bound(bytes, spec, starts),
        None => locator.locate_detailed(bytes, spec),
    };

    let mut tally = FormatTally::new(spec.id());
    tally.starts = location.starts;
    tally.unbounded = location.unbounded;
    tally.candidates = location.candidates.len();

    let mut accepted = Vec::new();
    for candidate in location.candidates {
        match validator.check(candidate.bytes(bytes), spec.id()) {
            Verdict::Valid => {
                tally.validated += 1;
                accepted.push(candidate);
            }
            verdict => {
                debug!(
                    "Rejected {} candidate {:#x}..{:#x}: {}",
                    spec.id().extension(),
                    candidate.start_offset(),
                    candidate.end_offset(),
                    verdict.reason()
                );
                if verdict == Verdict::TooSmall {
                    tally.rejected_too_small += 1;
                } else {
                    tally.rejected_structure += 1;
                }
            }
        }
    }

    FormatPass { tally, accepted }
}
