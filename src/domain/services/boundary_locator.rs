//! Boundary locator service
//!
//! Turns signature hits into candidate byte ranges. A start is bounded by
//! the first end signature inside its size window; formats without an end
//! signature are cut at the size cap or the end of the volume.

use crate::domain::entities::{Candidate, FormatSpec};
use memchr::memmem;

/// Result of bounding every start of one format
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Bounded candidates, ascending by start offset
    pub candidates: Vec<Candidate>,
    /// Distinct start offsets seen
    pub starts: usize,
    /// Starts with no end signature inside their window
    pub unbounded: usize,
}

/// Locates candidate objects of one format
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryLocator;

impl BoundaryLocator {
    pub fn new() -> Self {
        Self
    }

    /// Returns every candidate of `spec` in `volume`, ascending by start
    pub fn locate(&self, volume: &[u8], spec: &FormatSpec) -> Vec<Candidate> {
        self.locate_detailed(volume, spec).candidates
    }

    /// Like [`BoundaryLocator::locate`], keeping the diagnostic counts
    pub fn locate_detailed(&self, volume: &[u8], spec: &FormatSpec) -> Location {
        let starts = self.start_offsets(volume, spec);
        self.bound(volume, spec, &starts)
    }

    /// Finds every occurrence of every start signature
    ///
    /// Matches may overlap: after a hit at `p` the search resumes at `p + 1`.
    /// Offsets of all signature variants are merged, sorted and deduplicated.
    pub fn start_offsets(&self, volume: &[u8], spec: &FormatSpec) -> Vec<usize> {
        let mut starts = Vec::new();

        for signature in spec.start_signatures() {
            let finder = memmem::Finder::new(signature);
            let mut pos = 0;
            while let Some(hit) = finder.find(&volume[pos..]) {
                starts.push(pos + hit);
                pos += hit + 1;
            }
        }

        starts.sort_unstable();
        starts.dedup();
        starts
    }

    /// Bounds a sorted list of start offsets
    pub fn bound(&self, volume: &[u8], spec: &FormatSpec, starts: &[usize]) -> Location {
        let max_len = spec.max_object_len();
        let end_finder = spec.end_signature().map(memmem::Finder::new);

        let mut location = Location {
            candidates: Vec::with_capacity(starts.len()),
            starts: starts.len(),
            unbounded: 0,
        };

        for &start in starts {
            if start >= volume.len() {
                location.unbounded += 1;
                continue;
            }
            let window_end = start.saturating_add(max_len).min(volume.len());

            let end = match &end_finder {
                Some(finder) => finder
                    .find(&volume[start..window_end])
                    .map(|hit| start + hit + finder.needle().len()),
                None => Some(window_end),
            };

            match end {
                Some(end) => location
                    .candidates
                    .push(Candidate::new(spec.id(), start, end)),
                None => location.unbounded += 1,
            }
        }

        location
    }
}
