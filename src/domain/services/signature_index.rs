//! Single-pass signature index
//!
//! Scans a volume once for the start signatures of every catalog format
//! using an Aho-Corasick automaton (O(n + m + z)), instead of one pass per
//! signature variant. Produces the same start sets as
//! [`BoundaryLocator::start_offsets`](super::BoundaryLocator::start_offsets).

use super::format_catalog::FormatCatalog;
use crate::domain::entities::{CatalogError, FormatId};
use aho_corasick::AhoCorasick;

/// Aho-Corasick automaton over all start signatures of a catalog
#[derive(Debug, Clone)]
pub struct SignatureIndex {
    matcher: AhoCorasick,
    /// Maps pattern index to the position of its format in the catalog
    pattern_map: Vec<usize>,
    formats: Vec<FormatId>,
}

impl SignatureIndex {
    /// Builds the automaton for every start signature in `catalog`
    pub fn new(catalog: &FormatCatalog) -> Result<Self, CatalogError> {
        let mut patterns: Vec<&[u8]> = Vec::new();
        let mut pattern_map = Vec::new();

        for (slot, spec) in catalog.specs().iter().enumerate() {
            for &signature in spec.start_signatures() {
                patterns.push(signature);
                pattern_map.push(slot);
            }
        }

        let matcher =
            AhoCorasick::new(&patterns).map_err(|e| CatalogError::Matcher(e.to_string()))?;

        Ok(Self {
            matcher,
            pattern_map,
            formats: catalog.all_format_ids().collect(),
        })
    }

    /// Number of patterns in the automaton
    pub fn pattern_count(&self) -> usize {
        self.pattern_map.len()
    }

    /// Start offsets per format, in catalog order
    ///
    /// Every occurrence is reported, including overlapping ones; each list is
    /// sorted ascending and free of duplicates.
    pub fn start_offsets_by_format(&self, volume: &[u8]) -> Vec<(FormatId, Vec<usize>)> {
        let mut starts: Vec<Vec<usize>> = vec![Vec::new(); self.formats.len()];

        for mat in self.matcher.find_overlapping_iter(volume) {
            let slot = self.pattern_map[mat.pattern().as_usize()];
            starts[slot].push(mat.start());
        }

        self.formats
            .iter()
            .copied()
            .zip(starts)
            .map(|(format, mut offsets)| {
                offsets.sort_unstable();
                offsets.dedup();
                (format, offsets)
            })
            .collect()
    }
}
