//! Candidate and recovered object entities

use super::format::FormatId;
use serde::Serialize;
use std::ops::Range;

/// A byte range suspected, but not yet confirmed, to hold one object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    format: FormatId,
    start_offset: usize,
    end_offset: usize,
}

impl Candidate {
    pub fn new(format: FormatId, start_offset: usize, end_offset: usize) -> Self {
        debug_assert!(start_offset < end_offset);
        Self {
            format,
            start_offset,
            end_offset,
        }
    }

    pub fn format(&self) -> FormatId {
        self.format
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// Exclusive end of the range
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.start_offset..self.end_offset
    }

    /// Borrows the candidate's bytes out of the volume it was located in
    pub fn bytes<'v>(&self, volume: &'v [u8]) -> &'v [u8] {
        &volume[self.range()]
    }
}

/// A validated candidate that has been given a recovery index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveredObject {
    format: FormatId,
    sequence_index: u64,
    byte_range: Range<usize>,
}

impl RecoveredObject {
    pub fn new(candidate: &Candidate, sequence_index: u64) -> Self {
        Self {
            format: candidate.format(),
            sequence_index,
            byte_range: candidate.range(),
        }
    }

    pub fn format(&self) -> FormatId {
        self.format
    }

    pub fn sequence_index(&self) -> u64 {
        self.sequence_index
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.byte_range.clone()
    }

    pub fn size(&self) -> usize {
        self.byte_range.len()
    }
}

/// Hands out recovery indices, 0-based and monotonically increasing
///
/// The counter only moves when [`SequenceCounter::advance`] is called, so a
/// caller can peek the next index, try to persist, and commit on success.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SequenceCounter {
    next: u64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next successful save will receive
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Commits the peeked index and returns it
    pub fn advance(&mut self) -> u64 {
        let index = self.next;
        self.next += 1;
        index
    }

    /// Number of indices handed out so far
    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_slices_its_range() {
        let volume = b"..abcdef..";
        let candidate = Candidate::new(FormatId::Bmp, 2, 8);
        assert_eq!(candidate.bytes(volume), b"abcdef");
        assert_eq!(candidate.len(), 6);
    }

    #[test]
    fn counter_only_moves_on_advance() {
        let mut counter = SequenceCounter::new();
        assert_eq!(counter.peek(), 0);
        assert_eq!(counter.peek(), 0);
        assert_eq!(counter.advance(), 0);
        assert_eq!(counter.advance(), 1);
        assert_eq!(counter.peek(), 2);
        assert_eq!(counter.issued(), 2);
    }

    #[test]
    fn recovered_object_keeps_candidate_range() {
        let candidate = Candidate::new(FormatId::Png, 10, 90);
        let object = RecoveredObject::new(&candidate, 7);
        assert_eq!(object.byte_range(), 10..90);
        assert_eq!(object.sequence_index(), 7);
        assert_eq!(object.size(), 80);
    }
}
