/*!
 * Segment List
 * Stack of outstanding allocations, newest at the tail
 */

use super::types::Segment;

/// Append-only segment list with tail removal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentList {
    segments: Vec<Segment>,
}

impl SegmentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Remove and return the newest segment, `None` when empty
    pub fn pop_tail(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    /// Total simulated size of every outstanding segment, in KB
    pub fn total_size_kb(&self) -> usize {
        self.segments.iter().map(|s| s.size_kb).sum()
    }
}

impl<'a> IntoIterator for &'a SegmentList {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
