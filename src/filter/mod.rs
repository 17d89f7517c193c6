//! Candidate filters.
//!
//! A filter is a stage that narrows a per-segment candidate set: it receives the
//! documents still in play and returns the subset it accepts. Stages compose into
//! a [`FilterChain`], which starts from every document of the segment and applies
//! its stages in order. The spatial filters ([`CellFilter`], [`DistanceFilter`])
//! and the host primitives ([`MatchAllFilter`], [`BooleanFilter`],
//! [`NumericRangeFilter`]) all share this shape.

pub mod boolean;
pub mod cell;
pub mod distance;
pub mod range;

use std::fmt::Debug;

use bit_vec::BitVec;

use crate::error::Result;
use crate::reader::SegmentReader;

pub use self::boolean::{BooleanFilter, Occur};
pub use self::cell::CellFilter;
pub use self::distance::DistanceFilter;
pub use self::range::NumericRangeFilter;

/// Set of local document ids of one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSet {
    bits: BitVec,
}

impl DocSet {
    /// Every document of a segment with `max_doc` documents.
    pub fn all(max_doc: u64) -> Self {
        DocSet {
            bits: BitVec::from_elem(max_doc as usize, true),
        }
    }

    /// No document of a segment with `max_doc` documents.
    pub fn empty(max_doc: u64) -> Self {
        DocSet {
            bits: BitVec::from_elem(max_doc as usize, false),
        }
    }

    /// Size of the id space.
    pub fn max_doc(&self) -> u64 {
        self.bits.len() as u64
    }

    /// Add a document; ids outside the id space are ignored.
    pub fn insert(&mut self, doc_id: u64) {
        if doc_id < self.max_doc() {
            self.bits.set(doc_id as usize, true);
        }
    }

    /// Check if a document is in the set.
    pub fn contains(&self, doc_id: u64) -> bool {
        self.bits.get(doc_id as usize).unwrap_or(false)
    }

    /// Keep only documents also in `other`.
    pub fn intersect_with(&mut self, other: &DocSet) {
        debug_assert_eq!(self.max_doc(), other.max_doc());
        self.bits.and(&other.bits);
    }

    /// Add every document of `other`.
    pub fn union_with(&mut self, other: &DocSet) {
        debug_assert_eq!(self.max_doc(), other.max_doc());
        self.bits.or(&other.bits);
    }

    /// Keep only documents for which `keep` returns true.
    pub fn retain<F: FnMut(u64) -> bool>(&mut self, mut keep: F) {
        for doc_id in 0..self.bits.len() {
            if self.bits[doc_id] && !keep(doc_id as u64) {
                self.bits.set(doc_id, false);
            }
        }
    }

    /// Number of documents in the set.
    pub fn len(&self) -> usize {
        self.bits.iter().filter(|bit| *bit).count()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.bits.none()
    }

    /// Documents in increasing id order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(doc_id, bit)| bit.then_some(doc_id as u64))
    }
}

/// A stage narrowing candidate documents of a segment.
pub trait Filter: Send + Sync + Debug {
    /// Return the subset of `candidates` this filter accepts.
    fn apply(&self, segment: &dyn SegmentReader, candidates: DocSet) -> Result<DocSet>;

    /// Get a human-readable description of this filter.
    fn description(&self) -> String;

    /// Clone this filter.
    fn clone_box(&self) -> Box<dyn Filter>;

    /// Accepted documents of the whole segment.
    fn doc_set(&self, segment: &dyn SegmentReader) -> Result<DocSet> {
        self.apply(segment, DocSet::all(segment.max_doc()))
    }
}

impl Clone for Box<dyn Filter> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Accepts every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchAllFilter;

impl Filter for MatchAllFilter {
    fn apply(&self, _segment: &dyn SegmentReader, candidates: DocSet) -> Result<DocSet> {
        Ok(candidates)
    }

    fn description(&self) -> String {
        "*:*".to_string()
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(*self)
    }
}

/// Stages applied in order, each seeing only what the previous ones kept.
///
/// An empty chain accepts everything.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    stages: Vec<Box<dyn Filter>>,
}

impl FilterChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage.
    pub fn then<F: Filter + 'static>(mut self, filter: F) -> Self {
        self.stages.push(Box::new(filter));
        self
    }

    /// Append a boxed stage.
    pub fn then_boxed(mut self, filter: Box<dyn Filter>) -> Self {
        self.stages.push(filter);
        self
    }

    /// Get the stages.
    pub fn stages(&self) -> &[Box<dyn Filter>] {
        &self.stages
    }
}

impl Filter for FilterChain {
    fn apply(&self, segment: &dyn SegmentReader, candidates: DocSet) -> Result<DocSet> {
        let mut current = candidates;
        for stage in &self.stages {
            if current.is_empty() {
                break;
            }
            current = stage.apply(segment, current)?;
        }
        Ok(current)
    }

    fn description(&self) -> String {
        let stages: Vec<String> = self.stages.iter().map(|stage| stage.description()).collect();
        format!("[{}]", stages.join(" -> "))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::memory::{MemorySegment, MemorySegmentBuilder};

    fn segment_with(docs: u64) -> MemorySegment {
        let mut builder = MemorySegmentBuilder::new();
        for _ in 0..docs {
            builder.new_document();
        }
        builder.build()
    }

    /// Keeps even document ids.
    #[derive(Debug, Clone)]
    struct EvenFilter;

    impl Filter for EvenFilter {
        fn apply(&self, _segment: &dyn SegmentReader, mut candidates: DocSet) -> Result<DocSet> {
            candidates.retain(|doc_id| doc_id % 2 == 0);
            Ok(candidates)
        }

        fn description(&self) -> String {
            "even".to_string()
        }

        fn clone_box(&self) -> Box<dyn Filter> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_doc_set_operations() {
        let mut a = DocSet::empty(8);
        a.insert(1);
        a.insert(3);
        a.insert(100);
        assert_eq!(a.len(), 2);
        assert!(a.contains(3));
        assert!(!a.contains(100));

        let mut b = DocSet::empty(8);
        b.insert(3);
        b.insert(5);

        let mut union = a.clone();
        union.union_with(&b);
        assert_eq!(union.iter().collect::<Vec<_>>(), vec![1, 3, 5]);

        a.intersect_with(&b);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![3]);

        assert!(DocSet::empty(4).is_empty());
        assert_eq!(DocSet::all(4).len(), 4);
    }

    #[test]
    fn test_chain_applies_stages_in_order() -> Result<()> {
        let segment = segment_with(6);

        let chain = FilterChain::new().then(MatchAllFilter).then(EvenFilter);
        let docs = chain.doc_set(&segment)?;
        assert_eq!(docs.iter().collect::<Vec<_>>(), vec![0, 2, 4]);
        assert_eq!(chain.description(), "[*:* -> even]");

        let empty = FilterChain::new();
        assert_eq!(empty.doc_set(&segment)?.len(), 6);
        Ok(())
    }

    #[test]
    fn test_boxed_filters_clone() -> Result<()> {
        let segment = segment_with(4);
        let filter: Box<dyn Filter> = Box::new(FilterChain::new().then(EvenFilter));
        let copy = filter.clone();
        assert_eq!(copy.doc_set(&segment)?, filter.doc_set(&segment)?);
        Ok(())
    }
}
