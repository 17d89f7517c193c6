//! Read-side contract of the host index engine.
//!
//! The spatial subsystem never owns index storage. It reads term postings for
//! cell ids and numeric doc values for coordinates through these traits, one
//! segment at a time. Document ids handed to a [`SegmentReader`] are local to
//! that segment; [`SegmentContext::doc_base`] turns them into index-wide ids.

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;

/// Sentinel returned by [`PostingIterator::doc_id`] once the iterator is exhausted.
pub const NO_MORE_DOCS: u64 = u64::MAX;

/// Iterator over the documents carrying one term, in increasing id order.
pub trait PostingIterator: Send + Debug {
    /// Get the current document ID, or [`NO_MORE_DOCS`] when exhausted.
    fn doc_id(&self) -> u64;

    /// Move to the next document. Must be called once before the first `doc_id`.
    fn next(&mut self) -> Result<bool>;

    /// Skip to the first document >= target.
    fn skip_to(&mut self, target: u64) -> Result<bool>;

    /// Get the cost of iterating through this posting list.
    fn cost(&self) -> u64;
}

/// Per-segment column of numeric values, addressed by local document id.
pub trait NumericDocValues: Send + Sync + Debug {
    /// Value for a document, or `None` when the document has none.
    fn get(&self, doc_id: u64) -> Option<f64>;
}

/// Accessor for a field that does not exist on a segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyDocValues;

impl NumericDocValues for EmptyDocValues {
    fn get(&self, _doc_id: u64) -> Option<f64> {
        None
    }
}

/// Read access to one index segment.
pub trait SegmentReader: Send + Sync + Debug {
    /// Number of local document ids in this segment (`0..max_doc`).
    fn max_doc(&self) -> u64;

    /// Postings for a term, or `None` if the field or term is unknown.
    fn postings(&self, field: &str, term: &str) -> Result<Option<Box<dyn PostingIterator>>>;

    /// Numeric values of a field, or `None` if no document in the segment has it.
    fn numeric_values(&self, field: &str) -> Result<Option<Arc<dyn NumericDocValues>>>;
}

/// Numeric values of `field`, or an accessor with no values when the field is absent.
pub fn numeric_values_or_empty(
    segment: &dyn SegmentReader,
    field: &str,
) -> Result<Arc<dyn NumericDocValues>> {
    Ok(segment
        .numeric_values(field)?
        .unwrap_or_else(|| Arc::new(EmptyDocValues)))
}

/// A segment together with the offset of its first document in the whole index.
#[derive(Debug, Clone, Copy)]
pub struct SegmentContext<'a> {
    /// The segment.
    pub reader: &'a dyn SegmentReader,
    /// Index-wide id of local document 0.
    pub doc_base: u64,
}

impl<'a> SegmentContext<'a> {
    /// Create a segment context.
    pub fn new(reader: &'a dyn SegmentReader, doc_base: u64) -> Self {
        SegmentContext { reader, doc_base }
    }

    /// Index-wide id of a local document.
    pub fn global_doc(&self, local_doc: u64) -> u64 {
        self.doc_base + local_doc
    }
}

/// Read access to a whole index made of segments.
pub trait IndexReader: Send + Sync + Debug {
    /// The segments, in increasing `doc_base` order.
    fn segments(&self) -> Vec<SegmentContext<'_>>;

    /// Total number of document ids across all segments.
    fn max_doc(&self) -> u64 {
        self.segments().iter().map(|ctx| ctx.reader.max_doc()).sum()
    }
}
