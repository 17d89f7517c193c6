//! In-memory implementation of the index read contract.
//!
//! Holds term postings and numeric doc values per segment. It is the reference
//! host for tests and benchmarks, and small enough to back an embedded index.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, SpatialError};
use crate::field::SpatialFields;
use crate::reader::{
    IndexReader, NO_MORE_DOCS, NumericDocValues, PostingIterator, SegmentContext, SegmentReader,
};

/// Posting iterator over a sorted, de-duplicated list of document ids.
#[derive(Debug)]
pub struct MemoryPostingIterator {
    docs: Arc<Vec<u64>>,
    position: usize,
    started: bool,
}

impl MemoryPostingIterator {
    /// Create an iterator positioned before the first document.
    pub fn new(docs: Arc<Vec<u64>>) -> Self {
        MemoryPostingIterator {
            docs,
            position: 0,
            started: false,
        }
    }
}

impl PostingIterator for MemoryPostingIterator {
    fn doc_id(&self) -> u64 {
        if self.started && self.position < self.docs.len() {
            self.docs[self.position]
        } else {
            NO_MORE_DOCS
        }
    }

    fn next(&mut self) -> Result<bool> {
        if !self.started {
            self.started = true;
        } else if self.position < self.docs.len() {
            self.position += 1;
        }
        Ok(self.position < self.docs.len())
    }

    fn skip_to(&mut self, target: u64) -> Result<bool> {
        self.started = true;
        while self.position < self.docs.len() && self.docs[self.position] < target {
            self.position += 1;
        }
        Ok(self.position < self.docs.len())
    }

    fn cost(&self) -> u64 {
        self.docs.len() as u64
    }
}

/// Column of numeric values; `None` for documents without a value.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocValues {
    values: Vec<Option<f64>>,
}

impl MemoryDocValues {
    /// Store the coordinate of `doc_id`; documents skipped on the way stay empty.
    pub fn set(&mut self, doc_id: u64, value: f64) {
        let doc_id = doc_id as usize;
        if doc_id >= self.values.len() {
            self.values.resize(doc_id + 1, None);
        }

        self.values[doc_id] = Some(value);
    }

    /// Number of document slots, including empty ones.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl NumericDocValues for MemoryDocValues {
    fn get(&self, doc_id: u64) -> Option<f64> {
        self.values.get(doc_id as usize).copied().flatten()
    }
}

/// An immutable in-memory segment.
#[derive(Debug, Default)]
pub struct MemorySegment {
    max_doc: u64,
    /// field -> term -> sorted doc ids
    postings: HashMap<String, HashMap<String, Arc<Vec<u64>>>>,
    numeric: HashMap<String, Arc<MemoryDocValues>>,
}

impl SegmentReader for MemorySegment {
    fn max_doc(&self) -> u64 {
        self.max_doc
    }

    fn postings(&self, field: &str, term: &str) -> Result<Option<Box<dyn PostingIterator>>> {
        Ok(self
            .postings
            .get(field)
            .and_then(|terms| terms.get(term))
            .map(|docs| {
                Box::new(MemoryPostingIterator::new(Arc::clone(docs))) as Box<dyn PostingIterator>
            }))
    }

    fn numeric_values(&self, field: &str) -> Result<Option<Arc<dyn NumericDocValues>>> {
        Ok(self
            .numeric
            .get(field)
            .map(|values| Arc::clone(values) as Arc<dyn NumericDocValues>))
    }
}

/// Builder accumulating documents for a [`MemorySegment`].
#[derive(Debug, Default)]
pub struct MemorySegmentBuilder {
    max_doc: u64,
    postings: HashMap<String, HashMap<String, Vec<u64>>>,
    numeric: HashMap<String, MemoryDocValues>,
}

impl MemorySegmentBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next local document id.
    pub fn new_document(&mut self) -> u64 {
        let doc_id = self.max_doc;
        self.max_doc += 1;
        doc_id
    }

    /// Add a document carrying the given spatial fields and return its local id.
    pub fn add_spatial_document(&mut self, fields: &SpatialFields) -> u64 {
        let doc_id = self.new_document();
        for (field, term) in &fields.terms {
            self.push_term(doc_id, field, term);
        }
        for (field, value) in &fields.numeric {
            self.push_numeric(doc_id, field, *value);
        }
        doc_id
    }

    /// Index `term` in `field` for an existing document.
    pub fn add_term(&mut self, doc_id: u64, field: &str, term: &str) -> Result<()> {
        self.check_doc(doc_id)?;
        self.push_term(doc_id, field, term);
        Ok(())
    }

    /// Store a numeric value in `field` for an existing document.
    pub fn add_numeric(&mut self, doc_id: u64, field: &str, value: f64) -> Result<()> {
        self.check_doc(doc_id)?;
        self.push_numeric(doc_id, field, value);
        Ok(())
    }

    /// Freeze the segment.
    pub fn build(self) -> MemorySegment {
        let postings = self
            .postings
            .into_iter()
            .map(|(field, terms)| {
                let terms = terms
                    .into_iter()
                    .map(|(term, mut docs)| {
                        docs.sort_unstable();
                        docs.dedup();
                        (term, Arc::new(docs))
                    })
                    .collect();
                (field, terms)
            })
            .collect();
        let numeric = self
            .numeric
            .into_iter()
            .map(|(field, values)| (field, Arc::new(values)))
            .collect();

        MemorySegment {
            max_doc: self.max_doc,
            postings,
            numeric,
        }
    }

    fn check_doc(&self, doc_id: u64) -> Result<()> {
        if doc_id >= self.max_doc {
            return Err(SpatialError::invalid_argument(format!(
                "document {doc_id} was not allocated (segment has {} documents)",
                self.max_doc
            )));
        }
        Ok(())
    }

    fn push_term(&mut self, doc_id: u64, field: &str, term: &str) {
        self.postings
            .entry(field.to_string())
            .or_default()
            .entry(term.to_string())
            .or_default()
            .push(doc_id);
    }

    fn push_numeric(&mut self, doc_id: u64, field: &str, value: f64) {
        self.numeric
            .entry(field.to_string())
            .or_default()
            .set(doc_id, value);
    }
}

/// An in-memory index: an ordered list of segments.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    segments: Vec<MemorySegment>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment; its documents follow those of earlier segments.
    pub fn add_segment(&mut self, segment: MemorySegment) {
        self.segments.push(segment);
    }

    /// Get the number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

impl IndexReader for MemoryIndex {
    fn segments(&self) -> Vec<SegmentContext<'_>> {
        let mut doc_base = 0;
        self.segments
            .iter()
            .map(|segment| {
                let ctx = SegmentContext::new(segment as &dyn SegmentReader, doc_base);
                doc_base += segment.max_doc;
                ctx
            })
            .collect()
    }
}
