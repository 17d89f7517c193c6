//! Coarse spatial filter: cell id term lookup.

use log::trace;

use crate::error::Result;
use crate::filter::{DocSet, Filter};
use crate::reader::SegmentReader;

/// Keeps candidates carrying any of the given cell ids in `field`.
///
/// This is the cheap prefilter of a proximity search. Cells overhang the search
/// disk, so it lets through documents that are too far away; it never drops a
/// document inside the disk when the cells cover it.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFilter {
    field: String,
    cell_ids: Vec<String>,
}

impl CellFilter {
    /// Create a cell filter over a level-qualified cell field.
    pub fn new<S: Into<String>>(field: S, cell_ids: Vec<String>) -> Self {
        CellFilter {
            field: field.into(),
            cell_ids,
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the cell ids.
    pub fn cell_ids(&self) -> &[String] {
        &self.cell_ids
    }
}

impl Filter for CellFilter {
    fn apply(&self, segment: &dyn SegmentReader, candidates: DocSet) -> Result<DocSet> {
        let mut matched = DocSet::empty(candidates.max_doc());

        for cell_id in &self.cell_ids {
            let Some(mut postings) = segment.postings(&self.field, cell_id)? else {
                continue;
            };
            while postings.next()? {
                matched.insert(postings.doc_id());
            }
        }

        matched.intersect_with(&candidates);
        trace!(
            "{} cells in {} matched {} documents",
            self.cell_ids.len(),
            self.field,
            matched.len()
        );
        Ok(matched)
    }

    fn description(&self) -> String {
        format!("{}:({})", self.field, self.cell_ids.join(" OR "))
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
