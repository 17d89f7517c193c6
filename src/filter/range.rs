//! Numeric range filter over doc values.

use log::trace;

use crate::error::Result;
use crate::filter::{DocSet, Filter};
use crate::reader::{SegmentReader, numeric_values_or_empty};

/// Keeps candidates whose numeric value in `field` lies within `[lower, upper]`.
///
/// Documents without a value never match; a field absent from the segment
/// matches nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRangeFilter {
    field: String,
    lower: f64,
    upper: f64,
}

impl NumericRangeFilter {
    /// Create a range filter with both bounds inclusive.
    pub fn new<S: Into<String>>(field: S, lower: f64, upper: f64) -> Self {
        NumericRangeFilter {
            field: field.into(),
            lower,
            upper,
        }
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Get the lower bound.
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Get the upper bound.
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Check if a value falls within the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

impl Filter for NumericRangeFilter {
    fn apply(&self, segment: &dyn SegmentReader, mut candidates: DocSet) -> Result<DocSet> {
        let values = numeric_values_or_empty(segment, &self.field)?;
        candidates.retain(|doc_id| values.get(doc_id).is_some_and(|value| self.contains(value)));
        trace!("{} kept {} documents", self.description(), candidates.len());
        Ok(candidates)
    }

    fn description(&self) -> String {
        format!("{}:[{} TO {}]", self.field, self.lower, self.upper)
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::memory::MemorySegmentBuilder;

    #[test]
    fn test_range_filter() -> Result<()> {
        let mut builder = MemorySegmentBuilder::new();
        for value in [-5.0, 0.0, 2.5, 10.0] {
            let doc = builder.new_document();
            builder.add_numeric(doc, "lat", value)?;
        }
        builder.new_document(); // no value
        let segment = builder.build();

        let filter = NumericRangeFilter::new("lat", 0.0, 10.0);
        assert_eq!(filter.doc_set(&segment)?.iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(filter.description(), "lat:[0 TO 10]");

        let point = NumericRangeFilter::new("lat", -5.0, -5.0);
        assert_eq!(point.doc_set(&segment)?.iter().collect::<Vec<_>>(), vec![0]);

        let missing = NumericRangeFilter::new("elevation", -1e9, 1e9);
        assert!(missing.doc_set(&segment)?.is_empty());
        Ok(())
    }
}
