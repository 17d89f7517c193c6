//! Field comparator ranking documents by distance for top-K sorting.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::Result;
use crate::field::{latitude_field_name, longitude_field_name};
use crate::geo::Point;
use crate::reader::{EmptyDocValues, NumericDocValues, SegmentContext, numeric_values_or_empty};

/// Compares documents by their distance to a center point.
///
/// A top-K sort keeps its current best documents in numbered slots. The
/// comparator stores the distance of each slot's document, remembers which slot
/// holds the current worst ("bottom") entry, and compares new documents against
/// it. Distances of incoming documents are computed from the raw coordinates on
/// every call; only slot values are kept.
///
/// Documents without coordinates sort last (infinite distance).
#[derive(Debug)]
pub struct DistanceComparator {
    center: Point,
    latitude_field: String,
    longitude_field: String,
    distances: Vec<f64>,
    bottom: f64,
    latitudes: Arc<dyn NumericDocValues>,
    longitudes: Arc<dyn NumericDocValues>,
}

impl DistanceComparator {
    /// Create a comparator with `num_hits` slots for the spatial field `field`.
    pub fn new(center: Point, field: &str, num_hits: usize) -> Self {
        Self::with_fields(
            center,
            latitude_field_name(field),
            longitude_field_name(field),
            num_hits,
        )
    }

    /// Create a comparator reading explicitly named coordinate fields.
    pub fn with_fields<L: Into<String>, G: Into<String>>(
        center: Point,
        latitude_field: L,
        longitude_field: G,
        num_hits: usize,
    ) -> Self {
        DistanceComparator {
            center,
            latitude_field: latitude_field.into(),
            longitude_field: longitude_field.into(),
            distances: vec![f64::INFINITY; num_hits],
            bottom: f64::INFINITY,
            latitudes: Arc::new(EmptyDocValues),
            longitudes: Arc::new(EmptyDocValues),
        }
    }

    /// Number of slots.
    pub fn num_slots(&self) -> usize {
        self.distances.len()
    }

    /// Bind the coordinate accessors of a new segment.
    pub fn set_next_segment(&mut self, ctx: &SegmentContext<'_>) -> Result<()> {
        self.latitudes = numeric_values_or_empty(ctx.reader, &self.latitude_field)?;
        self.longitudes = numeric_values_or_empty(ctx.reader, &self.longitude_field)?;
        Ok(())
    }

    /// Compare the documents held in two slots.
    pub fn compare(&self, slot_a: usize, slot_b: usize) -> Ordering {
        self.distances[slot_a].total_cmp(&self.distances[slot_b])
    }

    /// Mark `slot` as the current worst entry of the top-K set.
    pub fn set_bottom(&mut self, slot: usize) {
        self.bottom = self.distances[slot];
    }

    /// Compare the bottom entry with a document of the current segment.
    ///
    /// `Ordering::Greater` means the document is closer than the bottom and
    /// should replace it.
    pub fn compare_bottom(&self, local_doc: u64) -> Ordering {
        self.bottom.total_cmp(&self.distance_of(local_doc))
    }

    /// Store the distance of a document of the current segment in `slot`.
    pub fn copy(&mut self, slot: usize, local_doc: u64) {
        self.distances[slot] = self.distance_of(local_doc);
    }

    /// Distance held in `slot`.
    pub fn value(&self, slot: usize) -> f64 {
        self.distances[slot]
    }

    fn distance_of(&self, local_doc: u64) -> f64 {
        match (self.latitudes.get(local_doc), self.longitudes.get(local_doc)) {
            (Some(lat), Some(lon)) => self.center.distance_to(lat, lon),
            _ => f64::INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::memory::{MemorySegment, MemorySegmentBuilder};

    fn segment() -> Result<MemorySegment> {
        let mut builder = MemorySegmentBuilder::new();
        for lon in [2.0, 0.5, 1.0] {
            let doc = builder.new_document();
            builder.add_numeric(doc, "p_HSSI_Latitude", 0.0)?;
            builder.add_numeric(doc, "p_HSSI_Longitude", lon)?;
        }
        builder.new_document();
        Ok(builder.build())
    }

    #[test]
    fn test_slot_comparisons() -> Result<()> {
        let segment = segment()?;
        let mut comparator = DistanceComparator::new(Point::from_degrees(0.0, 0.0)?, "p", 2);
        comparator.set_next_segment(&SegmentContext::new(&segment, 0))?;

        comparator.copy(0, 0);
        comparator.copy(1, 1);
        assert_eq!(comparator.compare(0, 1), Ordering::Greater);
        assert_eq!(comparator.compare(1, 0), Ordering::Less);
        assert_eq!(comparator.compare(1, 1), Ordering::Equal);
        assert!((comparator.value(1) - 55.6).abs() < 0.1);
        Ok(())
    }

    #[test]
    fn test_compare_bottom() -> Result<()> {
        let segment = segment()?;
        let mut comparator = DistanceComparator::new(Point::from_degrees(0.0, 0.0)?, "p", 2);
        comparator.set_next_segment(&SegmentContext::new(&segment, 0))?;

        comparator.copy(0, 0);
        comparator.set_bottom(0);
        assert_eq!(comparator.compare_bottom(2), Ordering::Greater);
        assert_eq!(comparator.compare_bottom(0), Ordering::Equal);
        assert_eq!(comparator.compare_bottom(3), Ordering::Less);
        Ok(())
    }

    #[test]
    fn test_missing_field_sorts_last() -> Result<()> {
        let segment = segment()?;
        let mut comparator = DistanceComparator::new(Point::from_degrees(0.0, 0.0)?, "q", 1);
        comparator.set_next_segment(&SegmentContext::new(&segment, 0))?;
        comparator.copy(0, 1);
        assert_eq!(comparator.value(0), f64::INFINITY);
        Ok(())
    }
}
