//! Collector recording document coordinates for distance lookups.

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{Result, SpatialError};
use crate::field::{latitude_field_name, longitude_field_name};
use crate::geo::Point;
use crate::reader::{NumericDocValues, SegmentContext, numeric_values_or_empty};
use crate::search::DistanceHit;

/// Trait for collecting documents during a search pass.
///
/// `set_next_segment` is called before the documents of each segment are
/// collected; `collect` receives segment-local ids in increasing order.
pub trait Collector: Debug {
    /// Switch to a new segment.
    fn set_next_segment(&mut self, ctx: &SegmentContext<'_>) -> Result<()>;

    /// Collect a matching document of the current segment.
    fn collect(&mut self, local_doc: u64) -> Result<()>;
}

#[derive(Debug, Clone, Copy)]
struct CollectedPoint {
    doc_id: u64,
    latitude: f64,
    longitude: f64,
}

/// Records `(doc id, latitude, longitude)` of every collected document and
/// answers distance queries for them afterwards.
///
/// Lookups keep a cursor: results are usually read back in the order they were
/// collected, so the search starts just after the previous hit, scans forward,
/// and only wraps to the beginning when the id is not ahead.
#[derive(Debug)]
pub struct DistanceCollector {
    center: Point,
    latitude_field: String,
    longitude_field: String,
    points: Vec<CollectedPoint>,
    cursor: usize,
    doc_base: u64,
    latitudes: Option<Arc<dyn NumericDocValues>>,
    longitudes: Option<Arc<dyn NumericDocValues>>,
}

impl DistanceCollector {
    /// Create a collector for the spatial field `field`.
    pub fn new(center: Point, field: &str) -> Self {
        Self::with_fields(center, latitude_field_name(field), longitude_field_name(field))
    }

    /// Create a collector reading explicitly named coordinate fields.
    pub fn with_fields<L: Into<String>, G: Into<String>>(
        center: Point,
        latitude_field: L,
        longitude_field: G,
    ) -> Self {
        DistanceCollector {
            center,
            latitude_field: latitude_field.into(),
            longitude_field: longitude_field.into(),
            points: Vec::new(),
            cursor: 0,
            doc_base: 0,
            latitudes: None,
            longitudes: None,
        }
    }

    /// Get the center point.
    pub fn center(&self) -> &Point {
        &self.center
    }

    /// Number of collected documents.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distance in kilometers from the center to a collected document.
    ///
    /// Fails with an internal error if `doc_id` was never collected.
    pub fn distance(&mut self, doc_id: u64) -> Result<f64> {
        let index = self.find(doc_id).ok_or_else(|| {
            SpatialError::internal(format!(
                "document {doc_id} was not collected, its distance is unknown"
            ))
        })?;
        self.cursor = index + 1;

        let point = &self.points[index];
        Ok(self.center.distance_to(point.latitude, point.longitude))
    }

    /// Collected documents sorted by ascending distance, ties by doc id.
    pub fn hits_by_distance(&self) -> Vec<DistanceHit> {
        let mut hits: Vec<DistanceHit> = self
            .points
            .iter()
            .map(|point| DistanceHit {
                doc_id: point.doc_id,
                distance_km: self.center.distance_to(point.latitude, point.longitude),
            })
            .collect();
        hits.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });
        hits
    }

    fn find(&self, doc_id: u64) -> Option<usize> {
        let start = self.cursor.min(self.points.len());
        let (behind, ahead) = self.points.split_at(start);

        ahead
            .iter()
            .position(|point| point.doc_id == doc_id)
            .map(|offset| start + offset)
            .or_else(|| behind.iter().position(|point| point.doc_id == doc_id))
    }
}

impl Collector for DistanceCollector {
    fn set_next_segment(&mut self, ctx: &SegmentContext<'_>) -> Result<()> {
        self.doc_base = ctx.doc_base;
        self.latitudes = Some(numeric_values_or_empty(ctx.reader, &self.latitude_field)?);
        self.longitudes = Some(numeric_values_or_empty(ctx.reader, &self.longitude_field)?);
        Ok(())
    }

    fn collect(&mut self, local_doc: u64) -> Result<()> {
        let (Some(latitudes), Some(longitudes)) = (&self.latitudes, &self.longitudes) else {
            return Err(SpatialError::internal(
                "collect called before set_next_segment",
            ));
        };

        if let (Some(latitude), Some(longitude)) =
            (latitudes.get(local_doc), longitudes.get(local_doc))
        {
            self.points.push(CollectedPoint {
                doc_id: self.doc_base + local_doc,
                latitude,
                longitude,
            });
        }
        Ok(())
    }
}
