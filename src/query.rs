//! Proximity query assembly.
//!
//! A proximity search runs in two stages: a cheap coarse stage narrowing the
//! index to documents near the center, then the exact distance check over what
//! is left. [`SpatialQueryBuilder`] assembles both for a spatial field:
//!
//! - [`build`](SpatialQueryBuilder::build) uses cell id terms as the coarse stage;
//! - [`build_range`](SpatialQueryBuilder::build_range) uses latitude/longitude
//!   range checks over the bounding box of the search disk;
//! - [`build_exact`](SpatialQueryBuilder::build_exact) skips the coarse stage.
//!
//! All three return the same documents for the same arguments.
//!
//! # Example
//!
//! ```
//! use sarissa_spatial::config::SpatialConfig;
//! use sarissa_spatial::field::SpatialFieldWriter;
//! use sarissa_spatial::geo::Point;
//! use sarissa_spatial::memory::{MemoryIndex, MemorySegmentBuilder};
//! use sarissa_spatial::query::SpatialQueryBuilder;
//!
//! let config = SpatialConfig::default();
//! let writer = SpatialFieldWriter::new("location", config.clone()).unwrap();
//!
//! let mut builder = MemorySegmentBuilder::new();
//! for point in [(0.0, 0.0), (0.0, 0.1), (10.0, 10.0)] {
//!     builder.add_spatial_document(&writer.fields_for(&point).unwrap());
//! }
//! let mut index = MemoryIndex::new();
//! index.add_segment(builder.build());
//!
//! let center = Point::from_degrees(0.0, 0.0).unwrap();
//! let query = SpatialQueryBuilder::new(config).unwrap().build(center, 20.0, "location").unwrap();
//! let hits = query.execute(&index).unwrap();
//! assert_eq!(hits.iter().map(|hit| hit.doc_id).collect::<Vec<_>>(), vec![0, 1]);
//! ```

use log::{debug, warn};

use crate::cell::{MAX_COVER_CELLS, best_level_for_search_radius, cell_ids_covering, cover_size};
use crate::config::SpatialConfig;
use crate::error::Result;
use crate::field::{cell_field_name, latitude_field_name, longitude_field_name};
use crate::filter::{
    BooleanFilter, CellFilter, DistanceFilter, Filter, FilterChain, NumericRangeFilter,
};
use crate::geo::{BoundingBox, Point};
use crate::reader::IndexReader;
use crate::search::{DistanceCollector, DistanceComparator, DistanceHit, Searcher};

/// Builds proximity queries against fields indexed with a given configuration.
#[derive(Debug, Clone)]
pub struct SpatialQueryBuilder {
    config: SpatialConfig,
}

impl SpatialQueryBuilder {
    /// Create a builder; fails on an invalid configuration.
    pub fn new(config: SpatialConfig) -> Result<Self> {
        config.validate()?;
        Ok(SpatialQueryBuilder { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &SpatialConfig {
        &self.config
    }

    /// The cell level searched for a disk of `radius_km`.
    ///
    /// Picks the level whose cells are about the size of the disk's diameter,
    /// restricted to the levels present in the index.
    pub fn search_level(&self, radius_km: f64) -> u32 {
        let ideal = best_level_for_search_radius(2.0 * radius_km);
        let level = ideal.clamp(self.config.top_level, self.config.bottom_level);
        if ideal > self.config.bottom_level {
            warn!(
                "radius {radius_km}km wants cell level {ideal}, the index only goes down to {}",
                self.config.bottom_level
            );
        }
        level
    }

    /// Cell-based proximity query: cell id terms, then the distance check.
    ///
    /// When the indexed levels would need more than [`MAX_COVER_CELLS`] cells to
    /// cover the disk, the query is assembled from coordinate ranges instead
    /// (see [`build_range`](Self::build_range)) and carries no level.
    pub fn build(&self, center: Point, radius_km: f64, field: &str) -> Result<SpatialQuery> {
        let distance = DistanceFilter::new(center, radius_km, field)?;
        let bbox = BoundingBox::from_bounding_circle(&center, radius_km)?;

        let level = self.search_level(radius_km);
        let size = cover_size(self.config.encoding, &bbox, level)?;
        if size > MAX_COVER_CELLS {
            warn!(
                "covering {radius_km}km around {center:?} at level {level} takes {size} cells, \
                 using coordinate ranges"
            );
            return self.build_range(center, radius_km, field);
        }

        let cell_ids = cell_ids_covering(self.config.encoding, &bbox, level)?;
        debug!(
            "{} {} cells at level {level} cover {radius_km}km around {center:?}",
            cell_ids.len(),
            self.config.encoding.name()
        );

        let cells = CellFilter::new(cell_field_name(field, self.config.encoding, level), cell_ids);
        let filter = FilterChain::new().then(cells).then(distance);
        Ok(SpatialQuery::new(filter, center, radius_km, field, Some(level)))
    }

    /// Range-based proximity query: a bounding box check on the coordinate
    /// fields, then the distance check.
    pub fn build_range(&self, center: Point, radius_km: f64, field: &str) -> Result<SpatialQuery> {
        let distance = DistanceFilter::new(center, radius_km, field)?;
        let bbox = BoundingBox::from_bounding_circle(&center, radius_km)?;
        let filter = FilterChain::new()
            .then(bounding_box_filter(&bbox, field))
            .then(distance);
        Ok(SpatialQuery::new(filter, center, radius_km, field, None))
    }

    /// Distance check over every document.
    pub fn build_exact(&self, center: Point, radius_km: f64, field: &str) -> Result<SpatialQuery> {
        let filter = DistanceFilter::standalone(center, radius_km, field)?;
        Ok(SpatialQuery::new(filter, center, radius_km, field, None))
    }
}

/// Coordinate ranges matching the box; a wrapping box takes either of its halves.
fn bounding_box_filter(bbox: &BoundingBox, field: &str) -> BooleanFilter {
    let latitude_field = latitude_field_name(field);
    let longitude_field = longitude_field_name(field);

    let latitudes = NumericRangeFilter::new(
        latitude_field,
        bbox.lower_left().latitude(),
        bbox.upper_right().latitude(),
    );
    let filter = BooleanFilter::new().must(latitudes);

    let longitude_range = |half: &BoundingBox| {
        NumericRangeFilter::new(
            longitude_field.clone(),
            half.lower_left().longitude(),
            half.upper_right().longitude(),
        )
    };
    match bbox.split_at_antimeridian() {
        (east, Some(west)) => filter.must(
            BooleanFilter::new()
                .should(longitude_range(&east))
                .should(longitude_range(&west)),
        ),
        (whole, None) => filter.must(longitude_range(&whole)),
    }
}

/// An assembled proximity query.
#[derive(Debug, Clone)]
pub struct SpatialQuery {
    filter: FilterChain,
    center: Point,
    radius_km: f64,
    field: String,
    level: Option<u32>,
}

impl SpatialQuery {
    fn new(
        filter: FilterChain,
        center: Point,
        radius_km: f64,
        field: &str,
        level: Option<u32>,
    ) -> Self {
        SpatialQuery {
            filter,
            center,
            radius_km,
            field: field.to_string(),
            level,
        }
    }

    /// Get the filter chain.
    pub fn filter(&self) -> &FilterChain {
        &self.filter
    }

    /// Get the center point.
    pub fn center(&self) -> &Point {
        &self.center
    }

    /// Get the radius in kilometers.
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Get the spatial field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Cell level searched, if the query uses cells.
    pub fn level(&self) -> Option<u32> {
        self.level
    }

    /// A fresh collector recording distances for this query's field.
    pub fn collector(&self) -> DistanceCollector {
        DistanceCollector::new(self.center, &self.field)
    }

    /// A fresh comparator with `num_hits` slots for this query's field.
    pub fn comparator(&self, num_hits: usize) -> DistanceComparator {
        DistanceComparator::new(self.center, &self.field, num_hits)
    }

    /// Every matching document, nearest first.
    pub fn execute(&self, reader: &dyn IndexReader) -> Result<Vec<DistanceHit>> {
        debug!("executing {}", self.filter.description());
        let mut collector = self.collector();
        Searcher::new(reader).search(&self.filter, &mut collector)?;
        Ok(collector.hits_by_distance())
    }

    /// The `k` nearest matching documents, nearest first.
    pub fn top(&self, reader: &dyn IndexReader, k: usize) -> Result<Vec<DistanceHit>> {
        let mut comparator = self.comparator(k);
        Searcher::new(reader).top_by_distance(&self.filter, &mut comparator, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cell::CellEncoding;
    use crate::field::SpatialFieldWriter;
    use crate::memory::{MemoryIndex, MemorySegmentBuilder};

    fn index(config: &SpatialConfig, points: &[(f64, f64)]) -> Result<MemoryIndex> {
        let writer = SpatialFieldWriter::new("loc", config.clone())?;
        let mut builder = MemorySegmentBuilder::new();
        for point in points {
            builder.add_spatial_document(&writer.fields_for(point)?);
        }
        let mut index = MemoryIndex::new();
        index.add_segment(builder.build());
        Ok(index)
    }

    #[test]
    fn test_search_level_is_clamped() -> Result<()> {
        let builder = SpatialQueryBuilder::new(SpatialConfig::default())?;
        assert_eq!(builder.search_level(10.0), 10);
        assert_eq!(builder.search_level(0.001), 16);
        assert_eq!(builder.search_level(20_000.0), 0);

        let shallow = SpatialQueryBuilder::new(SpatialConfig {
            top_level: 3,
            bottom_level: 8,
            encoding: CellEncoding::QuadTree,
        })?;
        assert_eq!(shallow.search_level(20_000.0), 3);
        assert_eq!(shallow.search_level(10.0), 8);
        Ok(())
    }

    #[test]
    fn test_rejects_invalid_input() -> Result<()> {
        let bad = SpatialConfig {
            top_level: 5,
            bottom_level: 2,
            ..SpatialConfig::default()
        };
        assert!(SpatialQueryBuilder::new(bad).is_err());

        let builder = SpatialQueryBuilder::new(SpatialConfig::default())?;
        let center = Point::from_degrees(0.0, 0.0)?;
        assert!(builder.build(center, -1.0, "loc").is_err());
        assert!(builder.build_range(center, f64::NAN, "loc").is_err());
        assert!(builder.build_exact(center, f64::INFINITY, "loc").is_err());
        Ok(())
    }

    #[test]
    fn test_cell_query_shape() -> Result<()> {
        let builder = SpatialQueryBuilder::new(SpatialConfig::default())?;
        let query = builder.build(Point::from_degrees(0.0, 0.0)?, 20.0, "loc")?;

        let level = best_level_for_search_radius(2.0 * 20.0);
        assert_eq!(level, 9);
        assert_eq!(query.level(), Some(level));
        assert_eq!(query.field(), "loc");
        assert_eq!(query.filter().stages().len(), 2);
        assert!(query.filter().description().starts_with("[loc_HSSI_9:("));
        Ok(())
    }

    #[test]
    fn test_oversized_pole_cover_uses_ranges() -> Result<()> {
        let config = SpatialConfig {
            bottom_level: 24,
            encoding: CellEncoding::GridHash,
            ..SpatialConfig::default()
        };
        let index = index(&config, &[(90.0, 0.0), (89.99995, 100.0), (89.9, 0.0)])?;
        let builder = SpatialQueryBuilder::new(config)?;
        let center = Point::from_degrees(89.99999, 0.0)?;

        // Level 19 over every longitude would need 2^19 columns.
        assert_eq!(builder.search_level(0.02), 19);
        let query = builder.build(center, 0.02, "loc")?;
        assert_eq!(query.level(), None);

        let hits = query.execute(&index)?;
        assert_eq!(hits.iter().map(|hit| hit.doc_id).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(hits, builder.build_exact(center, 0.02, "loc")?.execute(&index)?);
        Ok(())
    }

    #[test]
    fn test_forced_fine_level_uses_ranges() -> Result<()> {
        let config = SpatialConfig {
            top_level: 16,
            bottom_level: 16,
            encoding: CellEncoding::QuadTree,
        };
        let index = index(&config, &[(0.0, 0.0), (3.0, 3.0), (5.0, 5.0)])?;
        let builder = SpatialQueryBuilder::new(config)?;
        let center = Point::from_degrees(0.0, 0.0)?;

        assert_eq!(builder.search_level(500.0), 16);
        let query = builder.build(center, 500.0, "loc")?;
        assert_eq!(query.level(), None);

        let hits = query.execute(&index)?;
        assert_eq!(hits.iter().map(|hit| hit.doc_id).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(hits, builder.build_exact(center, 500.0, "loc")?.execute(&index)?);
        Ok(())
    }

    #[test]
    fn test_range_query_splits_wrapping_box() -> Result<()> {
        let builder = SpatialQueryBuilder::new(SpatialConfig::default())?;
        let query = builder.build_range(Point::from_degrees(0.0, 179.9)?, 50.0, "loc")?;
        assert_eq!(query.level(), None);

        let description = query.filter().description();
        assert!(description.contains("loc_HSSI_Latitude:["), "{description}");
        assert!(description.contains(" TO 180] loc_HSSI_Longitude:[-180 TO "), "{description}");

        let plain = builder.build_range(Point::from_degrees(0.0, 0.0)?, 50.0, "loc")?;
        assert!(!plain.filter().description().contains("TO 180]"));
        Ok(())
    }

    #[test]
    fn test_assemblies_agree() -> Result<()> {
        let config = SpatialConfig::default();
        let points = [(0.0, 0.0), (0.0, 0.1), (10.0, 10.0), (0.1, -0.1), (0.0, 0.5)];
        let index = index(&config, &points)?;
        let builder = SpatialQueryBuilder::new(config)?;
        let center = Point::from_degrees(0.0, 0.0)?;

        let cells = builder.build(center, 20.0, "loc")?.execute(&index)?;
        let ranges = builder.build_range(center, 20.0, "loc")?.execute(&index)?;
        let exact = builder.build_exact(center, 20.0, "loc")?.execute(&index)?;

        let ids: Vec<u64> = cells.iter().map(|hit| hit.doc_id).collect();
        assert_eq!(ids, vec![0, 1, 3]);
        assert_eq!(cells, ranges);
        assert_eq!(cells, exact);
        Ok(())
    }

    #[test]
    fn test_top_returns_nearest() -> Result<()> {
        let config = SpatialConfig::default();
        let index = index(&config, &[(0.0, 0.3), (0.0, 0.1), (0.0, 0.2), (5.0, 5.0)])?;
        let builder = SpatialQueryBuilder::new(config)?;

        let query = builder.build(Point::from_degrees(0.0, 0.0)?, 50.0, "loc")?;
        let top = query.top(&index, 2)?;
        assert_eq!(top.iter().map(|hit| hit.doc_id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(top, query.execute(&index)?[..2].to_vec());
        Ok(())
    }
}
