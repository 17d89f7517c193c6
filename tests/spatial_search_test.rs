//! End-to-end proximity searches over in-memory indexes.

use std::io::Write;

use sarissa_spatial::cell::{CellEncoding, best_level_for_search_radius};
use sarissa_spatial::prelude::*;
use sarissa_spatial::reader::SegmentContext;
use sarissa_spatial::search::Collector;
use tempfile::NamedTempFile;

const FIELD: &str = "location";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Index `points` into segments of at most `segment_size` documents.
fn build_index(
    config: &SpatialConfig,
    points: &[(f64, f64)],
    segment_size: usize,
) -> Result<MemoryIndex> {
    let writer = SpatialFieldWriter::new(FIELD, config.clone())?;
    let mut index = MemoryIndex::new();
    for chunk in points.chunks(segment_size) {
        let mut builder = MemorySegmentBuilder::new();
        for point in chunk {
            builder.add_spatial_document(&writer.fields_for(point)?);
        }
        index.add_segment(builder.build());
    }
    Ok(index)
}

fn doc_ids(hits: &[DistanceHit]) -> Vec<u64> {
    hits.iter().map(|hit| hit.doc_id).collect()
}

/// Runs the cell, range and exact assemblies and checks they agree.
fn search_all_ways(
    config: SpatialConfig,
    index: &MemoryIndex,
    center: Point,
    radius_km: f64,
) -> Result<Vec<DistanceHit>> {
    let builder = SpatialQueryBuilder::new(config)?;
    let cells = builder.build(center, radius_km, FIELD)?.execute(index)?;
    let ranges = builder.build_range(center, radius_km, FIELD)?.execute(index)?;
    let exact = builder.build_exact(center, radius_km, FIELD)?.execute(index)?;

    assert_eq!(cells, exact, "cell query disagrees with exact distances");
    assert_eq!(ranges, exact, "range query disagrees with exact distances");
    Ok(exact)
}

#[test]
fn test_nearby_points() -> Result<()> {
    init_logging();
    let config = SpatialConfig::default();
    let index = build_index(&config, &[(0.0, 0.0), (0.0, 0.1), (10.0, 10.0)], 10)?;

    let hits = search_all_ways(config, &index, Point::from_degrees(0.0, 0.0)?, 20.0)?;
    assert_eq!(doc_ids(&hits), vec![0, 1]);
    assert_eq!(hits[0].distance_km, 0.0);
    assert!((hits[1].distance_km - 11.1).abs() < 0.5);
    Ok(())
}

#[test]
fn test_grid_hash_encoding() -> Result<()> {
    init_logging();
    let config = SpatialConfig {
        encoding: CellEncoding::GridHash,
        ..SpatialConfig::default()
    };
    let index = build_index(&config, &[(0.0, 0.0), (0.0, 0.1), (10.0, 10.0)], 10)?;

    let builder = SpatialQueryBuilder::new(config.clone())?;
    let query = builder.build(Point::from_degrees(0.0, 0.0)?, 20.0, FIELD)?;
    let level = best_level_for_search_radius(2.0 * 20.0);
    assert_eq!(query.level(), Some(level));
    let prefix = format!("[location_HSSI_GRID_{level}:(");
    assert!(query.filter().description().starts_with(&prefix));

    let hits = search_all_ways(config, &index, Point::from_degrees(0.0, 0.0)?, 20.0)?;
    assert_eq!(doc_ids(&hits), vec![0, 1]);
    Ok(())
}

#[test]
fn test_results_span_segments() -> Result<()> {
    init_logging();
    let config = SpatialConfig::default();
    let points: Vec<(f64, f64)> = (0..30).map(|i| (0.0, i as f64 * 0.05)).collect();
    let index = build_index(&config, &points, 7)?;
    assert_eq!(index.segment_count(), 5);

    let hits = search_all_ways(config.clone(), &index, Point::from_degrees(0.0, 0.0)?, 60.0)?;
    assert_eq!(doc_ids(&hits), (0..=10).collect::<Vec<u64>>());

    let center = Point::from_degrees(0.0, 0.75)?;
    let query = SpatialQueryBuilder::new(config)?.build(center, 60.0, FIELD)?;
    let top = query.top(&index, 3)?;
    assert_eq!(top[0].doc_id, 15);
    let mut runners_up = doc_ids(&top[1..]);
    runners_up.sort_unstable();
    assert_eq!(runners_up, vec![14, 16]);
    Ok(())
}

#[test]
fn test_search_across_antimeridian() -> Result<()> {
    init_logging();
    let points = [(0.0, -179.95), (0.0, 179.8), (0.0, 170.0), (0.05, 180.0)];

    for encoding in [CellEncoding::QuadTree, CellEncoding::GridHash] {
        let config = SpatialConfig {
            encoding,
            ..SpatialConfig::default()
        };
        let index = build_index(&config, &points, 10)?;
        let hits = search_all_ways(config, &index, Point::from_degrees(0.0, 179.9)?, 20.0)?;

        let mut ids = doc_ids(&hits);
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 3], "{encoding:?}");
    }
    Ok(())
}

#[test]
fn test_search_near_pole() -> Result<()> {
    init_logging();
    let config = SpatialConfig::default();
    let points = [(89.95, 120.0), (89.9, -170.0), (80.0, 0.0), (90.0, 0.0)];
    let index = build_index(&config, &points, 10)?;

    let hits = search_all_ways(config, &index, Point::from_degrees(89.9, 0.0)?, 50.0)?;
    let mut ids = doc_ids(&hits);
    ids.sort_unstable();
    assert_eq!(ids, vec![0, 1, 3]);
    Ok(())
}

#[test]
fn test_random_points_agree_with_brute_force() -> Result<()> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    init_logging();
    let mut rng = StdRng::seed_from_u64(7);
    let points: Vec<(f64, f64)> = (0..2_000)
        .map(|_| (rng.random_range(-60.0..60.0), rng.random_range(-180.0..180.0)))
        .collect();
    let config = SpatialConfig::default();
    let index = build_index(&config, &points, 400)?;

    for _ in 0..10 {
        let center = Point::from_degrees(
            rng.random_range(-50.0..50.0),
            rng.random_range(-180.0..180.0),
        )?;
        let radius = rng.random_range(100.0..1500.0);

        let hits = search_all_ways(config.clone(), &index, center, radius)?;
        let expected: Vec<u64> = points
            .iter()
            .enumerate()
            .filter(|(_, (lat, lon))| center.distance_to(*lat, *lon) <= radius)
            .map(|(doc, _)| doc as u64)
            .collect();

        let mut ids = doc_ids(&hits);
        ids.sort_unstable();
        assert_eq!(ids, expected);
    }
    Ok(())
}

#[test]
fn test_configuration_file_drives_indexing_and_search() -> Result<()> {
    init_logging();
    let mut file = NamedTempFile::new()?;
    write!(file, r#"{{"top_level": 4, "bottom_level": 8, "encoding": "grid_hash"}}"#)?;
    let config = SpatialConfig::from_file(file.path())?;
    assert_eq!(config.levels(), 4..=8);

    let index = build_index(&config, &[(48.85, 2.35), (48.86, 2.29), (51.5, -0.12)], 10)?;
    let builder = SpatialQueryBuilder::new(config.clone())?;

    // 1 km asks for level 14; the index stops at 8.
    let query = builder.build(Point::from_degrees(48.85, 2.35)?, 1.0, FIELD)?;
    assert_eq!(query.level(), Some(8));

    let hits = search_all_ways(config, &index, Point::from_degrees(48.85, 2.35)?, 10.0)?;
    assert_eq!(doc_ids(&hits), vec![0, 1]);
    Ok(())
}

#[derive(Debug, Default)]
struct CountingCollector {
    segments: usize,
    docs: Vec<u64>,
    doc_base: u64,
}

impl Collector for CountingCollector {
    fn set_next_segment(&mut self, ctx: &SegmentContext<'_>) -> Result<()> {
        self.segments += 1;
        self.doc_base = ctx.doc_base;
        Ok(())
    }

    fn collect(&mut self, local_doc: u64) -> Result<()> {
        self.docs.push(self.doc_base + local_doc);
        Ok(())
    }
}

#[test]
fn test_custom_collector() -> Result<()> {
    init_logging();
    let config = SpatialConfig::default();
    let points = [(0.0, 0.0), (0.0, 0.01), (20.0, 20.0), (20.0, 20.0), (0.01, 0.0)];
    let index = build_index(&config, &points, 2)?;

    let filter = DistanceFilter::standalone(Point::from_degrees(0.0, 0.0)?, 5.0, FIELD)?;
    let mut collector = CountingCollector::default();
    let total = Searcher::new(&index).search(&filter, &mut collector)?;

    assert_eq!(total, 3);
    assert_eq!(collector.docs, vec![0, 1, 4]);
    // The middle segment holds no match and is skipped.
    assert_eq!(collector.segments, 2);
    assert!(filter.description().contains("location_HSSI_Latitude"));
    Ok(())
}
