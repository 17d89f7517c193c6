//! Sets of cells covering a box or a search disk.

use ahash::AHashSet;
use log::trace;

use crate::cell::{CellEncoding, CellId, check_level, project_coordinates, x_index, y_index};
use crate::error::{Result, SpatialError};
use crate::geo::{BoundingBox, Point};

/// Upper bound on the number of cells a single cover may enumerate.
pub const MAX_COVER_CELLS: u64 = 1 << 20;

/// All cell ids at `level` touching the non-wrapping box `lower_left..upper_right`.
///
/// The projection bends latitude lines, so the box corners do not bound the
/// projected area on their own: all four corners are projected, plus the equator
/// at both box longitudes when the box straddles it (`cos(lat)` peaks there).
/// The inclusive min/max rectangle of those points is enumerated row by row.
pub fn cell_ids_covering_box(
    encoding: CellEncoding,
    lower_left: &Point,
    upper_right: &Point,
    level: u32,
) -> Result<Vec<String>> {
    let range = CellRange::of_box(encoding, lower_left, upper_right, level)?;
    check_cover_size(range.len(), level)?;
    Ok(range.cells().map(|cell| cell.to_string()).collect())
}

/// All cell ids at `level` touching `bbox`.
///
/// A box crossing the antimeridian is covered as its two halves; cells shared by
/// both halves appear once.
pub fn cell_ids_covering(
    encoding: CellEncoding,
    bbox: &BoundingBox,
    level: u32,
) -> Result<Vec<String>> {
    let (first, second) = box_ranges(encoding, bbox, level)?;
    let total = first.len() + second.map_or(0, |range| range.len());
    check_cover_size(total, level)?;

    let mut cells: Vec<CellId> = first.cells().collect();
    if let Some(second) = second {
        trace!("bounding box {bbox:?} wraps the antimeridian, covering both halves");
        let mut seen: AHashSet<CellId> = cells.iter().copied().collect();
        cells.extend(second.cells().filter(|cell| seen.insert(*cell)));
    }

    Ok(cells.into_iter().map(|cell| cell.to_string()).collect())
}

/// All cell ids at `level` touching the disk of `radius_km` around `center`.
pub fn cell_ids_covering_bounding_circle(
    encoding: CellEncoding,
    center: &Point,
    radius_km: f64,
    level: u32,
) -> Result<Vec<String>> {
    let bbox = BoundingBox::from_bounding_circle(center, radius_km)?;
    cell_ids_covering(encoding, &bbox, level)
}

/// Number of cells [`cell_ids_covering`] would enumerate for `bbox`, without
/// enumerating them. Cells shared by the halves of a wrapping box count twice.
pub fn cover_size(encoding: CellEncoding, bbox: &BoundingBox, level: u32) -> Result<u64> {
    let (first, second) = box_ranges(encoding, bbox, level)?;
    Ok(first.len() + second.map_or(0, |range| range.len()))
}

fn check_cover_size(count: u64, level: u32) -> Result<()> {
    if count > MAX_COVER_CELLS {
        return Err(SpatialError::invalid_argument(format!(
            "covering the box at level {level} would enumerate {count} cells"
        )));
    }
    Ok(())
}

fn box_ranges(
    encoding: CellEncoding,
    bbox: &BoundingBox,
    level: u32,
) -> Result<(CellRange, Option<CellRange>)> {
    let (first, second) = bbox.split_at_antimeridian();
    let first = CellRange::of_box(encoding, first.lower_left(), first.upper_right(), level)?;
    let second = second
        .map(|half| CellRange::of_box(encoding, half.lower_left(), half.upper_right(), level))
        .transpose()?;
    Ok((first, second))
}

/// Inclusive rectangle of cell indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    start_x: i64,
    end_x: i64,
    start_y: i64,
    end_y: i64,
}

impl CellRange {
    fn of_box(
        encoding: CellEncoding,
        lower_left: &Point,
        upper_right: &Point,
        level: u32,
    ) -> Result<Self> {
        check_level(level)?;

        let (south, north) = (lower_left.latitude(), upper_right.latitude());
        let (west, east) = (lower_left.longitude(), upper_right.longitude());

        let mut samples = vec![(south, west), (south, east), (north, west), (north, east)];
        if south < 0.0 && north > 0.0 {
            samples.push((0.0, west));
            samples.push((0.0, east));
        }

        let mut range = CellRange {
            start_x: i64::MAX,
            end_x: i64::MIN,
            start_y: i64::MAX,
            end_y: i64::MIN,
        };
        for (lat, lon) in samples {
            let (x, y) = project_coordinates(encoding, lat, lon);
            let (xi, yi) = (x_index(x, level), y_index(y, level));
            range.start_x = range.start_x.min(xi);
            range.end_x = range.end_x.max(xi);
            range.start_y = range.start_y.min(yi);
            range.end_y = range.end_y.max(yi);
        }
        Ok(range)
    }

    fn len(&self) -> u64 {
        (self.end_x - self.start_x + 1) as u64 * (self.end_y - self.start_y + 1) as u64
    }

    fn cells(self) -> impl Iterator<Item = CellId> {
        (self.start_x..=self.end_x)
            .flat_map(move |x| (self.start_y..=self.end_y).map(move |y| CellId { x, y }))
    }
}
