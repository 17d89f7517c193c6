//! Hierarchical cell indexing.
//!
//! A point is projected onto a plane, and the plane is cut into `2^level` slices
//! per axis. The pair of slice indices is the point's cell at that level, written
//! as the term `"x|y"`. Indexing a document writes one such term per populated
//! level; a proximity query looks up the handful of terms whose cells touch the
//! search disk.
//!
//! Two encodings are supported. They share the discretization and differ only in
//! the projection, see [`CellEncoding`].

pub mod cover;

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};
use crate::geo::{EARTH_EQUATOR_CIRCUMFERENCE_KM, Point};

pub use self::cover::{
    MAX_COVER_CELLS, cell_ids_covering, cell_ids_covering_bounding_circle, cell_ids_covering_box,
    cover_size,
};

/// Deepest supported subdivision level.
pub const MAX_LEVEL: u32 = 30;

/// Range of the projected x axis (longitude side).
const X_RANGE: f64 = 2.0 * PI;

/// Range of the projected y axis (latitude side).
const Y_RANGE: f64 = PI;

/// Projection used to place points on the cell grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellEncoding {
    /// Sinusoidal projection: `x = lon * cos(lat)`, `y = lat` (radians).
    /// Cells keep roughly the same ground area away from the equator.
    #[default]
    QuadTree,
    /// Equirectangular projection: `x = lon`, `y = lat` (radians).
    GridHash,
}

impl CellEncoding {
    /// Get a short name for the encoding.
    pub fn name(&self) -> &'static str {
        match self {
            CellEncoding::QuadTree => "quad_tree",
            CellEncoding::GridHash => "grid_hash",
        }
    }
}

/// Integer coordinates of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    /// Column index.
    pub x: i64,
    /// Row index.
    pub y: i64,
}

impl CellId {
    /// Create a cell id from its indices.
    pub fn new(x: i64, y: i64) -> Self {
        CellId { x, y }
    }

    /// The cell containing `point` at `level`.
    pub fn of(encoding: CellEncoding, point: &Point, level: u32) -> Result<Self> {
        check_level(level)?;
        let (x, y) = project_to_index_space(encoding, point);
        Ok(CellId {
            x: cell_index(x, X_RANGE, level),
            y: cell_index(y, Y_RANGE, level),
        })
    }

    /// The enclosing cell one level up.
    pub fn parent(&self) -> CellId {
        CellId {
            x: self.x.div_euclid(2),
            y: self.y.div_euclid(2),
        }
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.x, self.y)
    }
}

impl FromStr for CellId {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self> {
        let (x, y) = s
            .split_once('|')
            .ok_or_else(|| SpatialError::invalid_argument(format!("malformed cell id: {s}")))?;
        let parse = |part: &str| {
            part.parse::<i64>()
                .map_err(|e| SpatialError::invalid_argument(format!("malformed cell id {s}: {e}")))
        };
        Ok(CellId {
            x: parse(x)?,
            y: parse(y)?,
        })
    }
}

/// Project a point onto the plane the grid is laid over.
pub fn project_to_index_space(encoding: CellEncoding, point: &Point) -> (f64, f64) {
    project_coordinates(encoding, point.latitude(), point.longitude())
}

/// Same as [`project_to_index_space`] for raw degrees; lets box edges at -180 through.
pub(crate) fn project_coordinates(encoding: CellEncoding, latitude: f64, longitude: f64) -> (f64, f64) {
    let lat_rad = latitude.to_radians();
    let lon_rad = longitude.to_radians();
    match encoding {
        CellEncoding::QuadTree => (lon_rad * lat_rad.cos(), lat_rad),
        CellEncoding::GridHash => (lon_rad, lat_rad),
    }
}

/// Discretize a projected coordinate: `floor(2^level * coordinate / range)`.
pub fn cell_index(coordinate: f64, range: f64, level: u32) -> i64 {
    (2f64.powi(level as i32) * coordinate / range).floor() as i64
}

/// Index of a projected x coordinate.
pub(crate) fn x_index(x: f64, level: u32) -> i64 {
    cell_index(x, X_RANGE, level)
}

/// Index of a projected y coordinate.
pub(crate) fn y_index(y: f64, level: u32) -> i64 {
    cell_index(y, Y_RANGE, level)
}

/// The cell id term for `point` at `level`.
pub fn cell_id(encoding: CellEncoding, point: &Point, level: u32) -> Result<String> {
    Ok(CellId::of(encoding, point, level)?.to_string())
}

/// Coarsest level whose cells are no larger than `radius_km` on a side.
///
/// `max(0, ceil(log2(circumference / (2 * radius))))`, capped at [`MAX_LEVEL`].
/// A non-positive radius asks for the finest level.
pub fn best_level_for_search_radius(radius_km: f64) -> u32 {
    if radius_km.is_nan() || radius_km <= 0.0 {
        return MAX_LEVEL;
    }

    let iterations = EARTH_EQUATOR_CIRCUMFERENCE_KM / (2.0 * radius_km);
    let level = iterations.log2().ceil();
    if level <= 0.0 {
        0
    } else {
        (level as u32).min(MAX_LEVEL)
    }
}

pub(crate) fn check_level(level: u32) -> Result<()> {
    if level > MAX_LEVEL {
        return Err(SpatialError::invalid_argument(format!(
            "level {level} exceeds the maximum of {MAX_LEVEL}"
        )));
    }
    Ok(())
}
