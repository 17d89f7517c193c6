//! Latitude/longitude bounding boxes that understand the antimeridian.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};
use crate::geo::EARTH_MEAN_RADIUS_KM;
use crate::geo::point::Point;

/// An axis-aligned box in latitude/longitude space.
///
/// When `upper_right.longitude() < lower_left.longitude()` the box wraps across
/// the antimeridian and covers `[lower_left.lon, 180]` plus `[-180, upper_right.lon]`.
/// A box spanning all longitudes is stored as `-180..180`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    lower_left: Point,
    upper_right: Point,
}

impl BoundingBox {
    /// Create a box from its corners.
    ///
    /// The longitudes are taken literally: an upper-right longitude smaller than the
    /// lower-left one always means the box wraps, even for boxes meant to be wider
    /// than 180 degrees.
    pub fn new(lower_left: Point, upper_right: Point) -> Result<Self> {
        if lower_left.latitude() > upper_right.latitude() {
            return Err(SpatialError::invalid_argument(format!(
                "lower-left latitude {} is above upper-right latitude {}",
                lower_left.latitude(),
                upper_right.latitude()
            )));
        }

        Ok(BoundingBox {
            lower_left,
            upper_right,
        })
    }

    /// Smallest box containing the geodesic disk of `radius_km` around `center`.
    ///
    /// A disk reaching either pole yields the full longitude span. Otherwise the
    /// longitude half-span is `asin(sin(δ) / cos(lat))` for angular radius `δ`.
    pub fn from_bounding_circle(center: &Point, radius_km: f64) -> Result<Self> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(SpatialError::invalid_argument(format!(
                "radius must be a non-negative finite number, got {radius_km}"
            )));
        }

        let delta = radius_km / EARTH_MEAN_RADIUS_KM;
        let delta_deg = delta.to_degrees();
        let min_lat = center.latitude() - delta_deg;
        let max_lat = center.latitude() + delta_deg;

        if max_lat >= 90.0 || min_lat <= -90.0 {
            // Longitude is degenerate at a pole: everything around it is in range.
            return Ok(BoundingBox {
                lower_left: Point::edge(min_lat, -180.0),
                upper_right: Point::edge(max_lat, 180.0),
            });
        }

        let ratio = (delta.sin() / center.latitude_rad().cos()).clamp(-1.0, 1.0);
        let half_span = ratio.asin().to_degrees();

        Ok(BoundingBox {
            lower_left: Point::from_degrees(min_lat, center.longitude() - half_span)?,
            upper_right: Point::from_degrees(max_lat, center.longitude() + half_span)?,
        })
    }

    /// The south-west corner.
    pub fn lower_left(&self) -> &Point {
        &self.lower_left
    }

    /// The north-east corner.
    pub fn upper_right(&self) -> &Point {
        &self.upper_right
    }

    /// Whether the box crosses the antimeridian.
    pub fn wraps_antimeridian(&self) -> bool {
        self.upper_right.longitude() < self.lower_left.longitude()
    }

    /// Whether the box spans every longitude.
    pub fn spans_all_longitudes(&self) -> bool {
        self.lower_left.longitude() <= -180.0 && self.upper_right.longitude() >= 180.0
    }

    /// Split a wrapping box into `[lower_left.lon, 180]` and `[-180, upper_right.lon]`.
    ///
    /// A box that does not wrap is returned unchanged with no second half.
    pub fn split_at_antimeridian(&self) -> (BoundingBox, Option<BoundingBox>) {
        if !self.wraps_antimeridian() {
            return (*self, None);
        }

        let east = BoundingBox {
            lower_left: self.lower_left,
            upper_right: Point::edge(self.upper_right.latitude(), 180.0),
        };
        let west = BoundingBox {
            lower_left: Point::edge(self.lower_left.latitude(), -180.0),
            upper_right: self.upper_right,
        };
        (east, Some(west))
    }

    /// Whether the point lies inside the box (edges inclusive).
    pub fn contains(&self, point: &Point) -> bool {
        let lat = point.latitude();
        if lat < self.lower_left.latitude() || lat > self.upper_right.latitude() {
            return false;
        }

        let lon = point.longitude();
        if self.wraps_antimeridian() {
            lon >= self.lower_left.longitude() || lon <= self.upper_right.longitude()
        } else {
            lon >= self.lower_left.longitude() && lon <= self.upper_right.longitude()
        }
    }
}
