//! Normalized latitude/longitude points.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};
use crate::geo::EARTH_MEAN_RADIUS_KM;

/// The north pole.
pub const NORTH_POLE: Point = Point {
    latitude: 90.0,
    longitude: 0.0,
};

/// The south pole.
pub const SOUTH_POLE: Point = Point {
    latitude: -90.0,
    longitude: 0.0,
};

/// An externally supplied coordinate pair, in degrees.
///
/// Entities that expose a location implement this so they can be turned into a
/// [`Point`] without the caller unpacking fields by hand.
pub trait Coordinates {
    /// Latitude in degrees.
    fn latitude(&self) -> f64;

    /// Longitude in degrees.
    fn longitude(&self) -> f64;
}

impl Coordinates for (f64, f64) {
    fn latitude(&self) -> f64 {
        self.0
    }

    fn longitude(&self) -> f64 {
        self.1
    }
}

/// A point on the sphere.
///
/// Latitude is clamped to `[-90, 90]` and longitude wrapped into `(-180, 180]`;
/// a longitude of exactly -180 becomes 180.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct Point {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize, Deserialize)]
struct RawPoint {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawPoint> for Point {
    type Error = SpatialError;

    fn try_from(raw: RawPoint) -> Result<Self> {
        Point::from_degrees(raw.lat, raw.lon)
    }
}

impl From<Point> for RawPoint {
    fn from(point: Point) -> Self {
        RawPoint {
            lat: point.latitude,
            lon: point.longitude,
        }
    }
}

impl Point {
    /// Create a point from degrees, normalizing both coordinates.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Result<Self> {
        check_finite("latitude", latitude)?;
        check_finite("longitude", longitude)?;

        Ok(Point {
            latitude: normalize_latitude(latitude),
            longitude: normalize_longitude(longitude),
        })
    }

    /// Create a point from radians, normalizing both coordinates.
    pub fn from_radians(latitude: f64, longitude: f64) -> Result<Self> {
        check_finite("latitude", latitude)?;
        check_finite("longitude", longitude)?;

        Self::from_degrees(latitude.to_degrees(), longitude.to_degrees())
    }

    /// Create a point from any coordinate pair.
    pub fn from_coordinates<C: Coordinates + ?Sized>(coordinates: &C) -> Result<Self> {
        Self::from_degrees(coordinates.latitude(), coordinates.longitude())
    }

    /// Box corner that keeps a longitude of -180 as-is.
    ///
    /// Bounding boxes need both -180 and 180 to express the western and eastern
    /// edge of a full or split longitude span; regular points never carry -180.
    pub(crate) fn edge(latitude: f64, longitude: f64) -> Self {
        Point {
            latitude: normalize_latitude(latitude),
            longitude: longitude.clamp(-180.0, 180.0),
        }
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Latitude in radians.
    pub fn latitude_rad(&self) -> f64 {
        self.latitude.to_radians()
    }

    /// Longitude in radians.
    pub fn longitude_rad(&self) -> f64 {
        self.longitude.to_radians()
    }

    /// Great-circle distance in kilometers to the given coordinates (degrees).
    ///
    /// Uses the haversine formula; the intermediate term is clamped to `[0, 1]` so
    /// rounding near identical or antipodal points never leaves the domain of `asin`.
    pub fn distance_to(&self, latitude: f64, longitude: f64) -> f64 {
        haversine_km(self.latitude, self.longitude, latitude, longitude)
    }

    /// Great-circle distance in kilometers to another point.
    pub fn distance_to_point(&self, other: &Point) -> f64 {
        self.distance_to(other.latitude, other.longitude)
    }

    /// The point reached by travelling `distance_km` along the great circle
    /// leaving this point with the given initial bearing (degrees clockwise from north).
    pub fn destination(&self, distance_km: f64, bearing_deg: f64) -> Result<Point> {
        check_finite("distance", distance_km)?;
        check_finite("bearing", bearing_deg)?;

        let delta = distance_km / EARTH_MEAN_RADIUS_KM;
        let theta = bearing_deg.to_radians();
        let phi1 = self.latitude_rad();
        let lambda1 = self.longitude_rad();

        let sin_phi2 = (phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos())
            .clamp(-1.0, 1.0);
        let phi2 = sin_phi2.asin();
        let lambda2 = lambda1
            + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

        Point::from_radians(phi2, lambda2)
    }

    /// The diametrically opposite point.
    pub fn antipode(&self) -> Point {
        Point {
            latitude: -self.latitude,
            longitude: normalize_longitude(self.longitude + 180.0),
        }
    }
}

impl Coordinates for Point {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Haversine distance in kilometers between two coordinate pairs in degrees.
pub(crate) fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_MEAN_RADIUS_KM * c
}

fn check_finite(name: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SpatialError::invalid_argument(format!(
            "{name} must be a finite number, got {value}"
        )))
    }
}

fn normalize_latitude(latitude: f64) -> f64 {
    latitude.clamp(-90.0, 90.0)
}

fn normalize_longitude(longitude: f64) -> f64 {
    if longitude > -180.0 && longitude <= 180.0 {
        return longitude;
    }
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { 180.0 } else { wrapped }
}
