//! Geometric primitives: points on the sphere and latitude/longitude boxes.
//!
//! Everything here is immutable and cheap to copy. Distances are great-circle
//! distances on a sphere of radius [`EARTH_MEAN_RADIUS_KM`].

pub mod bounding_box;
pub mod point;

pub use self::bounding_box::BoundingBox;
pub use self::point::{Coordinates, NORTH_POLE, Point, SOUTH_POLE};

/// Mean Earth radius in kilometers.
pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;

/// Earth circumference at the equator in kilometers.
pub const EARTH_EQUATOR_CIRCUMFERENCE_KM: f64 = 40075.017;
