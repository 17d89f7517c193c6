//! Exact spatial filter: great-circle distance check.

use log::trace;

use crate::error::{Result, SpatialError};
use crate::field::{latitude_field_name, longitude_field_name};
use crate::filter::{DocSet, Filter, FilterChain, MatchAllFilter};
use crate::geo::Point;
use crate::reader::{SegmentReader, numeric_values_or_empty};

/// Keeps candidates whose stored coordinates lie within `radius_km` of `center`.
///
/// Reads the latitude/longitude doc values of every candidate, so its cost is
/// proportional to the number of candidates it receives. Documents missing either
/// value are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceFilter {
    center: Point,
    radius_km: f64,
    latitude_field: String,
    longitude_field: String,
}

impl DistanceFilter {
    /// Filter on the coordinate fields derived from the spatial field `field`.
    pub fn new(center: Point, radius_km: f64, field: &str) -> Result<Self> {
        Self::with_fields(
            center,
            radius_km,
            latitude_field_name(field),
            longitude_field_name(field),
        )
    }

    /// Filter on explicitly named latitude and longitude fields.
    pub fn with_fields<L: Into<String>, G: Into<String>>(
        center: Point,
        radius_km: f64,
        latitude_field: L,
        longitude_field: G,
    ) -> Result<Self> {
        if !radius_km.is_finite() || radius_km < 0.0 {
            return Err(SpatialError::invalid_argument(format!(
                "radius must be a non-negative finite number, got {radius_km}"
            )));
        }

        Ok(DistanceFilter {
            center,
            radius_km,
            latitude_field: latitude_field.into(),
            longitude_field: longitude_field.into(),
        })
    }

    /// The filter on its own, run against every document of each segment.
    pub fn standalone(center: Point, radius_km: f64, field: &str) -> Result<FilterChain> {
        Ok(FilterChain::new()
            .then(MatchAllFilter)
            .then(Self::new(center, radius_km, field)?))
    }

    /// Get the center point.
    pub fn center(&self) -> &Point {
        &self.center
    }

    /// Get the radius in kilometers.
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Get the latitude field name.
    pub fn latitude_field(&self) -> &str {
        &self.latitude_field
    }

    /// Get the longitude field name.
    pub fn longitude_field(&self) -> &str {
        &self.longitude_field
    }
}

impl Filter for DistanceFilter {
    fn apply(&self, segment: &dyn SegmentReader, mut candidates: DocSet) -> Result<DocSet> {
        let latitudes = numeric_values_or_empty(segment, &self.latitude_field)?;
        let longitudes = numeric_values_or_empty(segment, &self.longitude_field)?;

        let before = candidates.len();
        candidates.retain(|doc_id| match (latitudes.get(doc_id), longitudes.get(doc_id)) {
            (Some(lat), Some(lon)) => self.center.distance_to(lat, lon) <= self.radius_km,
            _ => false,
        });
        trace!("distance check kept {} of {before} candidates", candidates.len());
        Ok(candidates)
    }

    fn description(&self) -> String {
        format!(
            "distance({}, {}; {}, {}) <= {}km",
            self.latitude_field,
            self.longitude_field,
            self.center.latitude(),
            self.center.longitude(),
            self.radius_km
        )
    }

    fn clone_box(&self) -> Box<dyn Filter> {
        Box::new(self.clone())
    }
}
