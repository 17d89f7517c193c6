//! Field naming shared by the mapping layer and the query builder.
//!
//! A spatial field `location` expands into several index fields:
//!
//! - `location_HSSI_Latitude` / `location_HSSI_Longitude`: numeric values used
//!   for exact distances and range queries;
//! - `location_HSSI_<level>` (quad-tree) or `location_HSSI_GRID_<level>`
//!   (grid-hash): one cell id term per populated level.

use crate::cell::{CellEncoding, cell_id};
use crate::config::SpatialConfig;
use crate::error::Result;
use crate::geo::{Coordinates, Point};

const SPATIAL_FIELD_MARKER: &str = "_HSSI_";

/// Name of the field holding cell ids of `field` at `level`.
pub fn cell_field_name(field: &str, encoding: CellEncoding, level: u32) -> String {
    match encoding {
        CellEncoding::QuadTree => format!("{field}{SPATIAL_FIELD_MARKER}{level}"),
        CellEncoding::GridHash => format!("{field}{SPATIAL_FIELD_MARKER}GRID_{level}"),
    }
}

/// Name of the numeric latitude field of `field`.
pub fn latitude_field_name(field: &str) -> String {
    format!("{field}{SPATIAL_FIELD_MARKER}Latitude")
}

/// Name of the numeric longitude field of `field`.
pub fn longitude_field_name(field: &str) -> String {
    format!("{field}{SPATIAL_FIELD_MARKER}Longitude")
}

/// Everything the mapping layer writes for one located document.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialFields {
    /// `(field name, cell id)` terms, coarsest level first.
    pub terms: Vec<(String, String)>,
    /// `(field name, value)` numeric doc values: latitude then longitude.
    pub numeric: Vec<(String, f64)>,
}

/// Computes the index fields for a spatial field.
#[derive(Debug, Clone)]
pub struct SpatialFieldWriter {
    field: String,
    config: SpatialConfig,
}

impl SpatialFieldWriter {
    /// Create a writer for `field`; fails on an invalid configuration.
    pub fn new<S: Into<String>>(field: S, config: SpatialConfig) -> Result<Self> {
        config.validate()?;
        Ok(SpatialFieldWriter {
            field: field.into(),
            config,
        })
    }

    /// Get the field name.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The fields to write for a document located at `coordinates`.
    pub fn fields_for<C: Coordinates + ?Sized>(&self, coordinates: &C) -> Result<SpatialFields> {
        let point = Point::from_coordinates(coordinates)?;

        let mut terms = Vec::with_capacity(self.config.levels().count());
        for level in self.config.levels() {
            terms.push((
                cell_field_name(&self.field, self.config.encoding, level),
                cell_id(self.config.encoding, &point, level)?,
            ));
        }

        Ok(SpatialFields {
            terms,
            numeric: vec![
                (latitude_field_name(&self.field), point.latitude()),
                (longitude_field_name(&self.field), point.longitude()),
            ],
        })
    }
}
