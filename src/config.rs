//! Configuration for spatial indexing and querying.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cell::{CellEncoding, MAX_LEVEL};
use crate::error::{Result, SpatialError};

/// Spatial indexing configuration.
///
/// The same configuration must be used by the mapping layer when writing cell
/// ids and by the query builder when reading them: the builder never asks for a
/// level outside `top_level..=bottom_level`, since no document carries those terms.
///
/// # Example
///
/// ```
/// use sarissa_spatial::cell::CellEncoding;
/// use sarissa_spatial::config::SpatialConfig;
///
/// let config = SpatialConfig::from_json_str(r#"{"bottom_level": 12, "encoding": "grid_hash"}"#).unwrap();
/// assert_eq!(config.top_level, 0);
/// assert_eq!(config.bottom_level, 12);
/// assert_eq!(config.encoding, CellEncoding::GridHash);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Coarsest level written at index time.
    pub top_level: u32,

    /// Deepest level written at index time.
    ///
    /// Queries asking for a finer level degrade to this one.
    pub bottom_level: u32,

    /// Projection used for cell ids.
    pub encoding: CellEncoding,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        SpatialConfig {
            top_level: 0,
            bottom_level: 16,
            encoding: CellEncoding::QuadTree,
        }
    }
}

impl SpatialConfig {
    /// Check that the level range is usable.
    pub fn validate(&self) -> Result<()> {
        if self.bottom_level > MAX_LEVEL {
            return Err(SpatialError::invalid_config(format!(
                "bottom_level {} exceeds the maximum of {MAX_LEVEL}",
                self.bottom_level
            )));
        }
        if self.top_level > self.bottom_level {
            return Err(SpatialError::invalid_config(format!(
                "top_level {} is deeper than bottom_level {}",
                self.top_level, self.bottom_level
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration; missing keys take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SpatialConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Levels populated at index time, coarsest first.
    pub fn levels(&self) -> std::ops::RangeInclusive<u32> {
        self.top_level..=self.bottom_level
    }
}
