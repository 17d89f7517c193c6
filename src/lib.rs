//! # Sarissa Spatial
//!
//! Geospatial proximity search on top of a term-based inverted index.
//!
//! ## Features
//!
//! - Hierarchical grid cells encoded as plain index terms
//! - Quad-tree (sinusoidal) and grid-hash (equirectangular) cell encodings
//! - Cell covers for search disks, including antimeridian and pole handling
//! - Exact great-circle distance filtering
//! - Distance collectors and top-K comparators
//! - In-memory segmented index for tests and embedding

pub mod cell;
pub mod config;
pub mod error;
pub mod field;
pub mod filter;
pub mod geo;
pub mod memory;
pub mod query;
pub mod reader;
pub mod search;

pub mod prelude {
    pub use crate::cell::{CellEncoding, CellId};
    pub use crate::config::SpatialConfig;
    pub use crate::error::{Result, SpatialError};
    pub use crate::field::SpatialFieldWriter;
    pub use crate::filter::{DistanceFilter, Filter, FilterChain};
    pub use crate::geo::{BoundingBox, Coordinates, Point};
    pub use crate::memory::{MemoryIndex, MemorySegmentBuilder};
    pub use crate::query::{SpatialQuery, SpatialQueryBuilder};
    pub use crate::reader::IndexReader;
    pub use crate::search::{DistanceHit, Searcher};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
