//! Error types for the spatial search subsystem.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`SpatialError`] enum. The variants separate three families of failures:
//!
//! - malformed input (NaN coordinates, negative radius, bad levels), rejected
//!   before anything touches the index;
//! - defects in how a caller drives the search protocol, reported as
//!   [`SpatialError::Internal`];
//! - failures surfaced by the host index engine, passed through unchanged.
//!
//! Absent data (a field that was never indexed, a cell id nobody carries) is
//! never an error; it produces empty candidate sets.
//!
//! # Examples
//!
//! ```
//! use sarissa_spatial::error::{Result, SpatialError};
//!
//! fn check_radius(radius_km: f64) -> Result<f64> {
//!     if radius_km < 0.0 {
//!         return Err(SpatialError::invalid_argument("radius must be non-negative"));
//!     }
//!     Ok(radius_km)
//! }
//!
//! assert!(check_radius(-1.0).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for spatial operations.
#[derive(Error, Debug)]
pub enum SpatialError {
    /// Malformed geometry or parameters (NaN/infinite coordinates, negative radius,
    /// out-of-range levels, inconsistent configuration).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Internal consistency violation. Indicates a caller or protocol bug, not a
    /// data problem, and should not be retried.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Errors raised by the host index engine while reading postings or values.
    #[error("Index error: {0}")]
    Index(String),

    /// I/O errors (configuration files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with SpatialError.
pub type Result<T> = std::result::Result<T, SpatialError>;

impl SpatialError {
    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        SpatialError::InvalidArgument(msg.into())
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        SpatialError::Internal(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        SpatialError::Index(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        SpatialError::InvalidArgument(format!("Invalid configuration: {}", msg.into()))
    }

    /// Whether this error signals a defect in the caller rather than bad input or data.
    pub fn is_internal(&self) -> bool {
        matches!(self, SpatialError::Internal(_))
    }
}
