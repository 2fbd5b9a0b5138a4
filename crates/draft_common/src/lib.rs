//! # Draft Common - Shared Types
//!
//! The data model shared by the tracing and extrusion crates: points,
//! polylines with their stroke attributes, and the drawing document that
//! owns them.
//!
//! ## Example
//!
//! ```rust
//! use draft_common::{Document, DrawingTool, Point2D, Polyline, StrokeColor};
//!
//! let mut document = Document::default();
//! document.push_path(Polyline::new(
//!     vec![Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0)],
//!     StrokeColor::BLACK,
//!     2.0,
//!     DrawingTool::Pencil,
//! ));
//!
//! assert_eq!(document.extrusion_depth(), 120.0);
//! ```

pub mod document;
pub mod polyline;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use document::Document;
pub use polyline::{DrawingTool, Polyline, StrokeColor};

/// Result type for shared operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Error type for the shared data model
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 2D point in image/canvas pixel space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate this point by the given offsets
    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Calculate distance to another point
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<Point2D> for geo_types::Coord<f64> {
    fn from(point: Point2D) -> Self {
        geo_types::Coord { x: point.x, y: point.y }
    }
}

/// 3D point in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Lift a planar point onto the plane `z`
    pub fn from_planar(point: Point2D, z: f64) -> Self {
        Self::new(point.x, point.y, z)
    }
}
