use draft_common::Point2D;
use image::{DynamicImage, GrayImage};

use crate::{
    config::TraceConfig,
    error::Result,
    types::{DetectedLine, DetectedShape},
};

/// Trait for edge-intensity filters
pub trait EdgeDetector: Send + Sync {
    /// Produce an edge raster with the same dimensions as the input
    fn detect_edges(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for contour extraction algorithms
pub trait ContourExtractor: Send + Sync {
    /// Extract ordered point sequences from an edge raster
    fn extract_contours(&self, edges: &GrayImage) -> Result<Vec<Vec<Point2D>>>;
}

/// Trait for path simplification algorithms
pub trait PathSimplifier: Send + Sync {
    /// Reduce a dense point sequence, keeping its first and last points
    fn simplify(&self, points: &[Point2D]) -> Vec<Point2D>;
}

/// Trait for straight line detection
pub trait LineDetector: Send + Sync {
    fn detect_lines(&self, edges: &GrayImage) -> Result<Vec<DetectedLine>>;
}

/// Trait for consolidating near-duplicate line detections
pub trait LineMerger: Send + Sync {
    fn merge_lines(&self, lines: &[DetectedLine]) -> Vec<DetectedLine>;
}

/// Whole-image shape detection. External (e.g. learned) detectors plug in
/// here; the classical contour tracer implements it too.
pub trait ShapeDetector: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &str;

    fn detect(&self, image: &DynamicImage, config: &TraceConfig) -> Result<Vec<DetectedShape>>;
}
