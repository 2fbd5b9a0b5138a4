use image::DynamicImage;

use crate::{
    algorithms::{ContourTracer, EdgeMap, GreedySimplifier},
    config::TraceConfig,
    error::Result,
    traits::{PathSimplifier, ShapeDetector},
    types::DetectedShape,
};

/// Classical stand-in for a learned contour detector: edge map, flood-fill
/// tracing and greedy simplification behind the `ShapeDetector` contract.
#[derive(Debug, Clone, Default)]
pub struct ClassicalContourDetector;

impl ShapeDetector for ClassicalContourDetector {
    fn name(&self) -> &str {
        "classical_contours"
    }

    fn detect(&self, image: &DynamicImage, config: &TraceConfig) -> Result<Vec<DetectedShape>> {
        config.validate()?;

        let edges = EdgeMap::new(config.threshold)
            .with_blur(config.blur_sigma)
            .apply_dynamic(image);
        let tracer = ContourTracer {
            step: config.stride,
            cut: config.contour_cut,
            max_points: config.max_contour_points,
            min_points: config.min_contour_points,
        };
        let simplifier = GreedySimplifier {
            tolerance: config.simplify_tolerance,
        };

        Ok(tracer
            .trace(&edges)
            .iter()
            .map(|contour| DetectedShape::Polyline(simplifier.simplify(contour)))
            .collect())
    }
}

/// Detector returning a fixed set of shapes; handy when replaying results
/// produced elsewhere (e.g. by an external vision service).
#[derive(Debug, Clone, Default)]
pub struct StaticShapeDetector {
    pub shapes: Vec<DetectedShape>,
}

impl ShapeDetector for StaticShapeDetector {
    fn name(&self) -> &str {
        "static"
    }

    fn detect(&self, _image: &DynamicImage, _config: &TraceConfig) -> Result<Vec<DetectedShape>> {
        Ok(self.shapes.clone())
    }
}
