pub mod builder;

use std::path::Path;

use draft_common::{DrawingTool, Polyline, StrokeColor};
use image::DynamicImage;
use tracing::{debug, warn};

use crate::{
    config::TraceConfig,
    error::Result,
    traits::{ContourExtractor, EdgeDetector, LineDetector, LineMerger, PathSimplifier, ShapeDetector},
    types::{TraceOutcome, CONTOUR_LINE_WIDTH},
    algorithms::GreedyLineMerger,
};

/// Progress reported after each stage of a trace
pub mod progress {
    pub const EDGES: f64 = 0.2;
    pub const CONTOURS: f64 = 0.4;
    pub const LINES: f64 = 0.6;
    pub const LINES_OPTIMIZED: f64 = 0.8;
    pub const DONE: f64 = 1.0;
}

/// Vectorization pipeline: contours from one edge map, merged Hough lines
/// from another, then any extra shape detectors.
pub struct Pipeline {
    config: TraceConfig,
    contour_edges: Box<dyn EdgeDetector>,
    contour_extractor: Box<dyn ContourExtractor>,
    simplifier: Box<dyn PathSimplifier>,
    line_edges: Option<Box<dyn EdgeDetector>>,
    line_detector: Box<dyn LineDetector>,
    line_merger: Box<dyn LineMerger>,
    shape_detectors: Vec<Box<dyn ShapeDetector>>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::PipelineBuilder {
        builder::PipelineBuilder::new()
    }

    /// Validated pipeline with the default components for `config`
    pub fn from_config(config: TraceConfig) -> Result<Self> {
        config.validate()?;
        Ok(builder::PipelineBuilder::from_config(config).build())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: TraceConfig,
        contour_edges: Box<dyn EdgeDetector>,
        contour_extractor: Box<dyn ContourExtractor>,
        simplifier: Box<dyn PathSimplifier>,
        line_edges: Option<Box<dyn EdgeDetector>>,
        line_detector: Box<dyn LineDetector>,
        line_merger: Box<dyn LineMerger>,
        shape_detectors: Vec<Box<dyn ShapeDetector>>,
    ) -> Self {
        Self {
            config,
            contour_edges,
            contour_extractor,
            simplifier,
            line_edges,
            line_detector,
            line_merger,
            shape_detectors,
        }
    }

    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Trace an image without progress reporting
    pub fn trace(&self, image: &DynamicImage) -> Result<TraceOutcome> {
        self.trace_with_progress(image, |_| {})
    }

    /// Load and trace an image file. An unreadable or undecodable file yields
    /// an empty outcome, not an error.
    pub fn trace_path<P: AsRef<Path>>(&self, path: P) -> Result<TraceOutcome> {
        let path = path.as_ref();
        match image::open(path) {
            Ok(image) => self.trace(&image),
            Err(error) => {
                warn!(path = %path.display(), %error, "could not load image, nothing to trace");
                Ok(TraceOutcome::default())
            }
        }
    }

    /// Run every stage, calling `report` with a non-decreasing fraction
    /// after each one and with exactly 1.0 at the end.
    pub fn trace_with_progress<F>(&self, image: &DynamicImage, mut report: F) -> Result<TraceOutcome>
    where
        F: FnMut(f64),
    {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            warn!(width, height, "zero-area image, nothing to trace");
            report(progress::DONE);
            return Ok(TraceOutcome::empty(width, height));
        }

        let gray = image.to_luma8();

        // Step 1: Edge detection
        let contour_edges = self.contour_edges.detect_edges(&gray)?;
        report(progress::EDGES);

        // Step 2: Contours, simplified
        let contours: Vec<Polyline> = self
            .contour_extractor
            .extract_contours(&contour_edges)?
            .iter()
            .map(|contour| {
                Polyline::new(
                    self.simplifier.simplify(contour),
                    StrokeColor::BLACK,
                    CONTOUR_LINE_WIDTH,
                    DrawingTool::Pencil,
                )
            })
            .collect();
        report(progress::CONTOURS);

        // Step 3: Line detection, on its own edge map when one is configured
        let line_edges = match &self.line_edges {
            Some(detector) => detector.detect_edges(&gray)?,
            None => contour_edges,
        };
        let raw_lines = self.line_detector.detect_lines(&line_edges)?;
        report(progress::LINES);

        // Step 4: Merge and filter lines
        let merged = self.line_merger.merge_lines(&raw_lines);
        let lines = GreedyLineMerger::new(self.config.merge.clone()).to_polylines(&merged);
        report(progress::LINES_OPTIMIZED);

        // Step 5: External detectors
        let mut shapes = Vec::new();
        for detector in &self.shape_detectors {
            match detector.detect(image, &self.config) {
                Ok(detected) => shapes.extend(detected.into_iter().map(|s| s.into_polyline())),
                Err(error) => warn!(detector = detector.name(), %error, "shape detector failed, skipping"),
            }
        }

        let outcome = TraceOutcome {
            contour_count: contours.len(),
            line_count: lines.len(),
            shape_count: shapes.len(),
            polylines: contours.into_iter().chain(lines).chain(shapes).collect(),
            image_width: width,
            image_height: height,
        };
        debug!(
            contours = outcome.contour_count,
            raw_lines = raw_lines.len(),
            lines = outcome.line_count,
            shapes = outcome.shape_count,
            stroke_length = outcome.stroke_length(),
            "trace complete"
        );
        report(progress::DONE);
        Ok(outcome)
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "Pipeline: threshold {}, stride {}, {} line edge map, {} shape detectors",
            self.config.threshold,
            self.config.stride,
            if self.line_edges.is_some() { "separate" } else { "shared" },
            self.shape_detectors.len()
        )
    }
}
