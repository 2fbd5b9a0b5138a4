use crate::{
    algorithms::{ContourTracer, EdgeMap, GreedyLineMerger, GreedySimplifier, HoughLineDetector},
    config::TraceConfig,
    pipeline::Pipeline,
    traits::{ContourExtractor, EdgeDetector, LineDetector, LineMerger, PathSimplifier, ShapeDetector},
};

/// Builder for creating tracing pipelines with a fluent API
pub struct PipelineBuilder {
    config: TraceConfig,
    contour_edges: Option<Box<dyn EdgeDetector>>,
    contour_extractor: Option<Box<dyn ContourExtractor>>,
    simplifier: Option<Box<dyn PathSimplifier>>,
    line_edges: Option<Box<dyn EdgeDetector>>,
    shared_edges: bool,
    line_detector: Option<Box<dyn LineDetector>>,
    line_merger: Option<Box<dyn LineMerger>>,
    shape_detectors: Vec<Box<dyn ShapeDetector>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder with default parameters
    pub fn new() -> Self {
        Self::from_config(TraceConfig::default())
    }

    /// Start from `config`; unset stages are derived from it at build time
    pub fn from_config(config: TraceConfig) -> Self {
        Self {
            config,
            contour_edges: None,
            contour_extractor: None,
            simplifier: None,
            line_edges: None,
            shared_edges: false,
            line_detector: None,
            line_merger: None,
            shape_detectors: Vec::new(),
        }
    }

    /// Set the edge detector feeding contour tracing (replaces any existing one)
    pub fn set_contour_edges<E>(mut self, detector: E) -> Self
    where
        E: EdgeDetector + 'static,
    {
        self.contour_edges = Some(Box::new(detector));
        self
    }

    /// Set the contour extractor (replaces any existing one)
    pub fn set_contour_extractor<C>(mut self, extractor: C) -> Self
    where
        C: ContourExtractor + 'static,
    {
        self.contour_extractor = Some(Box::new(extractor));
        self
    }

    pub fn set_simplifier<S>(mut self, simplifier: S) -> Self
    where
        S: PathSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    /// Set the edge detector feeding line detection (replaces any existing one)
    pub fn set_line_edges<E>(mut self, detector: E) -> Self
    where
        E: EdgeDetector + 'static,
    {
        self.line_edges = Some(Box::new(detector));
        self.shared_edges = false;
        self
    }

    /// Detect lines on the contour edge map instead of a separate one
    pub fn share_edges(mut self) -> Self {
        self.line_edges = None;
        self.shared_edges = true;
        self
    }

    pub fn set_line_detector<L>(mut self, detector: L) -> Self
    where
        L: LineDetector + 'static,
    {
        self.line_detector = Some(Box::new(detector));
        self
    }

    pub fn set_line_merger<M>(mut self, merger: M) -> Self
    where
        M: LineMerger + 'static,
    {
        self.line_merger = Some(Box::new(merger));
        self
    }

    /// Add an external shape detector; results are appended after the lines
    pub fn add_shape_detector<D>(mut self, detector: D) -> Self
    where
        D: ShapeDetector + 'static,
    {
        self.shape_detectors.push(Box::new(detector));
        self
    }

    /// Add Gaussian pre-blur to the default edge detectors
    pub fn with_blur(mut self, sigma: f32) -> Self {
        self.config.blur_sigma = Some(sigma);
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let config = self.config;

        let contour_edges = self.contour_edges.unwrap_or_else(|| {
            Box::new(EdgeMap::new(config.threshold).with_blur(config.blur_sigma))
        });
        let contour_extractor = self.contour_extractor.unwrap_or_else(|| {
            Box::new(ContourTracer {
                step: config.stride,
                cut: config.contour_cut,
                max_points: config.max_contour_points,
                min_points: config.min_contour_points,
            })
        });
        let simplifier = self.simplifier.unwrap_or_else(|| {
            Box::new(GreedySimplifier {
                tolerance: config.simplify_tolerance,
            })
        });
        let line_edges: Option<Box<dyn EdgeDetector>> = match (self.line_edges, self.shared_edges) {
            (Some(detector), _) => Some(detector),
            (None, true) => None,
            (None, false) => Some(Box::new(
                EdgeMap::new(config.line_strength).with_blur(config.blur_sigma),
            )),
        };
        let line_detector = self
            .line_detector
            .unwrap_or_else(|| Box::new(HoughLineDetector::new(config.hough.clone())));
        let line_merger = self
            .line_merger
            .unwrap_or_else(|| Box::new(GreedyLineMerger::new(config.merge.clone())));

        Pipeline::new(
            config,
            contour_edges,
            contour_extractor,
            simplifier,
            line_edges,
            line_detector,
            line_merger,
            self.shape_detectors,
        )
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
