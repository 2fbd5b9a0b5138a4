//! # Raster Vectorization Library
//!
//! Turns raster sketches and photographed plans into vector polylines.
//!
//! ## Core Features
//!
//! - **Edge map**: morphological gradient with a configurable gain
//! - **Contour tracing**: flood-fill regions of strong edges, thinned by a greedy simplifier
//! - **Line detection**: Hough transform with greedy merging of near-collinear segments
//! - **Pluggable shape detectors**: external results appended after the classical ones
//! - **Background worker**: traces on the blocking pool with progress reporting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vectorize::{Pipeline, TraceConfig};
//!
//! let pipeline = Pipeline::from_config(TraceConfig::default())?;
//! let outcome = pipeline.trace_path("sketch.png")?;
//! println!("{} polylines", outcome.polylines.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Pipeline
//!
//! ```rust,no_run
//! use vectorize::{Pipeline, algorithms::*};
//!
//! let pipeline = Pipeline::builder()
//!     .set_contour_edges(EdgeMap::new(0.8))
//!     .set_simplifier(GreedySimplifier { tolerance: 4.0 })
//!     .add_shape_detector(ClassicalContourDetector)
//!     .build();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod traits;
pub mod algorithms;
pub mod pipeline;
pub mod worker;
pub mod overlay;

pub use error::{Result, TraceError};
pub use types::{DetectedLine, DetectedShape, TraceOutcome};
pub use config::{HoughParams, MergeParams, TraceConfig};
pub use traits::*;
pub use pipeline::{Pipeline, builder::PipelineBuilder};
pub use worker::{TraceHandle, TraceWorker};
pub use overlay::render_overlay;

/// Trace `image` with a validated default pipeline for `config`
pub fn trace_image(image: &image::DynamicImage, config: &TraceConfig) -> Result<TraceOutcome> {
    Pipeline::from_config(config.clone())?.trace(image)
}
