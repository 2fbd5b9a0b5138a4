use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TraceError};

/// Parameters for one vectorization run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TraceConfig {
    /// Edge strength for contour tracing, in (0, 1]. Higher values amplify weaker edges.
    #[schemars(range(min = 0.01, max = 1.0))]
    pub threshold: f64,
    /// Sampling stride of the contour seed scan, at least 1
    #[schemars(range(min = 1))]
    pub stride: usize,
    /// Edge pixels brighter than this seed and grow contours
    pub contour_cut: u8,
    /// Minimum spacing between kept contour points, in pixels
    pub simplify_tolerance: f64,
    /// Upper bound on the raw points collected per contour
    pub max_contour_points: usize,
    /// Contours with fewer raw points are discarded
    pub min_contour_points: usize,
    /// Optional Gaussian pre-blur applied before edge detection
    pub blur_sigma: Option<f32>,
    /// Edge strength for line detection, in (0, 1]
    #[schemars(range(min = 0.01, max = 1.0))]
    pub line_strength: f64,
    pub hough: HoughParams,
    pub merge: MergeParams,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            stride: 2,
            contour_cut: 128,
            simplify_tolerance: 2.0,
            max_contour_points: 1000,
            min_contour_points: 4,
            blur_sigma: None,
            line_strength: 0.1,
            hough: HoughParams::default(),
            merge: MergeParams::default(),
        }
    }
}

/// Hough transform quantization and peak selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct HoughParams {
    /// Number of angle buckets covering [0, π)
    pub angle_buckets: usize,
    /// Width of one distance bucket, in pixels
    pub rho_resolution: f64,
    /// A cell needs strictly more votes than this to become a line
    pub vote_threshold: u32,
    /// Sampling stride used when collecting edge points
    pub sample_stride: usize,
    /// Edge pixels brighter than this vote
    pub edge_cut: u8,
    /// Trim each line to the extent of the edge points that voted for it
    pub clip_to_support: bool,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            angle_buckets: 180,
            rho_resolution: 1.0,
            vote_threshold: 20,
            sample_stride: 2,
            edge_cut: 100,
            clip_to_support: true,
        }
    }
}

/// Line consolidation and output filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MergeParams {
    /// Maximum orientation difference, in radians
    pub angle_tolerance: f64,
    /// Maximum closest-endpoint gap, in pixels
    pub endpoint_distance: f64,
    pub min_length: f64,
    pub min_confidence: f64,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            angle_tolerance: 0.1,
            endpoint_distance: 20.0,
            min_length: 10.0,
            min_confidence: 0.5,
        }
    }
}

fn invalid(message: impl Into<String>) -> TraceError {
    TraceError::InvalidConfig(message.into())
}

impl TraceConfig {
    /// Reject parameter combinations the algorithms cannot run with
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(invalid(format!("threshold must be in (0, 1], got {}", self.threshold)));
        }
        if !(self.line_strength > 0.0 && self.line_strength <= 1.0) {
            return Err(invalid(format!(
                "line_strength must be in (0, 1], got {}",
                self.line_strength
            )));
        }
        if self.stride == 0 {
            return Err(invalid("stride must be at least 1"));
        }
        if !(self.simplify_tolerance.is_finite() && self.simplify_tolerance >= 0.0) {
            return Err(invalid("simplify_tolerance must be a non-negative number"));
        }
        if self.max_contour_points == 0 {
            return Err(invalid("max_contour_points must be at least 1"));
        }
        if let Some(sigma) = self.blur_sigma {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(invalid("blur_sigma must be positive"));
            }
        }
        self.hough.validate()?;
        self.merge.validate()
    }
}

impl HoughParams {
    /// Finest ρ step accepted, in pixels
    pub const MIN_RHO_RESOLUTION: f64 = 0.01;
    /// Tenth-of-a-degree angular resolution
    pub const MAX_ANGLE_BUCKETS: usize = 1800;

    pub fn validate(&self) -> Result<()> {
        if !(1..=Self::MAX_ANGLE_BUCKETS).contains(&self.angle_buckets) {
            return Err(invalid(format!(
                "hough.angle_buckets must be in 1..={}, got {}",
                Self::MAX_ANGLE_BUCKETS,
                self.angle_buckets
            )));
        }
        if !(self.rho_resolution.is_finite() && self.rho_resolution >= Self::MIN_RHO_RESOLUTION) {
            return Err(invalid(format!(
                "hough.rho_resolution must be at least {}, got {}",
                Self::MIN_RHO_RESOLUTION,
                self.rho_resolution
            )));
        }
        if self.sample_stride == 0 {
            return Err(invalid("hough.sample_stride must be at least 1"));
        }
        Ok(())
    }
}

impl MergeParams {
    pub fn validate(&self) -> Result<()> {
        let values = [
            ("angle_tolerance", self.angle_tolerance),
            ("endpoint_distance", self.endpoint_distance),
            ("min_length", self.min_length),
            ("min_confidence", self.min_confidence),
        ];
        for (name, value) in values {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(format!("merge.{name} must be a non-negative number")));
            }
        }
        Ok(())
    }
}
