use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI};

use draft_common::Point2D;
use image::GrayImage;
use tracing::debug;

use crate::{
    config::HoughParams,
    error::{Result, TraceError},
    traits::LineDetector,
    types::{normalize_angle, DetectedLine},
};

/// Below this `|sin θ|` a line is treated as vertical and solved against the
/// top and bottom edges instead of the left and right ones.
const VERTICAL_SIN_EPSILON: f64 = 0.001;

/// Keeps ρ values that are integral up to rounding noise in their intended bucket
const RHO_EPSILON: f64 = 1e-9;

/// Largest vote grid the detector will allocate (128 MiB of `u32` cells)
pub const MAX_ACCUMULATOR_CELLS: usize = 1 << 25;

/// Classic Hough line detector over `(θ, ρ)` with `ρ = x·cos θ + y·sin θ`.
#[derive(Debug, Clone, Default)]
pub struct HoughLineDetector {
    pub params: HoughParams,
}

impl HoughLineDetector {
    pub fn new(params: HoughParams) -> Self {
        Self { params }
    }

    /// Edge pixels sampled at `sample_stride`, brighter than `edge_cut`
    pub fn edge_points(&self, edges: &GrayImage) -> Vec<Point2D> {
        let stride = self.params.sample_stride.max(1);
        let mut points = Vec::new();
        for y in (0..edges.height()).step_by(stride) {
            for x in (0..edges.width()).step_by(stride) {
                if edges.get_pixel(x, y)[0] > self.params.edge_cut {
                    points.push(Point2D::new(f64::from(x), f64::from(y)));
                }
            }
        }
        points
    }

    pub fn detect(&self, edges: &GrayImage) -> Result<Vec<DetectedLine>> {
        self.params.validate()?;
        let points = self.edge_points(edges);
        self.detect_points(&points, edges.width(), edges.height())
    }

    /// Vote with explicit edge points inside a `width` x `height` raster.
    /// Lines come out in ascending `(angle bucket, ρ bucket)` order.
    /// Fails on parameters that would need an oversized vote grid.
    pub fn detect_points(&self, points: &[Point2D], width: u32, height: u32) -> Result<Vec<DetectedLine>> {
        self.params.validate()?;
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let mut accumulator = Accumulator::new(width, height, &self.params)?;
        for &point in points {
            accumulator.vote(point);
        }

        let peaks = accumulator.peaks(self.params.vote_threshold);
        debug!(points = points.len(), peaks = peaks.len(), "hough voting done");

        let extents = if self.params.clip_to_support {
            Some(accumulator.support_extents(points, &peaks))
        } else {
            None
        };

        let lines = peaks
            .iter()
            .enumerate()
            .map(|(slot, peak)| {
                let theta = accumulator.theta(peak.angle_bucket);
                let rho = peak.rho_bucket as f64 * self.params.rho_resolution;
                let (start, end) = match &extents {
                    Some(extents) => clipped_endpoints(theta, rho, extents[slot]),
                    None => boundary_endpoints(theta, rho, width, height),
                };
                let (start, end) = ordered(start, end);
                DetectedLine::new(
                    start,
                    end,
                    confidence(peak.votes, self.params.vote_threshold),
                    normalize_angle(theta + FRAC_PI_2),
                )
            })
            .collect();
        Ok(lines)
    }
}

impl LineDetector for HoughLineDetector {
    fn detect_lines(&self, edges: &GrayImage) -> Result<Vec<DetectedLine>> {
        self.detect(edges)
    }
}

#[derive(Debug, Clone, Copy)]
struct Peak {
    angle_bucket: usize,
    rho_bucket: i64,
    votes: u32,
}

/// Projection range of a cell's supporting points along the line direction
#[derive(Debug, Clone, Copy)]
struct Extent {
    min: f64,
    max: f64,
}

/// Dense `(angle bucket, ρ bucket)` vote grid. ρ buckets are shifted by
/// `rho_offset` so every in-raster point has a valid, bounded index.
struct Accumulator {
    angle_buckets: usize,
    rho_buckets: usize,
    rho_offset: i64,
    rho_resolution: f64,
    angle_step: f64,
    cos: Vec<f64>,
    sin: Vec<f64>,
    votes: Vec<u32>,
}

impl Accumulator {
    fn new(width: u32, height: u32, params: &HoughParams) -> Result<Self> {
        let diagonal = f64::from(width).hypot(f64::from(height));
        let half_span = (diagonal / params.rho_resolution).ceil() + 1.0;
        let cells = (2.0 * half_span + 1.0) * params.angle_buckets as f64;
        if !cells.is_finite() || cells > MAX_ACCUMULATOR_CELLS as f64 {
            return Err(TraceError::InvalidConfig(format!(
                "hough grid of {cells} cells for a {width}x{height} image exceeds {MAX_ACCUMULATOR_CELLS}; \
                 raise rho_resolution or lower angle_buckets"
            )));
        }
        let rho_offset = half_span as i64;
        let rho_buckets = (2 * rho_offset + 1) as usize;
        let angle_step = PI / params.angle_buckets as f64;
        let (sin, cos): (Vec<f64>, Vec<f64>) = (0..params.angle_buckets)
            .map(|bucket| (bucket as f64 * angle_step).sin_cos())
            .unzip();

        Ok(Self {
            angle_buckets: params.angle_buckets,
            rho_buckets,
            rho_offset,
            rho_resolution: params.rho_resolution,
            angle_step,
            cos,
            sin,
            votes: vec![0; params.angle_buckets * rho_buckets],
        })
    }

    fn theta(&self, angle_bucket: usize) -> f64 {
        angle_bucket as f64 * self.angle_step
    }

    fn rho_bucket(&self, angle_bucket: usize, point: Point2D) -> i64 {
        let rho = point.x * self.cos[angle_bucket] + point.y * self.sin[angle_bucket];
        (rho / self.rho_resolution + RHO_EPSILON).floor() as i64
    }

    /// Flat index of a cell, `None` when ρ falls outside the grid
    fn cell(&self, angle_bucket: usize, rho_bucket: i64) -> Option<usize> {
        let shifted = usize::try_from(rho_bucket + self.rho_offset).ok()?;
        (shifted < self.rho_buckets).then(|| angle_bucket * self.rho_buckets + shifted)
    }

    fn vote(&mut self, point: Point2D) {
        for angle_bucket in 0..self.angle_buckets {
            let rho_bucket = self.rho_bucket(angle_bucket, point);
            if let Some(cell) = self.cell(angle_bucket, rho_bucket) {
                self.votes[cell] += 1;
            }
        }
    }

    fn peaks(&self, threshold: u32) -> Vec<Peak> {
        self.votes
            .iter()
            .enumerate()
            .filter(|&(_, &votes)| votes > threshold)
            .map(|(cell, &votes)| Peak {
                angle_bucket: cell / self.rho_buckets,
                rho_bucket: (cell % self.rho_buckets) as i64 - self.rho_offset,
                votes,
            })
            .collect()
    }

    /// Second pass: for each peak, how far along its line the voters reach
    fn support_extents(&self, points: &[Point2D], peaks: &[Peak]) -> Vec<Extent> {
        let slots: HashMap<usize, usize> = peaks
            .iter()
            .enumerate()
            .filter_map(|(slot, peak)| Some((self.cell(peak.angle_bucket, peak.rho_bucket)?, slot)))
            .collect();
        let mut extents = vec![
            Extent {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            };
            peaks.len()
        ];

        for &point in points {
            for angle_bucket in 0..self.angle_buckets {
                let rho_bucket = self.rho_bucket(angle_bucket, point);
                let Some(slot) = self.cell(angle_bucket, rho_bucket).and_then(|cell| slots.get(&cell))
                else {
                    continue;
                };
                // Direction of the line is (-sin θ, cos θ)
                let along = -point.x * self.sin[angle_bucket] + point.y * self.cos[angle_bucket];
                let extent = &mut extents[*slot];
                extent.min = extent.min.min(along);
                extent.max = extent.max.max(along);
            }
        }

        extents
    }
}

fn confidence(votes: u32, threshold: u32) -> f64 {
    if threshold == 0 {
        return 1.0;
    }
    (f64::from(votes) / f64::from(threshold)).min(1.0)
}

/// Intersect the line `(θ, ρ)` with the raster's left/right edges, or with
/// the top/bottom edges when the line is (nearly) vertical.
pub fn boundary_endpoints(theta: f64, rho: f64, width: u32, height: u32) -> (Point2D, Point2D) {
    let (sin, cos) = theta.sin_cos();
    if sin.abs() > VERTICAL_SIN_EPSILON {
        let x2 = f64::from(width);
        (
            Point2D::new(0.0, rho / sin),
            Point2D::new(x2, (rho - x2 * cos) / sin),
        )
    } else {
        let x = rho / cos;
        (Point2D::new(x, 0.0), Point2D::new(x, f64::from(height)))
    }
}

/// Segment of the line `(θ, ρ)` spanning the projected extent of its voters
fn clipped_endpoints(theta: f64, rho: f64, extent: Extent) -> (Point2D, Point2D) {
    let (sin, cos) = theta.sin_cos();
    let foot = Point2D::new(rho * cos, rho * sin);
    let at = |t: f64| foot.translate(-t * sin, t * cos);
    (at(extent.min), at(extent.max))
}

/// Put the endpoint with the smaller x (then y) first
fn ordered(a: Point2D, b: Point2D) -> (Point2D, Point2D) {
    if (b.x, b.y) < (a.x, a.y) { (b, a) } else { (a, b) }
}
