use std::f64::consts::{FRAC_PI_2, PI};

use draft_common::{Point2D, Polyline};
use tracing::debug;

use crate::{
    config::MergeParams,
    traits::LineMerger,
    types::{normalize_angle, DetectedLine},
};

/// Greedy single-pass line consolidation.
///
/// Lines are visited in detection order. Each unmerged line absorbs every
/// later unmerged line that is nearly parallel and nearly touching; the
/// running result is what later candidates are compared against. The pass
/// is not repeated to a fixed point, so output depends on input order.
#[derive(Debug, Clone, Default)]
pub struct GreedyLineMerger {
    pub params: MergeParams,
}

impl GreedyLineMerger {
    pub fn new(params: MergeParams) -> Self {
        Self { params }
    }

    pub fn merge(&self, lines: &[DetectedLine]) -> Vec<DetectedLine> {
        let mut used = vec![false; lines.len()];
        let mut merged = Vec::new();

        for i in 0..lines.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            let mut current = lines[i];

            for j in (i + 1)..lines.len() {
                if used[j] || !self.should_merge(&current, &lines[j]) {
                    continue;
                }
                current = merge_pair(&current, &lines[j]);
                used[j] = true;
            }

            merged.push(current);
        }

        debug!(input = lines.len(), output = merged.len(), "merged lines");
        merged
    }

    /// Parallel within tolerance (including across the π wrap) and close enough
    pub fn should_merge(&self, a: &DetectedLine, b: &DetectedLine) -> bool {
        let diff = (a.angle - b.angle).abs();
        let tolerance = self.params.angle_tolerance;
        let parallel = diff < tolerance || diff > PI - tolerance;
        parallel && a.endpoint_distance(b) < self.params.endpoint_distance
    }

    /// Keep lines that are long and confident enough, as document polylines
    pub fn to_polylines(&self, lines: &[DetectedLine]) -> Vec<Polyline> {
        lines
            .iter()
            .filter(|line| {
                line.length() > self.params.min_length && line.confidence > self.params.min_confidence
            })
            .map(DetectedLine::to_polyline)
            .collect()
    }
}

impl LineMerger for GreedyLineMerger {
    fn merge_lines(&self, lines: &[DetectedLine]) -> Vec<DetectedLine> {
        self.merge(lines)
    }
}

/// Span the leftmost and rightmost of the four endpoints, averaging confidence
/// and orientation.
pub fn merge_pair(a: &DetectedLine, b: &DetectedLine) -> DetectedLine {
    let endpoints = [a.start, a.end, b.start, b.end];
    let by_x = |p: &&Point2D, q: &&Point2D| p.x.total_cmp(&q.x);
    // min_by keeps the first of equal minima, max_by the last of equal maxima
    let start = *endpoints.iter().min_by(by_x).unwrap_or(&a.start);
    let end = *endpoints.iter().max_by(by_x).unwrap_or(&b.end);

    DetectedLine::new(
        start,
        end,
        (a.confidence + b.confidence) / 2.0,
        average_orientation(a.angle, b.angle),
    )
}

/// Mean of two orientations on the π-periodic circle
fn average_orientation(a: f64, b: f64) -> f64 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    if high - low > FRAC_PI_2 {
        normalize_angle((low + PI + high) / 2.0)
    } else {
        (low + high) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::angle_separation;
    use draft_common::DrawingTool;

    fn line(x1: f64, y1: f64, x2: f64, y2: f64, angle: f64) -> DetectedLine {
        DetectedLine::new(Point2D::new(x1, y1), Point2D::new(x2, y2), 1.0, angle)
    }

    #[test]
    fn test_collinear_touching_lines_merge() {
        let lines = [line(0.0, 0.0, 50.0, 0.0, 0.0), line(55.0, 0.0, 100.0, 0.0, 0.0)];
        let merged = GreedyLineMerger::default().merge(&lines);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start, Point2D::new(0.0, 0.0));
        assert_eq!(merged[0].end, Point2D::new(100.0, 0.0));
        assert!((merged[0].length() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_parallel_lines_stay_apart() {
        let lines = [line(0.0, 0.0, 50.0, 0.0, 0.0), line(0.0, 0.0, 0.0, 50.0, FRAC_PI_2)];
        let merged = GreedyLineMerger::default().merge(&lines);
        assert_eq!(merged.len(), 2);

        let slightly_off = [line(0.0, 0.0, 50.0, 0.0, 0.0), line(50.0, 2.0, 90.0, 10.0, 0.15)];
        assert_eq!(GreedyLineMerger::default().merge(&slightly_off).len(), 2);
    }

    #[test]
    fn test_distant_parallel_lines_stay_apart() {
        let lines = [line(0.0, 0.0, 50.0, 0.0, 0.0), line(80.0, 0.0, 120.0, 0.0, 0.0)];
        assert_eq!(GreedyLineMerger::default().merge(&lines).len(), 2);
    }

    #[test]
    fn test_wraparound_orientations_merge() {
        let lines = [
            line(0.0, 0.0, 50.0, 0.5, 0.01),
            line(52.0, 0.5, 100.0, 0.0, PI - 0.01),
        ];
        let merged = GreedyLineMerger::default().merge(&lines);

        assert_eq!(merged.len(), 1);
        assert!(angle_separation(merged[0].angle, 0.0) < 1e-9);
    }

    #[test]
    fn test_adjacent_hough_buckets_collapse_to_one_line() {
        // A horizontal stroke peaks in the buckets just below, at and above
        // θ = π/2, whose orientations straddle the wrap
        let bucket = PI / 180.0;
        let lines = [
            line(10.0, 50.0, 90.0, 50.0, PI - bucket),
            line(10.0, 50.0, 90.0, 50.0, 0.0),
            line(10.0, 50.0, 90.0, 50.0, bucket),
        ];
        let merged = GreedyLineMerger::default().merge(&lines);

        assert_eq!(merged.len(), 1);
        assert!(angle_separation(merged[0].angle, 0.0) <= bucket);
        assert!((merged[0].length() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_running_line_absorbs_chain_in_order() {
        // The middle segment bridges the outer ones; detection order decides
        let lines = [
            line(0.0, 0.0, 30.0, 0.0, 0.0),
            line(70.0, 0.0, 100.0, 0.0, 0.0),
            line(40.0, 0.0, 60.0, 0.0, 0.0),
        ];
        let merged = GreedyLineMerger::default().merge(&lines);
        // Line 1 is too far from line 0 when it is visited, so it survives on its own
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].end, Point2D::new(60.0, 0.0));
        assert_eq!(merged[1].start, Point2D::new(70.0, 0.0));
    }

    #[test]
    fn test_confidence_and_angle_are_averaged() {
        let a = DetectedLine::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0), 0.4, 0.02);
        let b = DetectedLine::new(Point2D::new(12.0, 0.0), Point2D::new(30.0, 0.0), 0.8, 0.06);
        let merged = merge_pair(&a, &b);
        assert!((merged.confidence - 0.6).abs() < 1e-12);
        assert!((merged.angle - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_polyline_filter() {
        let merger = GreedyLineMerger::default();
        let lines = [
            line(0.0, 0.0, 50.0, 0.0, 0.0),
            line(0.0, 10.0, 5.0, 10.0, 0.0),
            DetectedLine::new(Point2D::new(0.0, 20.0), Point2D::new(50.0, 20.0), 0.5, 0.0),
        ];
        let polylines = merger.to_polylines(&lines);

        assert_eq!(polylines.len(), 1);
        assert_eq!(polylines[0].points.len(), 2);
        assert_eq!(polylines[0].tool, DrawingTool::Line);
    }
}
