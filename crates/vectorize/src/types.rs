use std::f64::consts::PI;

use draft_common::{DrawingTool, Point2D, Polyline, StrokeColor};
use serde::{Deserialize, Serialize};

/// Stroke width given to contour and external-detector polylines
pub const CONTOUR_LINE_WIDTH: f64 = 2.0;
/// Stroke width given to merged Hough lines
pub const DETECTED_LINE_WIDTH: f64 = 1.5;

/// Fold an angle into `[0, π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let folded = angle.rem_euclid(PI);
    if folded >= PI { 0.0 } else { folded }
}

/// Orientation of the direction `start -> end`, folded into `[0, π)`
pub fn orientation(start: Point2D, end: Point2D) -> f64 {
    normalize_angle((end.y - start.y).atan2(end.x - start.x))
}

/// Difference between two orientations on the π-periodic circle, in `[0, π/2]`
pub fn angle_separation(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % PI;
    diff.min(PI - diff)
}

/// A straight segment found by line detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedLine {
    pub start: Point2D,
    pub end: Point2D,
    /// Vote strength relative to the detection threshold, in `[0, 1]`
    pub confidence: f64,
    /// Orientation of the segment in `[0, π)`
    pub angle: f64,
}

impl DetectedLine {
    pub fn new(start: Point2D, end: Point2D, confidence: f64, angle: f64) -> Self {
        Self {
            start,
            end,
            confidence,
            angle,
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    /// Smallest of the four endpoint-to-endpoint distances
    pub fn endpoint_distance(&self, other: &DetectedLine) -> f64 {
        [
            self.start.distance_to(other.start),
            self.start.distance_to(other.end),
            self.end.distance_to(other.start),
            self.end.distance_to(other.end),
        ]
        .into_iter()
        .fold(f64::INFINITY, f64::min)
    }

    pub fn to_polyline(&self) -> Polyline {
        Polyline::new(
            vec![self.start, self.end],
            StrokeColor::RED,
            DETECTED_LINE_WIDTH,
            DrawingTool::Line,
        )
    }
}

/// Output of a shape detector: free-form contours or quadrilaterals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "points", rename_all = "snake_case")]
pub enum DetectedShape {
    Polyline(Vec<Point2D>),
    /// Corners in drawing order (e.g. top-left, top-right, bottom-right, bottom-left)
    Quad([Point2D; 4]),
}

impl DetectedShape {
    /// Convert to a document polyline. Quads become closed five-point rectangles.
    pub fn into_polyline(self) -> Polyline {
        match self {
            Self::Polyline(points) => Polyline::new(
                points,
                StrokeColor::BLACK,
                CONTOUR_LINE_WIDTH,
                DrawingTool::Pencil,
            ),
            Self::Quad(corners) => {
                let mut points = corners.to_vec();
                points.push(corners[0]);
                Polyline::new(
                    points,
                    StrokeColor::BLUE,
                    CONTOUR_LINE_WIDTH,
                    DrawingTool::Rectangle,
                )
            }
        }
    }
}

/// Result of one trace invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceOutcome {
    /// Contours first, then merged lines, then externally detected shapes
    pub polylines: Vec<Polyline>,
    pub contour_count: usize,
    pub line_count: usize,
    pub shape_count: usize,
    pub image_width: u32,
    pub image_height: u32,
}

impl TraceOutcome {
    pub fn empty(image_width: u32, image_height: u32) -> Self {
        Self {
            image_width,
            image_height,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    /// Total number of points across all polylines
    pub fn point_count(&self) -> usize {
        self.polylines.iter().map(|p| p.points.len()).sum()
    }

    /// Summed segment length of every polyline, in pixels
    pub fn stroke_length(&self) -> f64 {
        self.polylines.iter().map(Polyline::length).sum()
    }

    /// Axis-aligned `(min, max)` bounds of all traced geometry
    pub fn bounds(&self) -> Option<(Point2D, Point2D)> {
        self.polylines
            .iter()
            .filter_map(Polyline::bounding_box)
            .reduce(|(lo, hi), (min, max)| {
                (
                    Point2D::new(lo.x.min(min.x), lo.y.min(min.y)),
                    Point2D::new(hi.x.max(max.x), hi.y.max(max.y)),
                )
            })
    }
}
