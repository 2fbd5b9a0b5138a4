use geo_types::{Coord, LineString};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::Point2D;

/// Tool a polyline was created with (its provenance)
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash, Default
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DrawingTool {
    Select,
    #[default]
    Pencil,
    Brush,
    Eraser,
    Line,
    Rectangle,
    Ellipse,
    Measure,
}

/// RGBA stroke color with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StrokeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl StrokeColor {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::BLACK
    }
}

/// An ordered stroke; point order is the path direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Polyline {
    pub points: Vec<Point2D>,
    pub color: StrokeColor,
    pub line_width: f64,
    pub tool: DrawingTool,
}

impl Polyline {
    pub fn new(points: Vec<Point2D>, color: StrokeColor, line_width: f64, tool: DrawingTool) -> Self {
        Self {
            points,
            color,
            line_width,
            tool,
        }
    }

    /// Polylines with fewer than two points carry no geometry to extrude
    pub fn is_extrudable(&self) -> bool {
        self.points.len() >= 2
    }

    /// Convert to a geo-types LineString for geometric operations
    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.points.iter().copied().map(Coord::from).collect())
    }

    /// Total length of all segments
    pub fn length(&self) -> f64 {
        use geo::EuclideanLength;
        self.to_line_string().euclidean_length()
    }

    /// Axis-aligned bounds as `(min, max)`, `None` for an empty polyline
    pub fn bounding_box(&self) -> Option<(Point2D, Point2D)> {
        use geo::BoundingRect;
        self.to_line_string().bounding_rect().map(|rect| {
            (
                Point2D::new(rect.min().x, rect.min().y),
                Point2D::new(rect.max().x, rect.max().y),
            )
        })
    }
}
