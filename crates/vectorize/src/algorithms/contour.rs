use std::collections::VecDeque;

use draft_common::Point2D;
use image::GrayImage;
use tracing::trace;

use crate::{error::Result, traits::ContourExtractor};

/// Neighbour expansion order. Changing it changes every traced contour.
const NEIGHBOURS: [(i64, i64); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
];

/// Flood-fill contour tracer.
///
/// Seeds are scanned row-major at `step` stride; every unvisited "on" seed
/// grows an 8-connected breadth-first region whose pixels, in discovery
/// order, form one contour. Regions are capped at `max_points` so dense
/// noise cannot run away.
#[derive(Debug, Clone)]
pub struct ContourTracer {
    pub step: usize,
    /// Pixels with intensity strictly above this are "on"
    pub cut: u8,
    pub max_points: usize,
    /// Contours with fewer raw points are dropped
    pub min_points: usize,
}

impl Default for ContourTracer {
    fn default() -> Self {
        Self {
            step: 2,
            cut: 128,
            max_points: 1000,
            min_points: 4,
        }
    }
}

impl ContourTracer {
    pub fn new(step: usize, cut: u8) -> Self {
        Self {
            step,
            cut,
            ..Self::default()
        }
    }

    /// Trace all contours of an edge raster
    pub fn trace(&self, edges: &GrayImage) -> Vec<Vec<Point2D>> {
        let width = edges.width() as usize;
        let height = edges.height() as usize;
        let mut contours = Vec::new();
        if width == 0 || height == 0 {
            return contours;
        }

        let step = self.step.max(1);
        let mut visited = vec![false; width * height];

        for y in (0..height).step_by(step) {
            for x in (0..width).step_by(step) {
                if visited[y * width + x] || !self.is_on(edges, x, y) {
                    continue;
                }

                let contour = self.flood(edges, x, y, &mut visited);
                if contour.len() >= self.min_points {
                    contours.push(contour);
                } else {
                    trace!(x, y, points = contour.len(), "dropping small contour");
                }
            }
        }

        contours
    }

    fn is_on(&self, edges: &GrayImage, x: usize, y: usize) -> bool {
        edges.get_pixel(x as u32, y as u32)[0] > self.cut
    }

    fn flood(&self, edges: &GrayImage, x: usize, y: usize, visited: &mut [bool]) -> Vec<Point2D> {
        let width = edges.width() as i64;
        let height = edges.height() as i64;
        let in_bounds = |x: i64, y: i64| x >= 0 && x < width && y >= 0 && y < height;

        let mut points = Vec::new();
        let mut queue = VecDeque::from([(x as i64, y as i64)]);

        while points.len() < self.max_points {
            let Some((cx, cy)) = queue.pop_front() else {
                break;
            };
            if !in_bounds(cx, cy) {
                continue;
            }
            let index = (cy * width + cx) as usize;
            if visited[index] || !self.is_on(edges, cx as usize, cy as usize) {
                continue;
            }

            visited[index] = true;
            points.push(Point2D::new(cx as f64, cy as f64));

            for (dx, dy) in NEIGHBOURS {
                let (nx, ny) = (cx + dx, cy + dy);
                if in_bounds(nx, ny) && !visited[(ny * width + nx) as usize] {
                    queue.push_back((nx, ny));
                }
            }
        }

        points
    }
}

impl ContourExtractor for ContourTracer {
    fn extract_contours(&self, edges: &GrayImage) -> Result<Vec<Vec<Point2D>>> {
        Ok(self.trace(edges))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn blob_image() -> GrayImage {
        let mut img = GrayImage::new(30, 30);
        for y in 4..8 {
            for x in 4..8 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        for y in 20..26 {
            for x in 10..25 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        img
    }

    #[test]
    fn test_finds_separate_regions() {
        let contours = ContourTracer::new(2, 128).trace(&blob_image());
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].len(), 16);
        assert_eq!(contours[1].len(), 90);
        // The seed is the first point of its contour
        assert_eq!(contours[0][0], Point2D::new(4.0, 4.0));
    }

    #[test]
    fn test_neighbour_discovery_order() {
        let mut img = GrayImage::new(5, 5);
        for y in 1..4 {
            for x in 1..4 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        let contours = ContourTracer::new(1, 128).trace(&img);
        assert_eq!(contours.len(), 1);
        let expected = [
            (1.0, 1.0),
            (2.0, 1.0),
            (1.0, 2.0),
            (2.0, 2.0),
            (3.0, 1.0),
            (3.0, 2.0),
            (1.0, 3.0),
            (2.0, 3.0),
            (3.0, 3.0),
        ];
        let actual: Vec<(f64, f64)> = contours[0].iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_deterministic() {
        let tracer = ContourTracer::new(2, 128);
        let first = tracer.trace(&blob_image());
        let second = tracer.trace(&blob_image());
        assert_eq!(first, second);
    }

    #[test]
    fn test_small_contours_discarded() {
        let mut img = GrayImage::new(10, 10);
        for x in 2..5 {
            img.put_pixel(x, 2, Luma([255u8]));
        }
        let contours = ContourTracer::new(1, 128).trace(&img);
        assert!(contours.is_empty(), "three-point contour must be dropped");

        img.put_pixel(5, 2, Luma([255u8]));
        let contours = ContourTracer::new(1, 128).trace(&img);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4);
    }

    #[test]
    fn test_contour_size_is_bounded() {
        let img = GrayImage::from_pixel(60, 60, Luma([255u8]));
        let contours = ContourTracer::new(1, 128).trace(&img);
        assert!(!contours.is_empty());
        assert!(contours.iter().all(|c| c.len() <= 1000));
        assert_eq!(contours[0].len(), 1000);
    }

    #[test]
    fn test_cut_is_strict() {
        let img = GrayImage::from_pixel(6, 6, Luma([128u8]));
        assert!(ContourTracer::new(1, 128).trace(&img).is_empty());
        assert_eq!(ContourTracer::new(1, 127).trace(&img).len(), 1);
    }
}
