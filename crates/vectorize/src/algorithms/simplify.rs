use draft_common::Point2D;
use crate::traits::PathSimplifier;

/// One-pass greedy distance simplifier.
///
/// Not Douglas-Peucker: a point is kept only when it lies more than
/// `tolerance` from the last kept point, and the true last point is always
/// appended. O(n), works on a stream, but not optimal.
#[derive(Debug, Clone)]
pub struct GreedySimplifier {
    pub tolerance: f64,
}

impl Default for GreedySimplifier {
    fn default() -> Self {
        Self { tolerance: 2.0 }
    }
}

impl PathSimplifier for GreedySimplifier {
    fn simplify(&self, points: &[Point2D]) -> Vec<Point2D> {
        simplify_path(points, self.tolerance)
    }
}

/// Greedy simplification of `points`; the endpoints are always preserved.
pub fn simplify_path(points: &[Point2D], tolerance: f64) -> Vec<Point2D> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut simplified = vec![points[0]];
    let mut last_kept = points[0];

    for &point in &points[1..] {
        if point.distance_to(last_kept) > tolerance {
            simplified.push(point);
            last_kept = point;
        }
    }

    if let Some(&last) = points.last() {
        if last != last_kept {
            simplified.push(last);
        }
    }

    simplified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2D> {
        coords.iter().map(|&(x, y)| Point2D::new(x, y)).collect()
    }

    #[test]
    fn test_drops_close_points() {
        let input = pts(&[(0.0, 0.0), (1.0, 0.0), (2.5, 0.0), (3.0, 0.0), (6.0, 0.0)]);
        let output = simplify_path(&input, 2.0);
        assert_eq!(output, pts(&[(0.0, 0.0), (2.5, 0.0), (6.0, 0.0)]));
    }

    #[test]
    fn test_endpoint_is_forced() {
        let input = pts(&[(0.0, 0.0), (5.0, 0.0), (5.5, 0.0)]);
        let output = simplify_path(&input, 2.0);
        assert_eq!(output, pts(&[(0.0, 0.0), (5.0, 0.0), (5.5, 0.0)]));
    }

    #[test]
    fn test_short_inputs_unchanged() {
        assert!(simplify_path(&[], 2.0).is_empty());
        let pair = pts(&[(0.0, 0.0), (0.5, 0.0)]);
        assert_eq!(simplify_path(&pair, 2.0), pair);
    }

    #[test]
    fn test_properties_on_dense_curve() {
        let input: Vec<Point2D> = (0..500)
            .map(|i| {
                let t = i as f64 * 0.05;
                Point2D::new(t * 10.0, (t * 3.0).sin() * 20.0)
            })
            .collect();
        let tolerance = 3.0;
        let output = simplify_path(&input, tolerance);

        assert_eq!(output.first(), input.first());
        assert_eq!(output.last(), input.last());
        assert!(output.len() <= input.len());

        // Every consecutive pair is far apart, except possibly the forced final one
        for (i, pair) in output.windows(2).enumerate() {
            let is_final_pair = i + 2 == output.len();
            assert!(is_final_pair || pair[0].distance_to(pair[1]) > tolerance);
        }
    }
}
