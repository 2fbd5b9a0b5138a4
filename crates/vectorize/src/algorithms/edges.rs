use image::{DynamicImage, GrayImage, Luma};
use crate::{error::Result, traits::EdgeDetector};

/// Morphological-gradient edge filter.
///
/// Each output pixel is `(max - min)` over its 3x3 neighbourhood, scaled by
/// `10 * threshold` and clamped to 255. Flat regions map to 0, boundaries
/// (including both sides of thin strokes and the stroke itself) light up.
#[derive(Debug, Clone)]
pub struct EdgeMap {
    pub threshold: f64,
    /// Optional Gaussian pre-blur for noisy sources
    pub blur_sigma: Option<f32>,
}

impl Default for EdgeMap {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            blur_sigma: None,
        }
    }
}

impl EdgeMap {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            blur_sigma: None,
        }
    }

    pub fn with_blur(mut self, sigma: Option<f32>) -> Self {
        self.blur_sigma = sigma;
        self
    }

    pub fn gain(&self) -> f64 {
        self.threshold * 10.0
    }

    /// Edge raster of a greyscale image. Zero-area input gives zero-area output.
    pub fn apply(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return GrayImage::new(width, height);
        }

        let blurred;
        let source = match self.blur_sigma {
            Some(sigma) => {
                blurred = imageproc::filter::gaussian_blur_f32(image, sigma);
                &blurred
            }
            None => image,
        };

        let gain = self.gain();
        GrayImage::from_fn(width, height, |x, y| {
            let (low, high) = neighbourhood_range(source, x, y);
            let scaled = (f64::from(high - low) * gain).round().min(255.0);
            Luma([scaled as u8])
        })
    }

    /// Desaturate a colour image, then filter it
    pub fn apply_dynamic(&self, image: &DynamicImage) -> GrayImage {
        self.apply(&image.to_luma8())
    }
}

impl EdgeDetector for EdgeMap {
    fn detect_edges(&self, image: &GrayImage) -> Result<GrayImage> {
        Ok(self.apply(image))
    }
}

/// Convenience wrapper: greyscale + edge filter in one call
pub fn edge_map(image: &DynamicImage, threshold: f64) -> GrayImage {
    EdgeMap::new(threshold).apply_dynamic(image)
}

/// `(min, max)` intensity over the 3x3 window centred on `(x, y)`, clipped to the image
fn neighbourhood_range(image: &GrayImage, x: u32, y: u32) -> (u8, u8) {
    let x_range = x.saturating_sub(1)..=(x + 1).min(image.width() - 1);
    let y_range = y.saturating_sub(1)..=(y + 1).min(image.height() - 1);

    let mut low = u8::MAX;
    let mut high = u8::MIN;
    for ny in y_range {
        for nx in x_range.clone() {
            let value = image.get_pixel(nx, ny)[0];
            low = low.min(value);
            high = high.max(value);
        }
    }
    (low, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_image() -> GrayImage {
        let mut img = GrayImage::new(40, 40);
        for y in 10..30 {
            for x in 10..30 {
                img.put_pixel(x, y, Luma([200u8]));
            }
        }
        img
    }

    #[test]
    fn test_boundaries_brighter_than_flat_regions() {
        let edges = EdgeMap::new(0.5).apply(&square_image());

        assert_eq!(edges.dimensions(), (40, 40));
        // Flat background and flat interior
        assert_eq!(edges.get_pixel(2, 2)[0], 0);
        assert_eq!(edges.get_pixel(20, 20)[0], 0);
        // Boundary pixels on both sides of the step
        assert_eq!(edges.get_pixel(10, 20)[0], 255);
        assert_eq!(edges.get_pixel(9, 20)[0], 255);
    }

    #[test]
    fn test_strength_scales_with_threshold() {
        let mut img = GrayImage::new(10, 10);
        for y in 0..10 {
            for x in 5..10 {
                img.put_pixel(x, y, Luma([20u8]));
            }
        }
        let weak = EdgeMap::new(0.1).apply(&img);
        let strong = EdgeMap::new(1.0).apply(&img);

        assert_eq!(weak.get_pixel(5, 5)[0], 20);
        assert_eq!(strong.get_pixel(5, 5)[0], 200);
    }

    #[test]
    fn test_zero_area_image() {
        let edges = EdgeMap::default().apply(&GrayImage::new(0, 12));
        assert_eq!(edges.dimensions(), (0, 12));
    }

    #[test]
    fn test_colour_image_is_desaturated() {
        let mut rgb = image::RgbImage::new(8, 8);
        rgb.put_pixel(4, 4, image::Rgb([255, 255, 255]));
        let edges = edge_map(&DynamicImage::ImageRgb8(rgb), 0.5);
        assert_eq!(edges.get_pixel(4, 4)[0], 255);
        assert_eq!(edges.get_pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_blur_softens_edges() {
        let sharp = EdgeMap::new(0.05).apply(&square_image());
        let soft = EdgeMap::new(0.05).with_blur(Some(2.0)).apply(&square_image());
        assert!(soft.get_pixel(10, 20)[0] < sharp.get_pixel(10, 20)[0]);
    }
}
