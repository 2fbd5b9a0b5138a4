use draft_common::{Polyline, StrokeColor};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

fn to_rgb(color: StrokeColor) -> Rgb<u8> {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb([channel(color.r), channel(color.g), channel(color.b)])
}

/// Draw `polylines` over a copy of `image`, one segment per consecutive
/// point pair, in each polyline's stroke color.
pub fn render_overlay(image: &DynamicImage, polylines: &[Polyline]) -> RgbImage {
    let mut canvas = image.to_rgb8();
    for polyline in polylines {
        let color = to_rgb(polyline.color);
        for pair in polyline.points.windows(2) {
            draw_line_segment_mut(
                &mut canvas,
                (pair[0].x as f32, pair[0].y as f32),
                (pair[1].x as f32, pair[1].y as f32),
                color,
            );
        }
    }
    canvas
}
