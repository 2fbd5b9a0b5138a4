use draft_common::{DrawingTool, Point2D};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use extrude::MeshExtruder;
use vectorize::{
    algorithms::{EdgeMap, GreedyLineMerger, HoughLineDetector},
    types::angle_separation,
    Pipeline, PipelineBuilder, TraceConfig, TraceError, TraceWorker,
};

/// 100x100 black canvas with a white horizontal stroke from (10, 50) to (90, 50)
fn horizontal_stroke() -> DynamicImage {
    let mut img = GrayImage::new(100, 100);
    for x in 10..=90 {
        img.put_pixel(x, 50, Luma([255u8]));
    }
    DynamicImage::ImageLuma8(img)
}

fn rectangle_sketch() -> DynamicImage {
    let mut img = RgbImage::from_pixel(120, 90, Rgb([255, 255, 255]));
    for x in 20..=100 {
        img.put_pixel(x, 20, Rgb([0, 0, 0]));
        img.put_pixel(x, 70, Rgb([0, 0, 0]));
    }
    for y in 20..=70 {
        img.put_pixel(20, y, Rgb([0, 0, 0]));
        img.put_pixel(100, y, Rgb([0, 0, 0]));
    }
    DynamicImage::ImageRgb8(img)
}

#[test]
fn horizontal_stroke_is_detected_as_one_line() {
    let config = TraceConfig::default();
    let edges = EdgeMap::new(config.line_strength).apply_dynamic(&horizontal_stroke());
    let raw = HoughLineDetector::new(config.hough.clone())
        .detect(&edges)
        .expect("default parameters are valid");
    let merged = GreedyLineMerger::new(config.merge.clone()).merge(&raw);

    let line = merged
        .iter()
        .find(|line| angle_separation(line.angle, 0.0) < 0.05)
        .expect("a horizontal line survives merging");
    assert!(
        (line.length() - 80.0).abs() <= 5.0,
        "expected length near 80, got {}",
        line.length()
    );
    assert!((line.start.y - 50.0).abs() < 3.0);

    let wall = line.to_polyline();
    assert_eq!(wall.points.len(), 2);
    let mesh = MeshExtruder::new(50.0).expect("valid depth").extrude(&[wall]);
    assert_eq!(mesh.vertices.len(), 4);
    assert!(mesh.faces.iter().any(|face| face.len() == 4));
    assert!(mesh.vertices[2..].iter().all(|v| v.z == 50.0));
}

#[test]
fn unchecked_hough_resolution_fails_the_trace() {
    // The builder does not validate, so the detector has to
    for rho_resolution in [0.0, 1e-7] {
        let mut config = TraceConfig::default();
        config.hough.rho_resolution = rho_resolution;
        let pipeline = PipelineBuilder::from_config(config.clone()).build();

        assert!(matches!(
            pipeline.trace(&horizontal_stroke()),
            Err(TraceError::InvalidConfig(_))
        ));
        assert!(matches!(Pipeline::from_config(config), Err(TraceError::InvalidConfig(_))));
    }
}

#[test]
fn pipeline_outputs_contours_then_lines() {
    let pipeline = Pipeline::from_config(TraceConfig::default()).expect("valid config");
    let outcome = pipeline.trace(&horizontal_stroke()).expect("trace succeeds");

    assert!(outcome.contour_count >= 1);
    assert!(outcome.line_count >= 1);
    assert_eq!(outcome.shape_count, 0);
    assert_eq!((outcome.image_width, outcome.image_height), (100, 100));

    let (contours, lines) = outcome.polylines.split_at(outcome.contour_count);
    assert!(contours.iter().all(|p| p.tool == DrawingTool::Pencil && p.line_width == 2.0));
    assert!(lines.iter().all(|p| p.tool == DrawingTool::Line && p.points.len() == 2));

    let long_horizontal = lines.iter().any(|p| {
        let (a, b): (Point2D, Point2D) = (p.points[0], p.points[1]);
        (a.y - b.y).abs() < 3.0 && (a.distance_to(b) - 80.0).abs() <= 5.0
    });
    assert!(long_horizontal, "no line matching the stroke in {lines:?}");
}

#[test]
fn tracing_is_deterministic() {
    let pipeline = Pipeline::from_config(TraceConfig::default()).expect("valid config");
    let image = rectangle_sketch();

    let first = pipeline.trace(&image).expect("trace succeeds");
    let second = pipeline.trace(&image).expect("trace succeeds");
    assert_eq!(first.polylines, second.polylines);
    assert!(!first.is_empty());
}

#[test]
fn progress_is_monotonic_and_ends_at_one() {
    let pipeline = Pipeline::builder().build();
    let mut reports = Vec::new();
    pipeline
        .trace_with_progress(&rectangle_sketch(), |fraction| reports.push(fraction))
        .expect("trace succeeds");

    assert_eq!(reports, vec![0.2, 0.4, 0.6, 0.8, 1.0]);
    assert!(reports.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn zero_area_image_reports_completion() {
    let pipeline = Pipeline::builder().build();
    let mut reports = Vec::new();
    let outcome = pipeline
        .trace_with_progress(&DynamicImage::new_rgb8(0, 0), |fraction| reports.push(fraction))
        .expect("zero-area input is not an error");

    assert!(outcome.is_empty());
    assert_eq!(reports.last(), Some(&1.0));
}

#[test]
fn undecodable_file_yields_empty_outcome() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"definitely not a png").expect("write fixture");

    let outcome = Pipeline::builder()
        .build()
        .trace_path(&path)
        .expect("undecodable input is not an error");
    assert!(outcome.is_empty());
}

#[tokio::test]
async fn worker_matches_synchronous_trace() {
    let image = rectangle_sketch();
    let expected = Pipeline::builder()
        .build()
        .trace(&image)
        .expect("trace succeeds");

    let worker = TraceWorker::new(Pipeline::builder().build());
    let handle = worker.spawn(image);
    let outcome = handle.join().await.expect("worker trace succeeds");

    assert_eq!(outcome.polylines, expected.polylines);
}
