use std::fs;
use std::path::Path;

use image::RgbImage;
use smartcropper::{
    BatchConfig, BatchRunner, CropPipeline, FaceDetector, FaceRect, FileStatus, SmartcropError,
};

fn write_image(path: &Path, width: u32, height: u32) {
    let mut img = RgbImage::new(width, height);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = image::Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ]);
    }
    img.save(path).unwrap();
}

fn config(out_dir: &Path, skip_failed: bool) -> BatchConfig {
    BatchConfig {
        ratio: "1:1".parse().unwrap(),
        out_dir: out_dir.to_path_buf(),
        max_width: 0,
        detect_faces: false,
        skip_failed,
    }
}

#[test]
fn failed_file_is_copied_and_the_rest_are_cropped() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_image(&src.path().join("a.png"), 200, 300);
    fs::write(src.path().join("b.jpg"), b"definitely not a jpeg").unwrap();
    write_image(&src.path().join("c.png"), 300, 200);
    write_image(&src.path().join("d.bmp"), 64, 64);

    let outcomes = BatchRunner::new(config(out.path(), false))
        .run(src.path())
        .unwrap();
    assert_eq!(outcomes.len(), 4);
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 4);

    let failed = outcomes
        .iter()
        .find(|o| o.path.file_name().unwrap() == "b.jpg")
        .unwrap();
    assert!(matches!(failed.status, FileStatus::CopiedOriginal(_)));
    // Fallback copy is byte-identical to the source
    assert_eq!(
        fs::read(src.path().join("b.jpg")).unwrap(),
        fs::read(out.path().join("b.jpg")).unwrap()
    );

    for name in ["a.png", "c.png", "d.bmp"] {
        let outcome = outcomes
            .iter()
            .find(|o| o.path.file_name().unwrap() == name)
            .unwrap();
        assert_eq!(outcome.status, FileStatus::Cropped, "{name}");
    }
}

#[test]
fn skip_failed_produces_no_output_for_the_bad_file() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_image(&src.path().join("a.png"), 200, 300);
    fs::write(src.path().join("b.jpg"), b"definitely not a jpeg").unwrap();
    write_image(&src.path().join("c.png"), 300, 200);
    write_image(&src.path().join("d.bmp"), 64, 64);

    let outcomes = BatchRunner::new(config(out.path(), true))
        .run(src.path())
        .unwrap();
    assert_eq!(outcomes.len(), 4);
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 3);
    assert!(!out.path().join("b.jpg").exists());

    let failed = outcomes
        .iter()
        .find(|o| o.path.file_name().unwrap() == "b.jpg")
        .unwrap();
    assert!(matches!(failed.status, FileStatus::Skipped(_)));
}

#[test]
fn unsupported_extensions_are_filtered_out() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();

    write_image(&src.path().join("photo.jpg"), 120, 80);
    fs::write(src.path().join("notes.txt"), "hello").unwrap();

    let outcomes = BatchRunner::new(config(out.path(), false))
        .run(src.path())
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].path.file_name().unwrap(), "photo.jpg");
    assert!(!out.path().join("notes.txt").exists());
}

#[test]
fn single_unsupported_file_produces_nothing() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let path = src.path().join("notes.txt");
    fs::write(&path, "hello").unwrap();

    let outcomes = BatchRunner::new(config(out.path(), false))
        .run(&path)
        .unwrap();
    assert!(outcomes.is_empty());
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn single_file_is_cropped_to_the_requested_ratio() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let path = src.path().join("tall.png");
    write_image(&path, 200, 300);

    let outcomes = BatchRunner::new(config(out.path(), false))
        .run(&path)
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, FileStatus::Cropped);

    // 1:1 on a 200x300 source keeps the width
    let output = image::open(out.path().join("tall.png")).unwrap();
    assert_eq!((output.width(), output.height()), (200, 200));
}

#[test]
fn out_dir_is_created_with_parents() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let nested = out.path().join("deep").join("er");
    let path = src.path().join("a.png");
    write_image(&path, 50, 50);

    let outcomes = BatchRunner::new(config(&nested, false)).run(&path).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert!(nested.join("a.png").exists());
}

#[test]
fn missing_source_path_is_an_error() {
    let out = tempfile::tempdir().unwrap();
    let result = BatchRunner::new(config(out.path(), false)).run(Path::new("/no/such/place"));
    assert!(result.is_err());
}

struct BrokenDetector;

impl FaceDetector for BrokenDetector {
    fn detect(
        &self,
        _gray: &[u8],
        _width: u32,
        _height: u32,
    ) -> Result<Vec<FaceRect>, SmartcropError> {
        Err(SmartcropError::Detection("no model available".into()))
    }
}

#[test]
fn detection_failure_degrades_to_zero_boost_areas() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let path = src.path().join("a.png");
    write_image(&path, 160, 90);

    let mut config = config(out.path(), false);
    config.detect_faces = true;
    let outcomes = BatchRunner::new(config)
        .with_detector(&BrokenDetector)
        .run(&path)
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].status, FileStatus::Cropped);
    assert_eq!(outcomes[0].face_count, 0);
    assert!(out.path().join("a.png").exists());
}

struct OneFaceDetector;

impl FaceDetector for OneFaceDetector {
    fn detect(
        &self,
        _gray: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<FaceRect>, SmartcropError> {
        // One face in the middle of the (enlarged) frame
        Ok(vec![FaceRect {
            x: width as f64 / 2.0,
            y: height as f64 / 2.0,
            width: 40.0,
            height: 40.0,
        }])
    }
}

#[test]
fn detected_faces_are_counted_in_the_outcome() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let path = src.path().join("a.png");
    write_image(&path, 200, 300);

    let mut config = config(out.path(), false);
    config.detect_faces = true;
    let outcomes = BatchRunner::new(config)
        .with_detector(&OneFaceDetector)
        .run(&path)
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].face_count, 1);
    assert_eq!(outcomes[0].status, FileStatus::Cropped);
}

#[test]
fn max_width_caps_the_output_dimensions() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let path = src.path().join("wide.png");
    write_image(&path, 800, 600);

    let config = BatchConfig {
        ratio: "16:9".parse().unwrap(),
        out_dir: out.path().to_path_buf(),
        max_width: 400,
        detect_faces: false,
        skip_failed: false,
    };
    let outcomes = BatchRunner::new(config).run(&path).unwrap();
    assert_eq!(outcomes[0].status, FileStatus::Cropped);

    let output = image::open(out.path().join("wide.png")).unwrap();
    assert_eq!((output.width(), output.height()), (400, 225));
}

#[test]
fn unknown_destination_extension_encodes_jpeg() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let source = src.path().join("a.png");
    let dest = out.path().join("a.weird");
    write_image(&source, 100, 100);

    let pipeline = CropPipeline::new("1:1".parse().unwrap(), 0);
    pipeline.crop_and_save(&source, &dest, &[], false).unwrap();

    let bytes = fs::read(&dest).unwrap();
    assert_eq!(bytes[0], 0xFF);
    assert_eq!(bytes[1], 0xD8);
}

#[test]
fn debug_flag_surfaces_the_solver_image() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let source = src.path().join("a.png");
    let dest = out.path().join("a.png");
    write_image(&source, 120, 90);

    let pipeline = CropPipeline::new("1:1".parse().unwrap(), 0);
    let outcome = pipeline.crop_and_save(&source, &dest, &[], true).unwrap();
    let debug = outcome.debug.expect("debug image requested");
    assert_eq!((debug.width(), debug.height()), (120, 90));
}
