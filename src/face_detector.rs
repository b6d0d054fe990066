//! Face detection seam and boost-area production.
//!
//! The detector runs on a pyramid-upsampled copy of the image to improve
//! recall on small faces, so its output is in enlarged-image coordinates.
//! [`FaceFinder`] maps the detections back to the original resolution and
//! emits weighted boost areas for the crop solver.

use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use crate::error::SmartcropError;

/// Fixed confidence assigned to face boost areas.
///
/// The detector integration does not expose per-face scores, so detected
/// faces are treated uniformly as strong signals rather than probabilistic
/// ones.
pub const FACE_BOOST_WEIGHT: f32 = 0.99;

/// Linear upsampling factor applied before detection.
const PYRAMID_FACTOR: u32 = 2;

/// Face bounding box in detector coordinate space (the enlarged image).
#[derive(Debug, Clone, PartialEq)]
pub struct FaceRect {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
}

/// A rectangle the crop solver should prefer to keep inside the final crop.
///
/// Coordinates are in original-image space, fully within image bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoostArea {
    /// Left edge (pixels).
    pub left: u32,
    /// Top edge (pixels).
    pub top: u32,
    /// Width (pixels, > 0).
    pub width: u32,
    /// Height (pixels, > 0).
    pub height: u32,
    /// Confidence weight in [0, 1].
    pub weight: f32,
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom face detector (ONNX, dlib,
/// etc.) and pass it to [`crate::batch::BatchRunner::with_detector`].
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height`
    /// bytes. Fails if the backend cannot process the image.
    fn detect(&self, gray: &[u8], width: u32, height: u32)
        -> Result<Vec<FaceRect>, SmartcropError>;
}

/// Runs a [`FaceDetector`] over a pyramid-upsampled copy of an image and
/// projects the detections back to original coordinates.
pub struct FaceFinder<'a> {
    detector: &'a dyn FaceDetector,
}

impl<'a> FaceFinder<'a> {
    /// Wrap a detector backend. The backend is expensive to construct and
    /// should be built once per run and reused across calls.
    pub fn new(detector: &'a dyn FaceDetector) -> Self {
        Self { detector }
    }

    /// Detect faces and return boost areas in original-image coordinates.
    pub fn boost_areas(&self, image: &DynamicImage) -> Result<Vec<BoostArea>, SmartcropError> {
        let (width, height) = (image.width(), image.height());
        let size0 = width as f64 * height as f64;

        let enlarged = image.resize_exact(
            width * PYRAMID_FACTOR,
            height * PYRAMID_FACTOR,
            FilterType::CatmullRom,
        );
        let gray = image::imageops::grayscale(&enlarged);

        let faces = self.detector.detect(gray.as_raw(), gray.width(), gray.height())?;

        let size1 = gray.width() as f64 * gray.height() as f64;
        let scale = (size0 / size1).sqrt();
        debug!(faces = faces.len(), scale, "face detection complete");

        Ok(faces
            .iter()
            .filter_map(|face| project_rect(face, scale, width, height))
            .collect())
    }

    /// Decode `path` and detect faces in it. A decode failure is a
    /// detection error; callers decide whether to degrade to zero boost
    /// areas.
    pub fn boost_areas_from_path(&self, path: &Path) -> Result<Vec<BoostArea>, SmartcropError> {
        let image = image::open(path).map_err(|e| SmartcropError::Detection(e.to_string()))?;
        self.boost_areas(&image)
    }
}

/// Map a detector rectangle from enlarged-image space back to original
/// coordinates.
///
/// Each of left/top/width/height is scaled and truncated, then the final
/// rectangle is rebuilt from the corrected corners so rounding does not
/// compound. Rectangles pushed outside the image by rounding are clamped;
/// empty-after-clamp rectangles are dropped.
fn project_rect(rect: &FaceRect, scale: f64, img_width: u32, img_height: u32) -> Option<BoostArea> {
    let left = (rect.x * scale) as i64;
    let top = (rect.y * scale) as i64;
    let width = (rect.width * scale) as i64;
    let height = (rect.height * scale) as i64;

    let right = (left + width).clamp(0, img_width as i64);
    let bottom = (top + height).clamp(0, img_height as i64);
    let left = left.clamp(0, img_width as i64);
    let top = top.clamp(0, img_height as i64);

    if right <= left || bottom <= top {
        return None;
    }

    Some(BoostArea {
        left: left as u32,
        top: top as u32,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
        weight: FACE_BOOST_WEIGHT,
    })
}
