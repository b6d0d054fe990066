//! Built-in SeetaFace-based face detector backend.

use std::path::Path;

use crate::error::SmartcropError;
use crate::face_detector::{FaceDetector, FaceRect};

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The frontal-face model is loaded from disk once at construction; each
/// `detect` call builds a fresh detector from the shared model, so the
/// backend is reentrant.
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Load a SeetaFace frontal-face model from `path`.
    pub fn from_file(path: &Path) -> Result<Self, SmartcropError> {
        let data = std::fs::read(path).map_err(|e| {
            SmartcropError::Detection(format!("cannot read model {}: {e}", path.display()))
        })?;
        let model = rustface::read_model(std::io::Cursor::new(data)).map_err(|e| {
            SmartcropError::Detection(format!("cannot load model {}: {e}", path.display()))
        })?;
        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(
        &self,
        gray: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<FaceRect>, SmartcropError> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceRect {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                }
            })
            .collect())
    }
}
