//! Crop orchestration: decode → resolve → solve → render → encode, plus a
//! best-effort recompression pass.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::{Duration, Instant};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat, RgbImage};
use tracing::{debug, warn};

use crate::error::SmartcropError;
use crate::face_detector::BoostArea;
use crate::geometry::{resolve_target, RatioSpec, TargetGeometry};
use crate::solver::{CentroidSolver, CropSolver};

/// JPEG quality for the primary encode pass.
const JPEG_QUALITY: u8 = 80;

/// Per-file result of a crop-and-save operation. Timings are observational
/// only.
#[derive(Debug)]
pub struct CropOutcome {
    /// Time spent solving for the best crop window.
    pub crop_time: Duration,
    /// Time spent rendering and encoding the output.
    pub render_time: Duration,
    /// The solver's annotated debug image, when requested.
    pub debug: Option<RgbImage>,
}

/// Crops one image to the configured aspect ratio and writes the result.
pub struct CropPipeline {
    ratio: RatioSpec,
    max_width: u32,
    solver: Box<dyn CropSolver>,
}

impl CropPipeline {
    /// Create a pipeline with the built-in centroid solver. `max_width` of
    /// zero leaves the target width uncapped.
    pub fn new(ratio: RatioSpec, max_width: u32) -> Self {
        Self {
            ratio,
            max_width,
            solver: Box::new(CentroidSolver),
        }
    }

    /// Substitute a custom crop solver.
    pub fn with_solver(mut self, solver: Box<dyn CropSolver>) -> Self {
        self.solver = solver;
        self
    }

    /// Crop `source` and write the result to `dest`.
    ///
    /// The output format follows the destination file extension
    /// (unrecognized extensions encode as JPEG). After the primary encode a
    /// best-effort recompression pass re-encodes the file in place; its
    /// failures are logged and swallowed.
    pub fn crop_and_save(
        &self,
        source: &Path,
        dest: &Path,
        boost: &[BoostArea],
        debug: bool,
    ) -> Result<CropOutcome, SmartcropError> {
        let image = image::open(source).map_err(|e| SmartcropError::Decode(e.to_string()))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(SmartcropError::Decode("image dimensions are zero".into()));
        }

        let target = resolve_target(image.width(), image.height(), &self.ratio, self.max_width);

        let started = Instant::now();
        let result = self.solver.solve(&image, boost, target, debug)?;
        let crop_time = started.elapsed();

        let area = result.area;
        if area.width != target.width || area.height != target.height {
            return Err(SmartcropError::Solve(format!(
                "solver returned {}x{}, expected {}x{}",
                area.width, area.height, target.width, target.height
            )));
        }

        let started = Instant::now();
        // Direct sub-rectangle copy; the solver already targets the exact
        // destination dimensions, so no resampling happens here.
        let rendered = image.crop_imm(area.x, area.y, area.width, area.height);
        let format = output_format(dest);
        encode_to_file(&rendered, dest, format)?;
        let render_time = started.elapsed();

        debug!(
            crop_ms = crop_time.as_millis() as u64,
            render_ms = render_time.as_millis() as u64,
            "cropped {} -> {}",
            source.display(),
            dest.display()
        );

        if let Err(e) = self.recompress(dest, format, target) {
            warn!(error = %e, "recompression pass failed, keeping primary output for {}", dest.display());
        }

        Ok(CropOutcome {
            crop_time,
            render_time,
            debug: result.debug,
        })
    }

    /// Secondary compression pass: re-load the just-written file and
    /// re-encode it over the same path. When a max width is configured the
    /// reloaded image is uniformly rescaled so its pixel area matches the
    /// target's. Optimization only; the caller swallows any error.
    fn recompress(
        &self,
        dest: &Path,
        format: ImageFormat,
        target: TargetGeometry,
    ) -> Result<(), SmartcropError> {
        let reloaded = image::open(dest).map_err(|e| SmartcropError::Decode(e.to_string()))?;

        let output = if self.max_width > 0 {
            let current_area = reloaded.width() as f64 * reloaded.height() as f64;
            let scale = ((target.width as f64 * target.height as f64) / current_area).sqrt();
            let width = ((reloaded.width() as f64 * scale) as u32).max(1);
            let height = ((reloaded.height() as f64 * scale) as u32).max(1);
            reloaded.resize_exact(width, height, FilterType::Lanczos3)
        } else {
            reloaded
        };

        encode_to_file(&output, dest, format)
    }
}

/// Infer the output format from the destination file extension.
pub(crate) fn output_format(dest: &Path) -> ImageFormat {
    let ext = dest
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
        Some("png") => ImageFormat::Png,
        Some("gif") => ImageFormat::Gif,
        Some("bmp") => ImageFormat::Bmp,
        _ => ImageFormat::Jpeg,
    }
}

fn encode_to_file(
    image: &DynamicImage,
    dest: &Path,
    format: ImageFormat,
) -> Result<(), SmartcropError> {
    match format {
        ImageFormat::Jpeg => {
            let rgb = image.to_rgb8();
            let file = File::create(dest)?;
            let mut writer = BufWriter::new(file);
            JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY)
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .map_err(|e| SmartcropError::Encode(e.to_string()))?;
        }
        _ => {
            image
                .save_with_format(dest, format)
                .map_err(|e| SmartcropError::Encode(e.to_string()))?;
        }
    }
    Ok(())
}
