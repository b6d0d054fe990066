//! Batch execution over a file or directory, with per-file failure
//! isolation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::error::SmartcropError;
use crate::face_detector::{FaceDetector, FaceFinder};
use crate::geometry::RatioSpec;
use crate::pipeline::CropPipeline;

/// File extensions eligible for processing (matched case-insensitively).
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Batch run configuration.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Target aspect ratio for every file.
    pub ratio: RatioSpec,
    /// Output directory, created (with parents) before processing.
    pub out_dir: PathBuf,
    /// Cap on target crop width in pixels; zero leaves it uncapped.
    pub max_width: u32,
    /// Run face detection to produce boost areas.
    pub detect_faces: bool,
    /// On per-file failure, produce no output instead of copying the
    /// original.
    pub skip_failed: bool,
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    /// The cropped output was written.
    Cropped,
    /// The crop failed; the original was copied to the destination
    /// unmodified.
    CopiedOriginal(String),
    /// The crop failed and no output was produced.
    Skipped(String),
}

/// Per-file record of a batch run.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The input file.
    pub path: PathBuf,
    /// Number of faces detected (zero when detection is off or degraded).
    pub face_count: usize,
    /// Time spent in face detection.
    pub detect_time: Duration,
    /// Time spent solving for the crop window.
    pub crop_time: Duration,
    /// Time spent rendering and encoding.
    pub render_time: Duration,
    /// Final disposition of the file.
    pub status: FileStatus,
}

/// Processes a file or directory of images, isolating per-file failures so
/// one bad image does not abort the run.
pub struct BatchRunner<'a> {
    config: BatchConfig,
    pipeline: CropPipeline,
    detector: Option<&'a dyn FaceDetector>,
}

impl<'a> BatchRunner<'a> {
    /// Create a runner with the built-in crop solver and no face detector.
    pub fn new(config: BatchConfig) -> Self {
        let pipeline = CropPipeline::new(config.ratio, config.max_width);
        Self {
            config,
            pipeline,
            detector: None,
        }
    }

    /// Attach a face detection backend. The detector is constructed once
    /// per run by the caller and shared read-only across files.
    pub fn with_detector(mut self, detector: &'a dyn FaceDetector) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Process `source` (a single image or a directory of images).
    ///
    /// Directories are enumerated non-recursively and filtered to
    /// [`SUPPORTED_EXTENSIONS`]. Per-file failures never abort the run; an
    /// error is returned only when the source path or output directory is
    /// unusable.
    pub fn run(&self, source: &Path) -> Result<Vec<BatchOutcome>, SmartcropError> {
        fs::create_dir_all(&self.config.out_dir)?;

        let mut outcomes = Vec::new();
        if source.is_file() {
            if !is_supported(source) {
                warn!("{} is not an applicable image", source.display());
                return Ok(outcomes);
            }
            outcomes.push(self.process_file(source));
        } else if source.is_dir() {
            for entry in fs::read_dir(source)? {
                let path = entry?.path();
                if path.is_file() && is_supported(&path) {
                    outcomes.push(self.process_file(&path));
                }
            }
        } else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("source path {} does not exist", source.display()),
            )
            .into());
        }
        Ok(outcomes)
    }

    fn process_file(&self, path: &Path) -> BatchOutcome {
        info!("process image: {}", path.display());
        let dest = self
            .config
            .out_dir
            .join(path.file_name().unwrap_or_default());

        let mut face_count = 0;
        let mut boost = Vec::new();
        let mut detect_time = Duration::ZERO;
        if self.config.detect_faces {
            if let Some(detector) = self.detector {
                let started = Instant::now();
                match FaceFinder::new(detector).boost_areas_from_path(path) {
                    Ok(areas) => {
                        face_count = areas.len();
                        boost = areas;
                    }
                    // Detection is an enhancement, not a requirement:
                    // degrade to zero boost areas and keep going.
                    Err(e) => {
                        warn!(error = %e, "continuing without boost areas for {}", path.display());
                    }
                }
                detect_time = started.elapsed();
                info!(
                    "{} faces detected, takes: {} ms",
                    face_count,
                    detect_time.as_millis()
                );
            }
        }

        let status = match self.pipeline.crop_and_save(path, &dest, &boost, false) {
            Ok(outcome) => {
                return BatchOutcome {
                    path: path.to_path_buf(),
                    face_count,
                    detect_time,
                    crop_time: outcome.crop_time,
                    render_time: outcome.render_time,
                    status: FileStatus::Cropped,
                };
            }
            Err(e) => {
                error!(error = %e, "failed to crop {}", path.display());
                if self.config.skip_failed {
                    FileStatus::Skipped(e.to_string())
                } else {
                    match fs::copy(path, &dest) {
                        Ok(_) => FileStatus::CopiedOriginal(e.to_string()),
                        Err(copy_err) => {
                            error!(error = %copy_err, "failed to copy original {}", path.display());
                            FileStatus::Skipped(e.to_string())
                        }
                    }
                }
            }
        };

        BatchOutcome {
            path: path.to_path_buf(),
            face_count,
            detect_time,
            crop_time: Duration::ZERO,
            render_time: Duration::ZERO,
            status,
        }
    }
}

/// Whether a path carries one of the supported image extensions.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
