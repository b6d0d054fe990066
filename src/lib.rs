//! Face-aware batch image cropping: crop images to a target aspect ratio
//! while preferentially keeping detected faces inside the crop.
//!
//! The pipeline decodes an image, resolves the target crop dimensions from
//! a "W:H" ratio spec, asks a pluggable [`CropSolver`] for the best crop
//! window (weighted by face boost areas), renders the crop with a direct
//! block copy, and encodes it to the destination format. A batch runner
//! applies the pipeline across a directory with per-file failure isolation.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use smartcropper::{BatchConfig, BatchRunner};
//!
//! let config = BatchConfig {
//!     ratio: "16:9".parse().unwrap(),
//!     out_dir: "out".into(),
//!     max_width: 0,
//!     detect_faces: false,
//!     skip_failed: false,
//! };
//! let outcomes = BatchRunner::new(config).run(Path::new("photos")).unwrap();
//! println!("processed {} file(s)", outcomes.len());
//! ```
#![warn(missing_docs)]

/// Batch execution and per-file failure isolation.
pub mod batch;
mod error;
/// Face detection traits and boost-area production.
pub mod face_detector;
/// Aspect ratio parsing and target geometry resolution.
pub mod geometry;
/// Crop orchestration: decode, solve, render, encode, recompress.
pub mod pipeline;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;
/// Crop solving capability and the built-in centroid solver.
pub mod solver;

pub use batch::{BatchConfig, BatchOutcome, BatchRunner, FileStatus};
pub use error::SmartcropError;
pub use face_detector::{BoostArea, FaceDetector, FaceFinder, FaceRect};
pub use geometry::{resolve_target, RatioSpec, TargetGeometry};
pub use pipeline::{CropOutcome, CropPipeline};
#[cfg(feature = "rustface")]
pub use rustface_backend::RustfaceDetector;
pub use solver::{CentroidSolver, CropRect, CropResult, CropSolver};
