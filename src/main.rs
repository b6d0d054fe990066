//! smartcropper CLI — face-aware batch image cropping.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use smartcropper::{BatchConfig, BatchRunner, FaceDetector, FileStatus, RatioSpec};

#[derive(Parser)]
#[command(name = "smartcropper", version)]
#[command(about = "Crop images to a target aspect ratio while keeping detected faces in frame")]
struct Cli {
    /// The image or folder to be cropped.
    source: PathBuf,

    /// Destination aspect ratio, "W:H".
    #[arg(long, default_value = "16:9")]
    ratio: String,

    /// Output directory, created if missing.
    #[arg(long, default_value = "./")]
    out_dir: PathBuf,

    /// Do not detect faces; crop without boost areas.
    #[arg(long)]
    no_detect_face: bool,

    /// Skip crop-failing images instead of copying them to the output dir.
    #[arg(long)]
    skip_failed: bool,

    /// Cap the target crop width in pixels (0 = uncapped).
    #[arg(long, default_value_t = 0)]
    max_width: u32,

    /// Path to a SeetaFace frontal-face detection model.
    #[arg(long, default_value = "seeta_fd_frontal_v1.0.bin")]
    face_model: PathBuf,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let ratio: RatioSpec = match cli.ratio.parse() {
        Ok(ratio) => ratio,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };

    let detector = if cli.no_detect_face {
        None
    } else {
        build_detector(&cli.face_model)
    };

    info!(
        "ratio: {ratio}, outdir: {}, detect faces: {}, source path: {}",
        cli.out_dir.display(),
        detector.is_some(),
        cli.source.display()
    );

    let config = BatchConfig {
        ratio,
        out_dir: cli.out_dir,
        max_width: cli.max_width,
        detect_faces: detector.is_some(),
        skip_failed: cli.skip_failed,
    };

    let mut runner = BatchRunner::new(config);
    if let Some(detector) = detector.as_deref() {
        runner = runner.with_detector(detector);
    }

    match runner.run(&cli.source) {
        Ok(outcomes) => {
            let cropped = outcomes
                .iter()
                .filter(|o| o.status == FileStatus::Cropped)
                .count();
            let copied = outcomes
                .iter()
                .filter(|o| matches!(o.status, FileStatus::CopiedOriginal(_)))
                .count();
            let skipped = outcomes.len() - cropped - copied;
            info!(
                "processed {} file(s): {cropped} cropped, {copied} copied, {skipped} skipped",
                outcomes.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(feature = "rustface")]
fn build_detector(model: &Path) -> Option<Box<dyn FaceDetector>> {
    match smartcropper::RustfaceDetector::from_file(model) {
        Ok(detector) => Some(Box::new(detector)),
        Err(e) => {
            warn!("{e}; continuing without face detection");
            None
        }
    }
}

#[cfg(not(feature = "rustface"))]
fn build_detector(_model: &Path) -> Option<Box<dyn FaceDetector>> {
    warn!("built without a face detection backend; continuing without face detection");
    None
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
