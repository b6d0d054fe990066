use thiserror::Error;

/// Error type returned by smartcropper operations.
///
/// Recompression failures are deliberately absent: the secondary
/// re-encode pass is best-effort and never surfaces as an error.
#[derive(Debug, Error)]
pub enum SmartcropError {
    /// The ratio spec could not be parsed as "W:H" with positive integers.
    #[error("invalid aspect ratio {0:?}: expected \"W:H\" with positive integers")]
    InvalidRatio(String),

    /// The source image could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// The face detection backend could not process the image.
    #[error("face detection failed: {0}")]
    Detection(String),

    /// The crop solver could not produce a valid crop rectangle.
    #[error("crop solver failed: {0}")]
    Solve(String),

    /// The cropped image could not be encoded to the destination format.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// Filesystem error while reading sources or writing outputs.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
