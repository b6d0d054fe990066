//! Target crop geometry: aspect ratio parsing and dimension resolution.

use std::fmt;
use std::str::FromStr;

use crate::error::SmartcropError;

/// A "W:H" aspect ratio with positive integer terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioSpec {
    width: u32,
    height: u32,
}

impl RatioSpec {
    /// Create a ratio from its integer terms. Either term being zero is
    /// a configuration error.
    pub fn new(width: u32, height: u32) -> Result<Self, SmartcropError> {
        if width == 0 || height == 0 {
            return Err(SmartcropError::InvalidRatio(format!("{width}:{height}")));
        }
        Ok(Self { width, height })
    }

    /// The ratio as width / height.
    pub fn value(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl FromStr for RatioSpec {
    type Err = SmartcropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SmartcropError::InvalidRatio(s.to_string());
        let (w, h) = s.split_once(':').ok_or_else(invalid)?;
        let width: u32 = w.trim().parse().map_err(|_| invalid())?;
        let height: u32 = h.trim().parse().map_err(|_| invalid())?;
        Self::new(width, height).map_err(|_| invalid())
    }
}

impl fmt::Display for RatioSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Resolved crop dimensions for one source image.
///
/// Recomputed per image; source dimensions vary across a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetGeometry {
    /// Crop width in pixels.
    pub width: u32,
    /// Crop height in pixels.
    pub height: u32,
}

/// Resolve the target crop dimensions for a source image.
///
/// The result always fits within the source along both axes (never an
/// upscale). When `max_width` is non-zero and the resolved width exceeds
/// it, the width is clamped and the height recomputed from the ratio;
/// height is never clamped independently.
pub fn resolve_target(
    source_width: u32,
    source_height: u32,
    ratio: &RatioSpec,
    max_width: u32,
) -> TargetGeometry {
    let target_ratio = ratio.value();
    let source_ratio = source_width as f64 / source_height as f64;

    let (mut width, mut height) = if source_ratio <= target_ratio {
        (source_width, (source_width as f64 / target_ratio) as u32)
    } else {
        ((source_height as f64 * target_ratio) as u32, source_height)
    };

    if max_width > 0 && width > max_width {
        width = max_width;
        height = (max_width as f64 / target_ratio) as u32;
    }

    TargetGeometry {
        width: width.max(1),
        height: height.max(1),
    }
}
