//! Crop solving: pick the best crop window of a fixed size.
//!
//! The solver is a pluggable capability. The built-in [`CentroidSolver`]
//! places the crop window over the weighted centroid of the boost areas
//! (image center when there are none); a saliency- or entropy-scoring
//! solver can be substituted through the [`CropSolver`] trait.

use image::{DynamicImage, Rgb, RgbImage};

use crate::error::SmartcropError;
use crate::face_detector::BoostArea;
use crate::geometry::TargetGeometry;

/// Crop window within the source image, in source coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge (pixels).
    pub x: u32,
    /// Top edge (pixels).
    pub y: u32,
    /// Width (pixels).
    pub width: u32,
    /// Height (pixels).
    pub height: u32,
}

/// Result of a crop-solving pass.
#[derive(Debug, Clone)]
pub struct CropResult {
    /// The chosen crop window. Sized exactly to the requested target and
    /// fully within source bounds.
    pub area: CropRect,
    /// Annotated copy of the source for interactive inspection, when
    /// requested.
    pub debug: Option<RgbImage>,
}

/// Pluggable crop-scoring backend.
pub trait CropSolver: Send + Sync {
    /// Find the best `target`-sized crop of `image`, preferring to keep
    /// `boost` areas inside the window. Must return an area with exactly
    /// the target dimensions, fully within image bounds.
    fn solve(
        &self,
        image: &DynamicImage,
        boost: &[BoostArea],
        target: TargetGeometry,
        debug: bool,
    ) -> Result<CropResult, SmartcropError>;
}

/// Built-in solver: center the crop window on the weighted centroid of the
/// boost areas, clamped into image bounds.
#[derive(Debug, Default)]
pub struct CentroidSolver;

impl CropSolver for CentroidSolver {
    fn solve(
        &self,
        image: &DynamicImage,
        boost: &[BoostArea],
        target: TargetGeometry,
        debug: bool,
    ) -> Result<CropResult, SmartcropError> {
        let (src_width, src_height) = (image.width(), image.height());
        if target.width > src_width || target.height > src_height {
            return Err(SmartcropError::Solve(format!(
                "target {}x{} exceeds source {}x{}",
                target.width, target.height, src_width, src_height
            )));
        }

        let (cx, cy) = focus_point(boost, src_width, src_height);
        let max_x = (src_width - target.width) as f64;
        let max_y = (src_height - target.height) as f64;
        let area = CropRect {
            x: (cx - target.width as f64 / 2.0).round().clamp(0.0, max_x) as u32,
            y: (cy - target.height as f64 / 2.0).round().clamp(0.0, max_y) as u32,
            width: target.width,
            height: target.height,
        };

        let debug = debug.then(|| render_debug(image, boost, &area));
        Ok(CropResult { area, debug })
    }
}

/// Weighted centroid of the boost areas; image center when there are none.
/// Each area contributes proportionally to its confidence times its size.
fn focus_point(boost: &[BoostArea], src_width: u32, src_height: u32) -> (f64, f64) {
    let mut total = 0.0;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for area in boost {
        let weight = area.weight as f64 * (area.width as f64 * area.height as f64);
        sum_x += weight * (area.left as f64 + area.width as f64 / 2.0);
        sum_y += weight * (area.top as f64 + area.height as f64 / 2.0);
        total += weight;
    }
    if total > 0.0 {
        (sum_x / total, sum_y / total)
    } else {
        (src_width as f64 / 2.0, src_height as f64 / 2.0)
    }
}

/// Draw boost areas (red) and the chosen crop window (green) on a copy of
/// the source.
fn render_debug(image: &DynamicImage, boost: &[BoostArea], area: &CropRect) -> RgbImage {
    let mut canvas = image.to_rgb8();
    for b in boost {
        draw_outline(&mut canvas, b.left, b.top, b.width, b.height, Rgb([255, 0, 0]));
    }
    draw_outline(&mut canvas, area.x, area.y, area.width, area.height, Rgb([0, 255, 0]));
    canvas
}

fn draw_outline(img: &mut RgbImage, left: u32, top: u32, width: u32, height: u32, color: Rgb<u8>) {
    let right = (left + width).min(img.width()).saturating_sub(1);
    let bottom = (top + height).min(img.height()).saturating_sub(1);
    if left > right || top > bottom {
        return;
    }
    for x in left..=right {
        img.put_pixel(x, top, color);
        img.put_pixel(x, bottom, color);
    }
    for y in top..=bottom {
        img.put_pixel(left, y, color);
        img.put_pixel(right, y, color);
    }
}
