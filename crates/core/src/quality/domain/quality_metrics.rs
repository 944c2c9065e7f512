use serde::Serialize;

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

/// Fixed-point luma weights (BT.601, scaled by 2^14) as used by 8-bit
/// RGB to grayscale conversion.
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Luminance statistics of one frame, on a 0-255 scale.
///
/// `noise_estimate` is the plain luminance variance. It is a coarse proxy
/// that also grows with scene contrast, not a true noise measurement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub brightness: f64,
    pub contrast: f64,
    pub noise_estimate: f64,
}

/// Computes brightness (mean), contrast (standard deviation), and the noise
/// estimate (variance) of the frame's luminance.
pub fn analyze_quality(frame: &Frame) -> Result<QualityMetrics, PipelineError> {
    frame.validate()?;

    let mut histogram = [0u64; 256];
    for px in frame.data().chunks_exact(3) {
        histogram[luma(px[0], px[1], px[2]) as usize] += 1;
    }

    let n = frame.pixel_count() as f64;
    let mean = histogram
        .iter()
        .enumerate()
        .map(|(v, &count)| v as f64 * count as f64)
        .sum::<f64>()
        / n;
    let variance = histogram
        .iter()
        .enumerate()
        .map(|(v, &count)| {
            let d = v as f64 - mean;
            d * d * count as f64
        })
        .sum::<f64>()
        / n;

    Ok(QualityMetrics {
        brightness: mean,
        contrast: variance.sqrt(),
        noise_estimate: variance,
    })
}

/// 8-bit luminance of one RGB pixel, rounded to nearest.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B;
    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// Single-channel luminance plane of an RGB frame.
pub fn luma_plane(frame: &Frame) -> Vec<u8> {
    frame
        .data()
        .chunks_exact(3)
        .map(|px| luma(px[0], px[1], px[2]))
        .collect()
}
