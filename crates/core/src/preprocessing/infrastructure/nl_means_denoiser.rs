use crate::preprocessing::domain::frame_enhancer::FrameEnhancer;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

use super::lab::{lab_to_rgb, rgb_to_lab};

/// Non-local means denoiser for color frames.
///
/// Works in L*a*b*: luminance and chrominance are filtered separately with
/// their own strengths. Each pixel becomes a weighted average of pixels in
/// its search window, weighted by how similar their surrounding template
/// patches are, so edges that repeat along their length survive.
pub struct NlMeansDenoiser {
    luma_strength: f32,
    chroma_strength: f32,
    template_size: usize,
    search_size: usize,
}

impl NlMeansDenoiser {
    pub fn new(
        luma_strength: f32,
        chroma_strength: f32,
        template_size: usize,
        search_size: usize,
    ) -> Self {
        Self {
            luma_strength,
            chroma_strength,
            template_size: template_size.max(1),
            search_size: search_size.max(1),
        }
    }
}

impl FrameEnhancer for NlMeansDenoiser {
    fn enhance(&self, frame: &mut Frame) -> Result<(), PipelineError> {
        frame.validate()?;
        let width = frame.width() as usize;
        let height = frame.height() as usize;

        let mut lab = rgb_to_lab(frame.data());
        let window = Window {
            width,
            height,
            template_radius: self.template_size / 2,
            search_radius: self.search_size / 2,
        };

        lab.l = denoise(&lab.l, 1, self.luma_strength, &window);

        let chroma: Vec<u8> = lab.a.iter().zip(&lab.b).flat_map(|(&a, &b)| [a, b]).collect();
        let chroma = denoise(&chroma, 2, self.chroma_strength, &window);
        for (i, ab) in chroma.chunks_exact(2).enumerate() {
            lab.a[i] = ab[0];
            lab.b[i] = ab[1];
        }

        lab_to_rgb(&lab, frame.data_mut());
        Ok(())
    }
}

/// Plane geometry and filter footprint.
pub struct Window {
    pub width: usize,
    pub height: usize,
    pub template_radius: usize,
    pub search_radius: usize,
}

/// Denoises interleaved `channels`-wide samples with filter strength `h`.
///
/// For every search offset the squared difference image is summed over the
/// template with an integral image, so the cost is independent of the
/// template size. Borders replicate edge pixels.
pub fn denoise(data: &[u8], channels: usize, h: f32, window: &Window) -> Vec<u8> {
    let Window {
        width,
        height,
        template_radius: tr,
        search_radius: sr,
    } = *window;
    let n = width * height;
    if n == 0 || h <= 0.0 {
        return data.to_vec();
    }

    let inv_h2 = 1.0 / (h as f64 * h as f64);
    let mut acc = vec![0.0f64; n * channels];
    let mut weights = vec![0.0f64; n];
    let mut diff = vec![0.0f64; n];
    let mut integral = vec![0.0f64; (width + 1) * (height + 1)];
    let stride = width + 1;

    let sr = sr as isize;
    for dy in -sr..=sr {
        for dx in -sr..=sr {
            for y in 0..height {
                let sy = shift(y, dy, height);
                for x in 0..width {
                    let sx = shift(x, dx, width);
                    let p = (y * width + x) * channels;
                    let q = (sy * width + sx) * channels;
                    diff[y * width + x] = (0..channels)
                        .map(|c| {
                            let d = data[p + c] as f64 - data[q + c] as f64;
                            d * d
                        })
                        .sum();
                }
            }

            for y in 0..height {
                let mut row = 0.0;
                for x in 0..width {
                    row += diff[y * width + x];
                    integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row;
                }
            }

            for y in 0..height {
                let y0 = y.saturating_sub(tr);
                let y1 = (y + tr).min(height - 1);
                let sy = shift(y, dy, height);
                for x in 0..width {
                    let x0 = x.saturating_sub(tr);
                    let x1 = (x + tr).min(width - 1);
                    let total = integral[(y1 + 1) * stride + x1 + 1]
                        - integral[y0 * stride + x1 + 1]
                        - integral[(y1 + 1) * stride + x0]
                        + integral[y0 * stride + x0];
                    let count = ((y1 - y0 + 1) * (x1 - x0 + 1) * channels) as f64;
                    let w = (-(total / count) * inv_h2).exp();

                    let sx = shift(x, dx, width);
                    let p = y * width + x;
                    let q = (sy * width + sx) * channels;
                    weights[p] += w;
                    for c in 0..channels {
                        acc[p * channels + c] += w * data[q + c] as f64;
                    }
                }
            }
        }
    }

    acc.iter()
        .enumerate()
        .map(|(i, &sum)| (sum / weights[i / channels]).round().clamp(0.0, 255.0) as u8)
        .collect()
}

fn shift(pos: usize, delta: isize, len: usize) -> usize {
    (pos as isize + delta).clamp(0, len as isize - 1) as usize
}
