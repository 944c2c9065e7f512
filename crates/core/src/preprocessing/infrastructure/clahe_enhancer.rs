use crate::preprocessing::domain::frame_enhancer::FrameEnhancer;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

use super::lab::{lab_to_rgb, rgb_to_lab};

const BINS: usize = 256;

/// Contrast-limited adaptive histogram equalization on the L* channel.
///
/// The frame is converted to L*a*b*, only L* is equalized tile by tile,
/// and the result is converted back to RGB. Chrominance is left alone so
/// hues do not shift.
pub struct ClaheEnhancer {
    clip_limit: f64,
    tile_grid: usize,
}

impl ClaheEnhancer {
    pub fn new(clip_limit: f64, tile_grid: usize) -> Self {
        Self {
            clip_limit,
            tile_grid: tile_grid.max(1),
        }
    }
}

impl FrameEnhancer for ClaheEnhancer {
    fn enhance(&self, frame: &mut Frame) -> Result<(), PipelineError> {
        frame.validate()?;
        let width = frame.width() as usize;
        let height = frame.height() as usize;

        let mut lab = rgb_to_lab(frame.data());
        equalize_plane(&mut lab.l, width, height, self.clip_limit, self.tile_grid);
        lab_to_rgb(&lab, frame.data_mut());
        Ok(())
    }
}

/// Equalizes a single-channel plane in place.
///
/// Each of the `grid x grid` tiles gets its own clipped-histogram lookup
/// table; pixels blend the four nearest tables bilinearly so tile seams
/// do not show.
pub fn equalize_plane(plane: &mut [u8], width: usize, height: usize, clip_limit: f64, grid: usize) {
    if width == 0 || height == 0 {
        return;
    }
    let gx = grid.clamp(1, width);
    let gy = grid.clamp(1, height);

    let mut luts = Vec::with_capacity(gx * gy);
    for ty in 0..gy {
        let (y0, y1) = (ty * height / gy, (ty + 1) * height / gy);
        for tx in 0..gx {
            let (x0, x1) = (tx * width / gx, (tx + 1) * width / gx);
            luts.push(tile_lut(plane, width, (x0, x1), (y0, y1), clip_limit));
        }
    }

    let tile_w = width as f64 / gx as f64;
    let tile_h = height as f64 / gy as f64;

    for y in 0..height {
        let (ty1, ty2, ya) = neighbours(y, tile_h, gy);
        for x in 0..width {
            let (tx1, tx2, xa) = neighbours(x, tile_w, gx);
            let idx = y * width + x;
            let v = plane[idx] as usize;

            let top = luts[ty1 * gx + tx1][v] as f64 * (1.0 - xa)
                + luts[ty1 * gx + tx2][v] as f64 * xa;
            let bottom = luts[ty2 * gx + tx1][v] as f64 * (1.0 - xa)
                + luts[ty2 * gx + tx2][v] as f64 * xa;
            plane[idx] = (top * (1.0 - ya) + bottom * ya).round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// The two tile indices whose centers bracket `pos`, and the blend weight
/// of the second one.
fn neighbours(pos: usize, tile_size: f64, tiles: usize) -> (usize, usize, f64) {
    let f = pos as f64 / tile_size - 0.5;
    let first = f.floor();
    let weight = f - first;
    let lo = first.max(0.0) as usize;
    let hi = ((first + 1.0).max(0.0) as usize).min(tiles - 1);
    (lo.min(tiles - 1), hi, weight)
}

fn tile_lut(
    plane: &[u8],
    width: usize,
    (x0, x1): (usize, usize),
    (y0, y1): (usize, usize),
    clip_limit: f64,
) -> [u8; BINS] {
    let mut hist = [0u32; BINS];
    for y in y0..y1 {
        for &v in &plane[y * width + x0..y * width + x1] {
            hist[v as usize] += 1;
        }
    }
    let area = ((x1 - x0) * (y1 - y0)).max(1) as u32;

    if clip_limit > 0.0 {
        clip_histogram(&mut hist, area, clip_limit);
    }

    let scale = 255.0 / area as f64;
    let mut lut = [0u8; BINS];
    let mut cumulative = 0u32;
    for (bin, entry) in hist.iter().zip(lut.iter_mut()) {
        cumulative += bin;
        *entry = (cumulative as f64 * scale).round().min(255.0) as u8;
    }
    lut
}

/// Caps every bin at the clip limit and spreads the excess evenly, with
/// the remainder sprinkled at a regular stride.
fn clip_histogram(hist: &mut [u32; BINS], area: u32, clip_limit: f64) {
    let limit = ((clip_limit * area as f64 / BINS as f64) as u32).max(1);

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    let batch = excess / BINS as u32;
    let mut residual = excess - batch * BINS as u32;
    for bin in hist.iter_mut() {
        *bin += batch;
    }
    if residual > 0 {
        let step = (BINS / residual as usize).max(1);
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::domain::quality_metrics::analyze_quality;

    fn gray_frame(width: u32, height: u32, value: impl Fn(usize, usize) -> u8) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height as usize {
            for x in 0..width as usize {
                let v = value(x, y);
                data.extend_from_slice(&[v, v, v]);
            }
        }
        Frame::new(data, width, height, 3, 0)
    }

    #[test]
    fn test_clip_histogram_preserves_mass() {
        let mut hist = [0u32; BINS];
        hist[100] = 1024;
        clip_histogram(&mut hist, 1024, 2.0);
        assert_eq!(hist.iter().sum::<u32>(), 1024);
        assert!(hist[100] < 1024);
    }

    #[test]
    fn test_constant_plane_stays_constant() {
        let mut plane = vec![100u8; 32 * 32];
        equalize_plane(&mut plane, 32, 32, 2.0, 8);
        let first = plane[0];
        assert!(plane.iter().all(|&v| v == first));
    }

    #[test]
    fn test_low_contrast_plane_is_stretched() {
        let mut plane: Vec<u8> = (0..32 * 32)
            .map(|i| 100 + ((i % 32 + i / 32) % 20) as u8)
            .collect();
        let spread_before = plane.iter().max().unwrap() - plane.iter().min().unwrap();
        equalize_plane(&mut plane, 32, 32, 2.0, 8);
        let spread_after = plane.iter().max().unwrap() - plane.iter().min().unwrap();
        assert!(spread_after > spread_before * 3);
    }

    #[test]
    fn test_plane_smaller_than_grid() {
        let mut plane = vec![10u8, 20, 30];
        equalize_plane(&mut plane, 3, 1, 2.0, 8);
        assert_eq!(plane.len(), 3);
    }

    #[test]
    fn test_enhance_raises_contrast_of_flat_frame() {
        let mut frame = gray_frame(32, 32, |x, y| 100 + ((x + y) % 20) as u8);
        let before = analyze_quality(&frame).unwrap().contrast;
        ClaheEnhancer::new(2.0, 8).enhance(&mut frame).unwrap();
        let after = analyze_quality(&frame).unwrap().contrast;
        assert!(after > before * 2.0, "contrast {before} -> {after}");
    }

    #[test]
    fn test_enhance_leaves_gray_frames_gray() {
        let mut frame = gray_frame(16, 16, |x, y| (x * 8 + y) as u8);
        ClaheEnhancer::new(2.0, 8).enhance(&mut frame).unwrap();
        for px in frame.data().chunks_exact(3) {
            assert!(px[0] == px[1] && px[1] == px[2], "pixel {px:?} picked up a tint");
        }
    }
}
