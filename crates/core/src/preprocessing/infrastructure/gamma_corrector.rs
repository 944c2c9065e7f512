use crate::preprocessing::domain::frame_enhancer::FrameEnhancer;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

/// Power-law brightness remap through a 256-entry lookup table.
///
/// Each channel value `v` becomes `255 * (v / 255)^(1 / gamma)`, truncated.
/// With `gamma < 1` the curve bows below the diagonal; `gamma > 1` lifts
/// shadows.
pub struct GammaCorrector {
    table: [u8; 256],
}

impl GammaCorrector {
    pub fn new(gamma: f64) -> Self {
        let inv_gamma = 1.0 / gamma;
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            let v = (i as f64 / 255.0).powf(inv_gamma) * 255.0;
            *entry = v.clamp(0.0, 255.0) as u8;
        }
        Self { table }
    }

    pub fn table(&self) -> &[u8; 256] {
        &self.table
    }
}

impl FrameEnhancer for GammaCorrector {
    fn enhance(&self, frame: &mut Frame) -> Result<(), PipelineError> {
        frame.validate()?;
        for v in frame.data_mut() {
            *v = self.table[*v as usize];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(128, 64)]
    #[case(255, 255)]
    fn test_table_for_gamma_half(#[case] input: usize, #[case] expected: u8) {
        let corrector = GammaCorrector::new(0.5);
        assert_eq!(corrector.table()[input], expected);
    }

    #[test]
    fn test_table_is_monotonic() {
        let corrector = GammaCorrector::new(0.5);
        assert!(corrector.table().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_enhance_maps_every_channel() {
        let mut frame = Frame::new(vec![128, 255, 0, 128, 128, 128], 2, 1, 3, 0);
        GammaCorrector::new(0.5).enhance(&mut frame).unwrap();
        assert_eq!(frame.data(), &[64, 255, 0, 64, 64, 64]);
    }
}
