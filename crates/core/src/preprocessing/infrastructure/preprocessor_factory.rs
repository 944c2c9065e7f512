use crate::config::PreprocessingConfig;
use crate::preprocessing::domain::adaptive_preprocessor::AdaptivePreprocessor;

use super::clahe_enhancer::ClaheEnhancer;
use super::gamma_corrector::GammaCorrector;
use super::nl_means_denoiser::NlMeansDenoiser;

/// Builds the preprocessor with the CPU enhancers configured by `config`.
pub fn create_preprocessor(config: &PreprocessingConfig) -> AdaptivePreprocessor {
    log::debug!(
        "Preprocessing gates: brightness < {}, contrast < {}, noise > {}",
        config.brightness_threshold,
        config.contrast_threshold,
        config.noise_threshold
    );
    AdaptivePreprocessor::new(
        config.policy(),
        Box::new(GammaCorrector::new(config.gamma)),
        Box::new(ClaheEnhancer::new(
            config.clahe_clip_limit,
            config.clahe_tile_grid,
        )),
        Box::new(NlMeansDenoiser::new(
            config.denoise_luma_strength,
            config.denoise_chroma_strength,
            config.denoise_template_size,
            config.denoise_search_size,
        )),
    )
}
