pub mod clahe_enhancer;
pub mod gamma_corrector;
mod lab;
pub mod nl_means_denoiser;
pub mod preprocessor_factory;
