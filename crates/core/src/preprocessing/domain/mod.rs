pub mod adaptive_preprocessor;
pub mod frame_enhancer;
pub mod preprocess_policy;
