use std::path::Path;

use crate::shared::constants::{
    EMOTION_MODEL_NAME, EMOTION_MODEL_URL, FACE_MODEL_NAME, FACE_MODEL_URL,
};
use crate::shared::model_resolver::{self, ProgressFn};

use super::onnx_emotion_classifier::OnnxEmotionClassifier;
use super::onnx_emotion_detector::OnnxEmotionDetector;
use super::onnx_face_locator::OnnxFaceLocator;

/// Resolves both models (cache, bundled dir, then download) and builds the
/// ONNX detector.
pub fn create_onnx_detector(
    confidence: f64,
    bundled_dir: Option<&Path>,
    mut progress: impl FnMut(&str) -> Option<ProgressFn>,
) -> Result<OnnxEmotionDetector, Box<dyn std::error::Error>> {
    let face_model = model_resolver::resolve(
        FACE_MODEL_NAME,
        FACE_MODEL_URL,
        bundled_dir,
        progress(FACE_MODEL_NAME),
    )?;
    let emotion_model = model_resolver::resolve(
        EMOTION_MODEL_NAME,
        EMOTION_MODEL_URL,
        bundled_dir,
        progress(EMOTION_MODEL_NAME),
    )?;
    log::info!(
        "Using face model {} and emotion model {}",
        face_model.display(),
        emotion_model.display()
    );

    Ok(OnnxEmotionDetector::new(
        OnnxFaceLocator::new(&face_model, confidence)?,
        OnnxEmotionClassifier::new(&emotion_model)?,
    ))
}
