use std::path::Path;

use crate::emotion::domain::emotion::Emotion;
use crate::emotion::domain::face_observation::{BoundingBox, EmotionScores};
use crate::quality::domain::quality_metrics::luma;
use crate::shared::frame::Frame;

use super::execution_provider::open_session;
use super::math::softmax;

/// Side of the square grayscale crop the FER+ model expects.
pub const INPUT_SIZE: usize = 64;

/// FER+ output classes in model order. `None` marks contempt, which has no
/// counterpart in the seven-label vocabulary.
const FERPLUS_CLASSES: [Option<Emotion>; 8] = [
    Some(Emotion::Neutral),
    Some(Emotion::Happy),
    Some(Emotion::Surprise),
    Some(Emotion::Sad),
    Some(Emotion::Angry),
    Some(Emotion::Disgust),
    Some(Emotion::Fear),
    None,
];

/// FER+ facial expression classifier running on one face crop at a time.
pub struct OnnxEmotionClassifier {
    session: ort::session::Session,
}

impl OnnxEmotionClassifier {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            session: open_session(model_path)?,
        })
    }

    pub fn classify(
        &mut self,
        frame: &Frame,
        face: &BoundingBox,
    ) -> Result<EmotionScores, Box<dyn std::error::Error>> {
        let input = face_tensor(frame, face)?;
        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("emotion model produced no outputs".into());
        }
        let logits = outputs[0].try_extract_array::<f32>()?;
        let logits = logits.as_slice().ok_or("cannot read emotion model output")?;
        scores_from_logits(logits)
    }
}

/// Crops `face` out of the frame as a `[1, 1, 64, 64]` grayscale tensor,
/// raw 0-255 intensities, nearest-neighbor resized.
fn face_tensor(
    frame: &Frame,
    face: &BoundingBox,
) -> Result<ndarray::Array4<f32>, Box<dyn std::error::Error>> {
    let crop = face.clamp_to(frame.width(), frame.height());
    if crop.is_empty() {
        return Err(format!("face box {face:?} lies outside the frame").into());
    }

    let src = frame.as_ndarray();
    let sx = crop.width as f64 / INPUT_SIZE as f64;
    let sy = crop.height as f64 / INPUT_SIZE as f64;
    let max_x = (crop.x + crop.width - 1) as usize;
    let max_y = (crop.y + crop.height - 1) as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 1, INPUT_SIZE, INPUT_SIZE));
    for y in 0..INPUT_SIZE {
        let src_y = (crop.y as usize + (y as f64 * sy) as usize).min(max_y);
        for x in 0..INPUT_SIZE {
            let src_x = (crop.x as usize + (x as f64 * sx) as usize).min(max_x);
            let px = src.slice(ndarray::s![src_y, src_x, ..]);
            tensor[[0, 0, y, x]] = luma(px[0], px[1], px[2]) as f32;
        }
    }
    Ok(tensor)
}

/// Softmaxes the eight FER+ logits, drops contempt and renormalizes the
/// rest so the seven labels sum to 1.
fn scores_from_logits(logits: &[f32]) -> Result<EmotionScores, Box<dyn std::error::Error>> {
    if logits.len() != FERPLUS_CLASSES.len() {
        return Err(format!(
            "expected {} emotion logits, got {}",
            FERPLUS_CLASSES.len(),
            logits.len()
        )
        .into());
    }

    let probs = softmax(logits);
    let kept: Vec<(Emotion, f64)> = FERPLUS_CLASSES
        .iter()
        .zip(probs)
        .filter_map(|(class, p)| class.map(|emotion| (emotion, p)))
        .collect();
    let total: f64 = kept.iter().map(|(_, p)| p).sum();
    if !(total > 0.0) {
        return Err("emotion model gave no probability to any known label".into());
    }

    Ok(EmotionScores::from_pairs(
        kept.into_iter().map(|(emotion, p)| (emotion, p / total)),
    ))
}
