use crate::emotion::domain::emotion_detector::EmotionDetector;
use crate::emotion::domain::face_observation::FaceObservation;
use crate::shared::frame::Frame;

use super::onnx_emotion_classifier::OnnxEmotionClassifier;
use super::onnx_face_locator::OnnxFaceLocator;

/// Two-stage detector: locate faces, then classify each crop.
pub struct OnnxEmotionDetector {
    locator: OnnxFaceLocator,
    classifier: OnnxEmotionClassifier,
}

impl OnnxEmotionDetector {
    pub fn new(locator: OnnxFaceLocator, classifier: OnnxEmotionClassifier) -> Self {
        Self {
            locator,
            classifier,
        }
    }
}

impl EmotionDetector for OnnxEmotionDetector {
    fn detect(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<FaceObservation>, Box<dyn std::error::Error>> {
        let faces = self.locator.locate(frame)?;

        let mut observations = Vec::with_capacity(faces.len());
        for face in faces {
            let bounding_box = face.to_bounding_box(frame.width(), frame.height());
            if bounding_box.is_empty() {
                continue;
            }
            let scores = self.classifier.classify(frame, &bounding_box)?;
            observations.push(FaceObservation::new(bounding_box, scores));
        }
        Ok(observations)
    }
}
