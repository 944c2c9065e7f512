use serde::Serialize;

use crate::emotion::domain::emotion::CrowdEmotion;
use crate::emotion::domain::emotion_aggregator::FaceVerdict;
use crate::feedback::domain::feedback_classifier::FeedbackMessage;
use crate::preprocessing::domain::preprocess_policy::PreprocessStep;
use crate::quality::domain::quality_metrics::QualityMetrics;

/// Everything one analysis cycle produced.
///
/// Serializes with `emotion` and `feedback` as plain strings, so the JSON
/// doubles as an HTTP response body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CycleReport {
    pub frame_index: usize,
    pub quality: QualityMetrics,
    pub preprocessing: Vec<PreprocessStep>,
    pub faces: Vec<FaceVerdict>,
    pub emotion: CrowdEmotion,
    pub feedback: FeedbackMessage,
    pub notified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::domain::emotion::Emotion;
    use crate::emotion::domain::face_observation::BoundingBox;

    #[test]
    fn test_json_shape() {
        let report = CycleReport {
            frame_index: 3,
            quality: QualityMetrics {
                brightness: 42.0,
                contrast: 12.5,
                noise_estimate: 156.25,
            },
            preprocessing: vec![PreprocessStep::Gamma, PreprocessStep::LocalContrast],
            faces: vec![FaceVerdict {
                bounding_box: BoundingBox::new(1, 2, 3, 4),
                emotion: Emotion::Happy,
                score: 0.9,
            }],
            emotion: CrowdEmotion::Dominant(Emotion::Happy),
            feedback: FeedbackMessage::Positive,
            notified: true,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["emotion"], "happy");
        assert_eq!(json["feedback"], "The crowd is loving it your music - keep it up!");
        assert_eq!(json["preprocessing"], serde_json::json!(["gamma", "local_contrast"]));
        assert_eq!(json["faces"][0]["box"], serde_json::json!([1, 2, 3, 4]));
        assert_eq!(json["faces"][0]["emotion"], "happy");
        assert_eq!(json["quality"]["noise_estimate"], 156.25);
        assert_eq!(json["notified"], true);
    }

    #[test]
    fn test_no_faces_json() {
        let report = CycleReport {
            frame_index: 0,
            quality: QualityMetrics {
                brightness: 100.0,
                contrast: 50.0,
                noise_estimate: 2500.0,
            },
            preprocessing: Vec::new(),
            faces: Vec::new(),
            emotion: CrowdEmotion::NoFaces,
            feedback: FeedbackMessage::NoFaces,
            notified: false,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["emotion"], "none");
        assert_eq!(json["feedback"], "No faces detected.");
    }
}
