use crate::shared::frame::Frame;

use super::face_observation::FaceObservation;

/// Domain interface for face and emotion detection.
///
/// Implementations may be stateful (e.g. replaying a recording), hence
/// `&mut self`. An empty result means no faces were found; an error means
/// the detector itself failed.
pub trait EmotionDetector: Send {
    fn detect(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<FaceObservation>, Box<dyn std::error::Error>>;
}
