use serde::{Deserialize, Serialize};

use crate::emotion::domain::face_observation::FaceObservation;
use crate::shared::error::PipelineError;

/// What a cycle does when the emotion detector fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorFailurePolicy {
    /// Log the failure and treat the frame as having no faces.
    #[default]
    Degrade,
    /// Fail the cycle with `DetectorUnavailable`.
    Strict,
}

impl DetectorFailurePolicy {
    pub fn resolve(
        &self,
        detected: Result<Vec<FaceObservation>, Box<dyn std::error::Error>>,
    ) -> Result<Vec<FaceObservation>, PipelineError> {
        match (detected, self) {
            (Ok(observations), _) => Ok(observations),
            (Err(e), DetectorFailurePolicy::Degrade) => {
                log::warn!("Emotion detector failed, treating frame as empty: {e}");
                Ok(Vec::new())
            }
            (Err(e), DetectorFailurePolicy::Strict) => {
                Err(PipelineError::DetectorUnavailable(e.to_string()))
            }
        }
    }
}
