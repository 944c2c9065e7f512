use thiserror::Error;

/// Failures surfaced by a pipeline cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The frame is empty, has the wrong channel layout, or its buffer
    /// disagrees with its dimensions.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    /// The emotion detector failed and the caller asked for strict handling.
    #[error("emotion detector unavailable: {0}")]
    DetectorUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_frame_message() {
        let err = PipelineError::InvalidFrame("zero width".into());
        assert_eq!(err.to_string(), "invalid frame: zero width");
    }

    #[test]
    fn test_detector_unavailable_message() {
        let err = PipelineError::DetectorUnavailable("model missing".into());
        assert_eq!(
            err.to_string(),
            "emotion detector unavailable: model missing"
        );
    }
}
