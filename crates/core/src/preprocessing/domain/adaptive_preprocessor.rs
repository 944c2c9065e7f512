use crate::preprocessing::domain::frame_enhancer::FrameEnhancer;
use crate::preprocessing::domain::preprocess_policy::{PreprocessPlan, PreprocessPolicy};
use crate::quality::domain::quality_metrics::QualityMetrics;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

/// Applies the enhancements a frame's quality metrics call for.
///
/// Order is fixed: gamma, then local contrast, then denoise. A frame that
/// triggers no gate comes back untouched.
pub struct AdaptivePreprocessor {
    policy: PreprocessPolicy,
    gamma: Box<dyn FrameEnhancer>,
    local_contrast: Box<dyn FrameEnhancer>,
    denoise: Box<dyn FrameEnhancer>,
}

impl AdaptivePreprocessor {
    pub fn new(
        policy: PreprocessPolicy,
        gamma: Box<dyn FrameEnhancer>,
        local_contrast: Box<dyn FrameEnhancer>,
        denoise: Box<dyn FrameEnhancer>,
    ) -> Self {
        Self {
            policy,
            gamma,
            local_contrast,
            denoise,
        }
    }

    pub fn policy(&self) -> &PreprocessPolicy {
        &self.policy
    }

    pub fn preprocess(&self, frame: Frame, metrics: &QualityMetrics) -> Result<Frame, PipelineError> {
        self.preprocess_with_plan(frame, metrics)
            .map(|(frame, _)| frame)
    }

    /// Like [`preprocess`](Self::preprocess), also returning which steps ran.
    pub fn preprocess_with_plan(
        &self,
        mut frame: Frame,
        metrics: &QualityMetrics,
    ) -> Result<(Frame, PreprocessPlan), PipelineError> {
        frame.validate()?;
        let plan = self.policy.plan(metrics);

        if plan.gamma {
            self.gamma.enhance(&mut frame)?;
        }
        if plan.local_contrast {
            self.local_contrast.enhance(&mut frame)?;
        }
        if plan.denoise {
            self.denoise.enhance(&mut frame)?;
        }

        if !plan.is_identity() {
            log::debug!(
                "Preprocessed frame {} with {:?} (brightness={:.1}, contrast={:.1}, noise={:.1})",
                frame.index(),
                plan.steps(),
                metrics.brightness,
                metrics.contrast,
                metrics.noise_estimate
            );
        }

        Ok((frame, plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records its name on every call and writes a marker into the first byte.
    struct RecordingEnhancer {
        name: &'static str,
        marker: u8,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl FrameEnhancer for RecordingEnhancer {
        fn enhance(&self, frame: &mut Frame) -> Result<(), PipelineError> {
            self.calls.lock().unwrap().push(self.name);
            frame.data_mut()[0] = self.marker;
            Ok(())
        }
    }

    fn preprocessor(calls: &Arc<Mutex<Vec<&'static str>>>) -> AdaptivePreprocessor {
        let enhancer = |name, marker| -> Box<dyn FrameEnhancer> {
            Box::new(RecordingEnhancer {
                name,
                marker,
                calls: calls.clone(),
            })
        };
        AdaptivePreprocessor::new(
            PreprocessPolicy::default(),
            enhancer("gamma", 1),
            enhancer("local_contrast", 2),
            enhancer("denoise", 3),
        )
    }

    fn frame() -> Frame {
        Frame::new(vec![200u8; 4 * 4 * 3], 4, 4, 3, 0)
    }

    fn metrics(brightness: f64, contrast: f64, noise_estimate: f64) -> QualityMetrics {
        QualityMetrics {
            brightness,
            contrast,
            noise_estimate,
        }
    }

    #[test]
    fn test_non_triggering_metrics_return_frame_unchanged() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let input = frame();
        let output = preprocessor(&calls)
            .preprocess(input.clone(), &metrics(150.0, 60.0, 500.0))
            .unwrap();
        assert_eq!(output, input);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_all_gates_run_in_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (output, plan) = preprocessor(&calls)
            .preprocess_with_plan(frame(), &metrics(10.0, 5.0, 2000.0))
            .unwrap();
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["gamma", "local_contrast", "denoise"]
        );
        assert!(plan.gamma && plan.local_contrast && plan.denoise);
        // Denoise ran last, so its marker wins.
        assert_eq!(output.data()[0], 3);
    }

    #[test]
    fn test_only_triggered_gate_runs() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        preprocessor(&calls)
            .preprocess(frame(), &metrics(150.0, 10.0, 500.0))
            .unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["local_contrast"]);
    }

    #[test]
    fn test_output_keeps_dimensions() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let output = preprocessor(&calls)
            .preprocess(frame(), &metrics(10.0, 5.0, 2000.0))
            .unwrap();
        assert_eq!((output.width(), output.height(), output.channels()), (4, 4, 3));
    }

    #[test]
    fn test_invalid_frame_is_rejected_before_enhancing() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let empty = Frame::new(Vec::new(), 0, 0, 3, 0);
        let result = preprocessor(&calls).preprocess(empty, &metrics(10.0, 5.0, 2000.0));
        assert!(matches!(result, Err(PipelineError::InvalidFrame(_))));
        assert!(calls.lock().unwrap().is_empty());
    }
}
