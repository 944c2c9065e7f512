use std::time::Instant;

use crate::emotion::domain::emotion_aggregator::{aggregate, face_verdicts};
use crate::emotion::domain::emotion_detector::EmotionDetector;
use crate::feedback::domain::feedback_classifier::classify;
use crate::notification::domain::notifier::Notifier;
use crate::pipeline::cycle_report::CycleReport;
use crate::pipeline::detector_failure_policy::DetectorFailurePolicy;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::preprocessing::domain::adaptive_preprocessor::AdaptivePreprocessor;
use crate::quality::domain::quality_metrics::analyze_quality;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

/// One crowd mood cycle: analyze → preprocess → detect → aggregate →
/// classify → notify.
///
/// Each cycle depends only on its own frame; the notifier's cooldown is the
/// only state carried between cycles.
pub struct CrowdMoodUseCase {
    preprocessor: Option<AdaptivePreprocessor>,
    detector: Box<dyn EmotionDetector>,
    notifier: Option<Notifier>,
    failure_policy: DetectorFailurePolicy,
    logger: Box<dyn PipelineLogger>,
}

impl CrowdMoodUseCase {
    /// `preprocessor` of `None` feeds frames to the detector as captured;
    /// `notifier` of `None` never sends alerts.
    pub fn new(
        preprocessor: Option<AdaptivePreprocessor>,
        detector: Box<dyn EmotionDetector>,
        notifier: Option<Notifier>,
        failure_policy: DetectorFailurePolicy,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            preprocessor,
            detector,
            notifier,
            failure_policy,
            logger,
        }
    }

    pub fn logger_mut(&mut self) -> &mut dyn PipelineLogger {
        self.logger.as_mut()
    }

    pub fn finish(&self) {
        self.logger.summary();
    }

    pub fn run_cycle(&mut self, frame: Frame) -> Result<CycleReport, PipelineError> {
        let frame_index = frame.index();

        let t0 = Instant::now();
        let quality = analyze_quality(&frame)?;
        self.logger.timing("analyze", elapsed_ms(t0));
        self.logger.metric("brightness", quality.brightness);
        self.logger.metric("contrast", quality.contrast);

        let (frame, preprocessing) = match &self.preprocessor {
            Some(preprocessor) => {
                let t0 = Instant::now();
                let (frame, plan) = preprocessor.preprocess_with_plan(frame, &quality)?;
                self.logger.timing("preprocess", elapsed_ms(t0));
                (frame, plan.steps())
            }
            None => (frame, Vec::new()),
        };

        let t0 = Instant::now();
        let observations = self.failure_policy.resolve(self.detector.detect(&frame))?;
        self.logger.timing("detect", elapsed_ms(t0));
        self.logger.metric("faces", observations.len() as f64);

        let t0 = Instant::now();
        let emotion = aggregate(&observations);
        let faces = face_verdicts(&observations);
        self.logger.timing("aggregate", elapsed_ms(t0));
        self.logger.emotion(emotion.label());

        let feedback = classify(emotion);
        let notified = self
            .notifier
            .as_ref()
            .is_some_and(|notifier| notifier.notify(feedback.text()));

        log::debug!(
            "Frame {frame_index}: {} face(s), crowd emotion {emotion}, notified={notified}",
            faces.len()
        );

        Ok(CycleReport {
            frame_index,
            quality,
            preprocessing,
            faces,
            emotion,
            feedback,
            notified,
        })
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
