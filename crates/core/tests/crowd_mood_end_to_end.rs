use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine};

use crowdmood_core::emotion::domain::emotion::{CrowdEmotion, Emotion};
use crowdmood_core::emotion::infrastructure::replay_emotion_detector::{
    ReplayEmotionDetector, ReplayMode,
};
use crowdmood_core::feedback::domain::feedback_classifier::FeedbackMessage;
use crowdmood_core::notification::domain::alert_sink::{Alert, AlertSink};
use crowdmood_core::notification::domain::clock::ManualClock;
use crowdmood_core::notification::domain::notification_throttler::{
    NotificationThrottler, SharedThrottler,
};
use crowdmood_core::notification::domain::notifier::Notifier;
use crowdmood_core::pipeline::analyze_stream_use_case::{AnalyzeStreamUseCase, StreamOptions};
use crowdmood_core::pipeline::crowd_mood_use_case::CrowdMoodUseCase;
use crowdmood_core::pipeline::detector_failure_policy::DetectorFailurePolicy;
use crowdmood_core::pipeline::pipeline_logger::NullPipelineLogger;
use crowdmood_core::video::infrastructure::image_decoder::decode_base64_image;
use crowdmood_core::video::infrastructure::image_file_reader::ImageFileReader;

const HAPPY_SAD_HAPPY: &str = r#"[[
    {"box": [0, 0, 8, 8], "emotions": {"happy": 0.9, "sad": 0.05, "neutral": 0.05}},
    {"box": [10, 0, 8, 8], "emotions": {"sad": 0.7, "happy": 0.2, "neutral": 0.1}},
    {"box": [20, 0, 8, 8], "emotions": {"happy": 0.6, "surprise": 0.3, "neutral": 0.1}}
]]"#;

#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<Alert>>,
}

impl AlertSink for RecordingSink {
    fn send(&self, alert: &Alert) -> Result<(), Box<dyn std::error::Error>> {
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

fn crowd_mood(sink: Arc<RecordingSink>, clock: Arc<ManualClock>) -> CrowdMoodUseCase {
    let notifier = Notifier::new(
        SharedThrottler::new(NotificationThrottler::new(Duration::from_secs(10))),
        sink,
        clock,
        "Alert",
        Duration::from_secs(5),
    );
    CrowdMoodUseCase::new(
        None,
        Box::new(ReplayEmotionDetector::from_json(HAPPY_SAD_HAPPY, ReplayMode::Cycle).unwrap()),
        Some(notifier),
        DetectorFailurePolicy::Degrade,
        Box::new(NullPipelineLogger),
    )
}

fn crowd_png() -> Vec<u8> {
    let img = image::RgbImage::from_fn(32, 32, |x, y| {
        let v = if (x + y) % 2 == 0 { 90 } else { 200 };
        image::Rgb([v, v, v])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn happy_crowd_alerts_once_then_cools_down() {
    let sink = Arc::new(RecordingSink::default());
    let clock = Arc::new(ManualClock::default());
    let mut cycle = crowd_mood(sink.clone(), clock.clone());
    let frame = decode_base64_image(&STANDARD.encode(crowd_png())).unwrap();

    let first = cycle.run_cycle(frame.clone()).unwrap();
    assert_eq!(first.emotion, CrowdEmotion::Dominant(Emotion::Happy));
    assert_eq!(first.feedback, FeedbackMessage::Positive);
    assert!(first.notified);

    clock.advance(Duration::from_secs(1));
    assert!(!cycle.run_cycle(frame.clone()).unwrap().notified);

    clock.advance(Duration::from_millis(9_500));
    assert!(cycle.run_cycle(frame).unwrap().notified);

    let sent = sink.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0].message,
        "The crowd is loving it your music - keep it up!"
    );
    assert_eq!(sent[0].timeout, Duration::from_secs(5));
}

#[test]
fn image_file_report_serializes_label_and_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crowd.png");
    std::fs::write(&path, crowd_png()).unwrap();

    let sink = Arc::new(RecordingSink::default());
    let cycle = crowd_mood(sink, Arc::new(ManualClock::default()));
    let mut use_case = AnalyzeStreamUseCase::new(
        Box::new(ImageFileReader::new()),
        cycle,
        StreamOptions::default(),
    );

    let mut reports = Vec::new();
    let summary = use_case
        .execute(&path, |report| reports.push(serde_json::to_value(report).unwrap()))
        .unwrap();

    assert_eq!(summary.cycles, 1);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["emotion"], "happy");
    assert_eq!(
        reports[0]["feedback"],
        "The crowd is loving it your music - keep it up!"
    );
    assert_eq!(reports[0]["faces"].as_array().unwrap().len(), 3);
}
