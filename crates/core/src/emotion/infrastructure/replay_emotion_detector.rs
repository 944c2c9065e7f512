use std::fs;
use std::path::Path;

use crate::emotion::domain::emotion_detector::EmotionDetector;
use crate::emotion::domain::face_observation::FaceObservation;
use crate::shared::frame::Frame;

/// How recorded frames are matched to incoming frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayMode {
    /// Entry `i` answers the frame whose index is `i`; later frames see no
    /// faces.
    ByFrameIndex,
    /// Entries answer successive calls in order, wrapping around.
    Cycle,
}

/// Plays back recorded face observations instead of running a model.
///
/// Recordings are JSON arrays with one entry per frame, each entry an array
/// of `{"box": [x, y, w, h], "emotions": {"happy": 0.9, ...}}` objects.
pub struct ReplayEmotionDetector {
    frames: Vec<Vec<FaceObservation>>,
    mode: ReplayMode,
    calls: usize,
}

impl ReplayEmotionDetector {
    pub fn new(frames: Vec<Vec<FaceObservation>>, mode: ReplayMode) -> Self {
        Self {
            frames,
            mode,
            calls: 0,
        }
    }

    pub fn from_json(json: &str, mode: ReplayMode) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?, mode))
    }

    pub fn from_file(path: &Path, mode: ReplayMode) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("failed to read observations {}: {e}", path.display()))?;
        let detector = Self::from_json(&json, mode)
            .map_err(|e| format!("failed to parse observations {}: {e}", path.display()))?;
        log::info!(
            "Replaying {} recorded frame(s) from {}",
            detector.frames.len(),
            path.display()
        );
        Ok(detector)
    }
}

impl EmotionDetector for ReplayEmotionDetector {
    fn detect(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<FaceObservation>, Box<dyn std::error::Error>> {
        let entry = match self.mode {
            ReplayMode::ByFrameIndex => self.frames.get(frame.index()),
            ReplayMode::Cycle if self.frames.is_empty() => None,
            ReplayMode::Cycle => self.frames.get(self.calls % self.frames.len()),
        };
        self.calls += 1;
        Ok(entry.cloned().unwrap_or_default())
    }
}
