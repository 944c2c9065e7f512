use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::emotion::Emotion;

/// Axis-aligned face box in frame pixels, top-left corner plus size.
///
/// Serialized as `[x, y, width, height]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamps the box to a `frame_width` x `frame_height` frame. May return
    /// an empty box when the face lies entirely outside.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> BoundingBox {
        let fw = frame_width as i32;
        let fh = frame_height as i32;
        let x1 = self.x.clamp(0, fw);
        let y1 = self.y.clamp(0, fh);
        let x2 = self.x.saturating_add(self.width).clamp(0, fw);
        let y2 = self.y.saturating_add(self.height).clamp(0, fh);
        BoundingBox::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x, y, width, height]: [i32; 4]) -> Self {
        Self::new(x, y, width, height)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

/// Per-face probability for each emotion label.
///
/// Iteration follows the canonical label order. Labels the detector did
/// not report score 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionScores(BTreeMap<Emotion, f64>);

impl EmotionScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Emotion, f64)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    pub fn insert(&mut self, emotion: Emotion, score: f64) {
        self.0.insert(emotion, score);
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        self.0.get(&emotion).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        self.0.iter().map(|(&e, &s)| (e, s))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest-scoring label and its score.
    ///
    /// Equal scores go to the label earliest in canonical order. NaN never
    /// wins, and a face with no finite score has no top emotion.
    pub fn top(&self) -> Option<(Emotion, f64)> {
        if !self.0.values().any(|s| s.is_finite()) {
            return None;
        }
        let mut best: Option<(Emotion, f64)> = None;
        for emotion in Emotion::ALL {
            let score = self.get(emotion);
            if score.is_nan() {
                continue;
            }
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((emotion, score)),
            }
        }
        best
    }
}

/// One detected face: where it is and how it scores on each emotion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
    #[serde(rename = "emotions")]
    pub emotion_scores: EmotionScores,
}

impl FaceObservation {
    pub fn new(bounding_box: BoundingBox, emotion_scores: EmotionScores) -> Self {
        Self {
            bounding_box,
            emotion_scores,
        }
    }

    pub fn top_emotion(&self) -> Option<Emotion> {
        self.emotion_scores.top().map(|(emotion, _)| emotion)
    }
}
