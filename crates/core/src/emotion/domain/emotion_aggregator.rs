use serde::Serialize;

use super::emotion::{CrowdEmotion, Emotion};
use super::face_observation::{BoundingBox, FaceObservation};

/// Top emotion of a single face, for display next to its box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FaceVerdict {
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
    pub emotion: Emotion,
    pub score: f64,
}

impl FaceVerdict {
    /// Overlay text, e.g. `happy: 0.93`.
    pub fn caption(&self) -> String {
        format!("{}: {:.2}", self.emotion, self.score)
    }
}

/// Reduces the faces of one frame to a single crowd emotion by majority
/// vote over each face's top emotion.
///
/// A tie in the vote goes to whichever tied label the earliest face voted
/// for. Faces without a finite score do not vote; with no voters the crowd
/// emotion is `NoFaces`.
pub fn aggregate(observations: &[FaceObservation]) -> CrowdEmotion {
    let mut winner: Option<(Emotion, usize)> = None;
    for (emotion, count) in tally(observations) {
        match winner {
            Some((_, best)) if count <= best => {}
            _ => winner = Some((emotion, count)),
        }
    }
    winner.map_or(CrowdEmotion::NoFaces, |(emotion, _)| {
        CrowdEmotion::Dominant(emotion)
    })
}

/// Vote counts per top emotion, in the order each label first appeared.
pub fn tally(observations: &[FaceObservation]) -> Vec<(Emotion, usize)> {
    let mut counts: Vec<(Emotion, usize)> = Vec::new();
    for emotion in observations.iter().filter_map(FaceObservation::top_emotion) {
        match counts.iter_mut().find(|(e, _)| *e == emotion) {
            Some((_, count)) => *count += 1,
            None => counts.push((emotion, 1)),
        }
    }
    counts
}

/// Top emotion and score per voting face, in input order.
pub fn face_verdicts(observations: &[FaceObservation]) -> Vec<FaceVerdict> {
    observations
        .iter()
        .filter_map(|obs| {
            obs.emotion_scores.top().map(|(emotion, score)| FaceVerdict {
                bounding_box: obs.bounding_box,
                emotion,
                score,
            })
        })
        .collect()
}
