use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// A concrete emotion label.
///
/// Declaration order is the canonical label order; `Ord` follows it and
/// breaks ties between equal per-face scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Sad,
    Surprise,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Angry => "angry",
            Emotion::Disgust => "disgust",
            Emotion::Fear => "fear",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Surprise => "surprise",
            Emotion::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown emotion label: {0}")]
pub struct UnknownEmotion(pub String);

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

/// The mood of a whole frame: the majority label, or `NoFaces` when no face
/// voted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrowdEmotion {
    Dominant(Emotion),
    NoFaces,
}

impl CrowdEmotion {
    pub const NO_FACES_LABEL: &'static str = "none";

    pub fn label(&self) -> &'static str {
        match self {
            CrowdEmotion::Dominant(emotion) => emotion.label(),
            CrowdEmotion::NoFaces => Self::NO_FACES_LABEL,
        }
    }

    pub fn emotion(&self) -> Option<Emotion> {
        match self {
            CrowdEmotion::Dominant(emotion) => Some(*emotion),
            CrowdEmotion::NoFaces => None,
        }
    }
}

impl fmt::Display for CrowdEmotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for CrowdEmotion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_canonical_order() {
        let mut shuffled = vec![
            Emotion::Neutral,
            Emotion::Happy,
            Emotion::Angry,
            Emotion::Surprise,
            Emotion::Fear,
            Emotion::Sad,
            Emotion::Disgust,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Emotion::ALL.to_vec());
    }

    #[rstest]
    #[case("happy", Emotion::Happy)]
    #[case("Surprise", Emotion::Surprise)]
    #[case(" neutral ", Emotion::Neutral)]
    #[case("DISGUST", Emotion::Disgust)]
    fn test_parse_label(#[case] input: &str, #[case] expected: Emotion) {
        assert_eq!(input.parse::<Emotion>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_label() {
        let err = "contempt".parse::<Emotion>().unwrap_err();
        assert_eq!(err, UnknownEmotion("contempt".into()));
    }

    #[test]
    fn test_labels_round_trip() {
        for emotion in Emotion::ALL {
            assert_eq!(emotion.to_string().parse::<Emotion>().unwrap(), emotion);
        }
    }

    #[test]
    fn test_crowd_emotion_labels() {
        assert_eq!(CrowdEmotion::NoFaces.label(), "none");
        assert_eq!(CrowdEmotion::Dominant(Emotion::Sad).to_string(), "sad");
        assert_eq!(CrowdEmotion::NoFaces.emotion(), None);
        assert_eq!(
            CrowdEmotion::Dominant(Emotion::Fear).emotion(),
            Some(Emotion::Fear)
        );
    }

    #[test]
    fn test_crowd_emotion_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&CrowdEmotion::Dominant(Emotion::Happy)).unwrap(),
            "\"happy\""
        );
        assert_eq!(
            serde_json::to_string(&CrowdEmotion::NoFaces).unwrap(),
            "\"none\""
        );
    }
}
