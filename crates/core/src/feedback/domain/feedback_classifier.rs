use std::fmt;

use serde::{Serialize, Serializer};

use crate::emotion::domain::emotion::{CrowdEmotion, Emotion};

/// Recommendation shown to the performer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedbackMessage {
    Positive,
    Negative,
    NoFaces,
}

impl FeedbackMessage {
    pub fn text(&self) -> &'static str {
        match self {
            FeedbackMessage::Positive => "The crowd is loving it your music - keep it up!",
            FeedbackMessage::Negative => {
                "The crowd is not very engaged. Consider playing a more upbeat song."
            }
            FeedbackMessage::NoFaces => "No faces detected.",
        }
    }
}

impl fmt::Display for FeedbackMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

impl Serialize for FeedbackMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.text())
    }
}

/// Happy or surprised crowds are engaged; every other label is not.
pub fn classify(emotion: CrowdEmotion) -> FeedbackMessage {
    match emotion {
        CrowdEmotion::NoFaces => FeedbackMessage::NoFaces,
        CrowdEmotion::Dominant(Emotion::Happy | Emotion::Surprise) => FeedbackMessage::Positive,
        CrowdEmotion::Dominant(
            Emotion::Angry | Emotion::Disgust | Emotion::Fear | Emotion::Sad | Emotion::Neutral,
        ) => FeedbackMessage::Negative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CrowdEmotion::Dominant(Emotion::Happy), FeedbackMessage::Positive)]
    #[case(CrowdEmotion::Dominant(Emotion::Surprise), FeedbackMessage::Positive)]
    #[case(CrowdEmotion::Dominant(Emotion::Angry), FeedbackMessage::Negative)]
    #[case(CrowdEmotion::Dominant(Emotion::Disgust), FeedbackMessage::Negative)]
    #[case(CrowdEmotion::Dominant(Emotion::Fear), FeedbackMessage::Negative)]
    #[case(CrowdEmotion::Dominant(Emotion::Sad), FeedbackMessage::Negative)]
    #[case(CrowdEmotion::Dominant(Emotion::Neutral), FeedbackMessage::Negative)]
    #[case(CrowdEmotion::NoFaces, FeedbackMessage::NoFaces)]
    fn test_classify(#[case] emotion: CrowdEmotion, #[case] expected: FeedbackMessage) {
        assert_eq!(classify(emotion), expected);
    }

    #[test]
    fn test_every_label_is_classified() {
        let positive = Emotion::ALL
            .into_iter()
            .filter(|&e| classify(CrowdEmotion::Dominant(e)) == FeedbackMessage::Positive)
            .count();
        assert_eq!(positive, 2);
        assert!(Emotion::ALL
            .into_iter()
            .all(|e| classify(CrowdEmotion::Dominant(e)) != FeedbackMessage::NoFaces));
    }

    #[test]
    fn test_texts() {
        assert_eq!(
            classify(CrowdEmotion::Dominant(Emotion::Happy)).text(),
            "The crowd is loving it your music - keep it up!"
        );
        assert_eq!(
            classify(CrowdEmotion::Dominant(Emotion::Sad)).to_string(),
            "The crowd is not very engaged. Consider playing a more upbeat song."
        );
        assert_eq!(
            classify(CrowdEmotion::NoFaces).text(),
            "No faces detected."
        );
    }

    #[test]
    fn test_serializes_as_text() {
        assert_eq!(
            serde_json::to_string(&FeedbackMessage::NoFaces).unwrap(),
            "\"No faces detected.\""
        );
    }
}
