pub mod emotion;
pub mod emotion_aggregator;
pub mod emotion_detector;
pub mod face_observation;
