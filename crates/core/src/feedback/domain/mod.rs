pub mod feedback_classifier;
