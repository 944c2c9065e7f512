pub mod detector_factory;
mod execution_provider;
mod math;
pub mod onnx_emotion_classifier;
pub mod onnx_emotion_detector;
pub mod onnx_face_locator;
pub mod replay_emotion_detector;
