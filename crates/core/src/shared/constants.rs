pub const FACE_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const FACE_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMOTION_MODEL_NAME: &str = "emotion-ferplus-8.onnx";
pub const EMOTION_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/emotion_ferplus/model/emotion-ferplus-8.onnx";

/// Minimum face detection confidence.
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Frames darker than this mean luminance get gamma correction.
pub const BRIGHTNESS_THRESHOLD: f64 = 60.0;
/// Frames with a luminance standard deviation below this get CLAHE.
pub const CONTRAST_THRESHOLD: f64 = 40.0;
/// Frames with a luminance variance above this get denoised.
pub const NOISE_THRESHOLD: f64 = 1000.0;
pub const DEFAULT_GAMMA: f64 = 0.5;

pub const CLAHE_CLIP_LIMIT: f64 = 2.0;
pub const CLAHE_TILE_GRID: usize = 8;

pub const DENOISE_LUMA_STRENGTH: f32 = 10.0;
pub const DENOISE_CHROMA_STRENGTH: f32 = 10.0;
pub const DENOISE_TEMPLATE_SIZE: usize = 7;
pub const DENOISE_SEARCH_SIZE: usize = 21;

pub const DEFAULT_NOTIFICATION_INTERVAL_SECS: f64 = 10.0;
pub const DEFAULT_ALERT_TITLE: &str = "Alert";
pub const DEFAULT_ALERT_TIMEOUT_SECS: u64 = 5;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
