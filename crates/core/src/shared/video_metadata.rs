use std::path::PathBuf;

/// Properties of an opened frame source. Still images report `fps = 0` and
/// one frame; capture devices report no frame count.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// A source with no known length, such as a camera.
    pub fn is_live(&self) -> bool {
        self.total_frames == 0
    }
}
