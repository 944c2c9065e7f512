use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

/// Domain interface for one image enhancement step.
///
/// Implementations modify the frame in place and keep its dimensions and
/// channel layout.
pub trait FrameEnhancer: Send {
    fn enhance(&self, frame: &mut Frame) -> Result<(), PipelineError>;
}
