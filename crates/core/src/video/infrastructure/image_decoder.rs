use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("unsupported or corrupt image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Frame(#[from] PipelineError),
}

/// Decodes an encoded image (PNG, JPEG, ...) into an RGB frame with index 0.
pub fn decode_image(bytes: &[u8]) -> Result<Frame, DecodeError> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let (width, height) = rgb.dimensions();
    Ok(Frame::from_rgb(rgb.into_raw(), width, height, 0)?)
}

/// Decodes a base64 image payload, with or without a `data:image/...;base64,`
/// prefix.
pub fn decode_base64_image(payload: &str) -> Result<Frame, DecodeError> {
    let payload = payload.trim();
    let encoded = match payload.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, data)| data),
        None => payload,
    };
    let bytes = STANDARD.decode(encoded.trim())?;
    decode_image(&bytes)
}
