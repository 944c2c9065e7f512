use ndarray::ArrayView3;

use crate::shared::error::PipelineError;

/// Channel count of every frame the pipeline accepts (RGB).
pub const RGB_CHANNELS: u8 = 3;

/// A single captured frame: contiguous RGB bytes in row-major order.
///
/// Decoders convert to RGB at the I/O boundary; everything downstream
/// assumes that layout and checks it with [`Frame::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    /// Builds an RGB frame from untrusted input, rejecting malformed buffers
    /// instead of asserting.
    pub fn from_rgb(
        data: Vec<u8>,
        width: u32,
        height: u32,
        index: usize,
    ) -> Result<Self, PipelineError> {
        let frame = Self {
            data,
            width,
            height,
            channels: RGB_CHANNELS,
            index,
        };
        frame.validate()?;
        Ok(frame)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Checks that the frame is a non-empty RGB image whose buffer matches
    /// its dimensions.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::InvalidFrame(format!(
                "empty frame ({}x{})",
                self.width, self.height
            )));
        }
        if self.channels != RGB_CHANNELS {
            return Err(PipelineError::InvalidFrame(format!(
                "expected {RGB_CHANNELS} channels, got {}",
                self.channels
            )));
        }
        let expected = self.pixel_count() * self.channels as usize;
        if self.data.len() != expected {
            return Err(PipelineError::InvalidFrame(format!(
                "buffer holds {} bytes, {}x{}x{} needs {expected}",
                self.data.len(),
                self.width,
                self.height,
                self.channels
            )));
        }
        Ok(())
    }

    /// Returns a left-right flipped copy, as a front-facing camera preview
    /// shows it.
    pub fn mirrored(&self) -> Frame {
        let w = self.width as usize;
        let c = self.channels as usize;
        let row_len = w * c;
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.data.chunks_exact(row_len.max(1)) {
            for x in (0..w).rev() {
                data.extend_from_slice(&row[x * c..(x + 1) * c]);
            }
        }
        Frame {
            data,
            width: self.width,
            height: self.height,
            channels: self.channels,
            index: self.index,
        }
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.pixel_count(), 4);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 3, 0);
    }

    #[test]
    fn test_from_rgb_accepts_well_formed_buffer() {
        let frame = Frame::from_rgb(vec![7u8; 18], 3, 2, 1).unwrap();
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 1);
    }

    #[test]
    fn test_from_rgb_rejects_short_buffer() {
        let err = Frame::from_rgb(vec![0u8; 10], 2, 2, 0).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidFrame(_)));
    }

    #[test]
    fn test_validate_rejects_empty_frame() {
        let frame = Frame::new(Vec::new(), 0, 0, 3, 0);
        assert!(matches!(
            frame.validate(),
            Err(PipelineError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_validate_rejects_grayscale() {
        let frame = Frame::new(vec![0u8; 4], 2, 2, 1, 0);
        assert!(matches!(
            frame.validate(),
            Err(PipelineError::InvalidFrame(_))
        ));
    }

    #[test]
    fn test_mirrored_swaps_columns() {
        // 2x1 RGB: red then blue
        let frame = Frame::new(vec![255, 0, 0, 0, 0, 255], 2, 1, 3, 0);
        let flipped = frame.mirrored();
        assert_eq!(flipped.data(), &[0, 0, 255, 255, 0, 0]);
        assert_eq!(flipped.mirrored(), frame);
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 RGB: set pixel (row=1, col=0) to red
        let mut data = vec![0u8; 12];
        data[6] = 255;
        let frame = Frame::new(data, 2, 2, 3, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 2, 3]);
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
    }
}
