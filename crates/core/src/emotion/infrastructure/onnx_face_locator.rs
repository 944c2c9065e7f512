/// YOLO face locator using ONNX Runtime via `ort`.
///
/// Letterboxes the frame to the model's square input, runs inference and
/// keeps confident, non-overlapping boxes mapped back to frame pixels.
use std::path::Path;

use crate::emotion::domain::face_observation::BoundingBox;
use crate::shared::frame::Frame;

use super::execution_provider::open_session;
use super::math::bbox_iou;

/// Fallback input resolution when the model does not declare one.
const DEFAULT_INPUT_SIZE: u32 = 640;

const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value, YOLO convention.
const PAD_VALUE: f32 = 114.0 / 255.0;

/// A located face in frame coordinates, corners as `x1, y1, x2, y2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub confidence: f64,
}

impl FaceBox {
    fn corners(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Rounds to a pixel box clamped to the frame.
    pub fn to_bounding_box(&self, frame_width: u32, frame_height: u32) -> BoundingBox {
        let x = self.x1.round() as i32;
        let y = self.y1.round() as i32;
        let w = (self.x2 - self.x1).round() as i32;
        let h = (self.y2 - self.y1).round() as i32;
        BoundingBox::new(x, y, w, h).clamp_to(frame_width, frame_height)
    }
}

pub struct OnnxFaceLocator {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxFaceLocator {
    /// Loads a YOLO face model. The input resolution comes from the model's
    /// NCHW input shape, or 640 when that is dynamic.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = open_session(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { ref shape, .. }
                    if shape.len() >= 4 && shape[2] > 0 =>
                {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }

    pub fn locate(&mut self, frame: &Frame) -> Result<Vec<FaceBox>, Box<dyn std::error::Error>> {
        let (input_tensor, scale, pad_x, pad_y) = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("face model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("unexpected face model output shape: {shape:?}").into());
        }
        let data = tensor.as_slice().ok_or("cannot read face model output")?;

        let mut boxes = parse_detections(data, &shape, self.confidence, scale, pad_x, pad_y);
        let kept = nms(&mut boxes, NMS_IOU_THRESH);
        log::trace!("Frame {}: {} face(s) located", frame.index(), kept.len());
        Ok(kept)
    }
}

/// Reads `[cx, cy, w, h, conf, ...]` rows from a `[1, F, N]` or `[1, N, F]`
/// output and maps confident ones out of letterbox space.
fn parse_detections(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
) -> Vec<FaceBox> {
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 {
        return Vec::new();
    }
    let at = |det: usize, feat: usize| -> f64 {
        if transposed {
            data[feat * num_dets + det] as f64
        } else {
            data[det * num_feats + feat] as f64
        }
    };

    let unletterbox = |v: f64, pad: u32| (v - pad as f64) / scale;
    (0..num_dets)
        .filter(|&i| at(i, 4) >= confidence)
        .map(|i| {
            let (cx, cy, w, h) = (at(i, 0), at(i, 1), at(i, 2), at(i, 3));
            FaceBox {
                x1: unletterbox(cx - w / 2.0, pad_x),
                y1: unletterbox(cy - h / 2.0, pad_y),
                x2: unletterbox(cx + w / 2.0, pad_x),
                y2: unletterbox(cy + h / 2.0, pad_y),
                confidence: at(i, 4),
            }
        })
        .collect()
}

/// Letterbox-resizes a frame to `target_size` square.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let size = target_size as usize;
    let mut tensor = ndarray::Array4::<f32>::from_elem((1, 3, size, size), PAD_VALUE);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

/// Greedy NMS: highest confidence first, drop boxes overlapping a kept one.
fn nms(boxes: &mut [FaceBox], iou_thresh: f64) -> Vec<FaceBox> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<FaceBox> = Vec::new();
    for candidate in boxes.iter() {
        if keep
            .iter()
            .all(|kept| bbox_iou(&kept.corners(), &candidate.corners()) <= iou_thresh)
        {
            keep.push(*candidate);
        }
    }
    keep
}
