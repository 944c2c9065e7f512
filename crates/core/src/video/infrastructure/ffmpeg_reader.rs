use std::path::{Path, PathBuf};

use ffmpeg_next::format::context::Input;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Where frames come from: a file on disk or a capture device driven by an
/// ffmpeg input device (`v4l2`, `avfoundation`, `dshow`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Device { format: String, url: String },
}

const DEVICE_FORMATS: &[&str] = &["v4l2", "avfoundation", "dshow", "x11grab", "gdigrab"];

/// Interprets a reader argument. `v4l2:/dev/video0`, `avfoundation:0` and
/// `dshow:video=Camera` select a device format explicitly; bare
/// `/dev/video*` paths are V4L2 cameras.
pub fn parse_source(input: &str) -> Source {
    if let Some((prefix, url)) = input.split_once(':') {
        if DEVICE_FORMATS.contains(&prefix) {
            return Source::Device {
                format: prefix.to_string(),
                url: url.to_string(),
            };
        }
    }
    if input.starts_with("/dev/video") {
        return Source::Device {
            format: "v4l2".to_string(),
            url: input.to_string(),
        };
    }
    Source::File(PathBuf::from(input))
}

/// Decodes video files and camera feeds via ffmpeg-next.
///
/// Converts each decoded frame to RGB24 and wraps it in a [`Frame`].
#[derive(Default)]
pub struct FfmpegReader {
    stream: Option<OpenStream>,
}

struct OpenStream {
    ictx: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let source = parse_source(&path.to_string_lossy());
        let ictx = open_input(&source)
            .map_err(|e| format!("failed to open {}: {e}", path.display()))?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;
        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };
        let total_frames = stream.frames().max(0) as usize;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            total_frames,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };
        log::info!(
            "Opened {} ({}x{}, {:.1} fps, {})",
            path.display(),
            width,
            height,
            fps,
            metadata.codec
        );

        self.stream = Some(OpenStream {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        });
        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.stream.as_mut() {
            Some(stream) => Box::new(FfmpegFrameIter {
                stream,
                frame_index: 0,
                flushing: false,
                done: false,
            }),
            None => Box::new(std::iter::once(Err("FfmpegReader: not opened".into()))),
        }
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

fn open_input(source: &Source) -> Result<Input, Box<dyn std::error::Error>> {
    match source {
        Source::File(path) => Ok(ffmpeg_next::format::input(path)?),
        Source::Device { format, url } => {
            ffmpeg_next::device::register_all();
            let device = ffmpeg_next::device::input::video()
                .find(|candidate| candidate.name().split(',').any(|name| name == format))
                .ok_or_else(|| format!("capture format '{format}' is not available"))?;
            let ctx = ffmpeg_next::format::open_with(
                url,
                &ffmpeg_next::format::format::Format::Input(device),
                ffmpeg_next::Dictionary::new(),
            )?;
            match ctx {
                ffmpeg_next::format::context::Context::Input(ictx) => Ok(ictx),
                ffmpeg_next::format::context::Context::Output(_) => {
                    Err(format!("{format}:{url} is not an input device").into())
                }
            }
        }
    }
}

/// Decodes lazily so a camera feed or long video is never buffered whole.
struct FfmpegFrameIter<'a> {
    stream: &'a mut OpenStream,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl FfmpegFrameIter<'_> {
    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.stream.decoder.receive_frame(&mut decoded).is_err() {
            return None;
        }

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.stream.scaler.run(&decoded, &mut rgb_frame) {
            return Some(Err(Box::new(e)));
        }

        let (width, height) = (self.stream.width, self.stream.height);
        let pixels = extract_rgb_pixels(&rgb_frame, width, height);
        let frame = Frame::from_rgb(pixels, width, height, self.frame_index);
        self.frame_index += 1;
        Some(frame.map_err(Into::into))
    }
}

impl Iterator for FfmpegFrameIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive() {
            return Some(result);
        }

        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.stream.ictx.packets().next() else {
                let _ = self.stream.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.stream.stream_index {
                continue;
            }

            if let Err(e) = self.stream.decoder.send_packet(&packet) {
                log::trace!("Skipping undecodable packet: {e}");
                continue;
            }

            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

/// Copies an RGB24 ffmpeg frame into a tightly packed buffer, dropping the
/// per-row stride padding.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + row_bytes]);
    }
    pixels
}
