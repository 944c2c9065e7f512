pub mod ffmpeg_reader;
pub mod image_decoder;
pub mod image_file_reader;
