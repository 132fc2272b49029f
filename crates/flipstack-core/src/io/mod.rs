pub mod ffmpeg;
pub mod image_io;
pub mod ser;
pub mod ser_writer;
pub mod source;

use tracing::info;

use crate::error::Result;

use self::ffmpeg::FfmpegSource;
use self::ser::{is_ser, SerSource};
use self::source::FrameSource;

/// Open a video held in memory, picking a decoder from its leading bytes.
///
/// SER recordings are parsed directly; everything else goes through ffmpeg.
pub fn open_source(bytes: Vec<u8>) -> Result<Box<dyn FrameSource>> {
    if is_ser(&bytes) {
        info!(bytes = bytes.len(), "Opening SER recording");
        Ok(Box::new(SerSource::from_bytes(bytes)?))
    } else {
        info!(bytes = bytes.len(), "Opening video through ffmpeg");
        Ok(Box::new(FfmpegSource::from_bytes(&bytes)?))
    }
}
