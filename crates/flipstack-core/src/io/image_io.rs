use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;

use crate::error::Result;
use crate::frame::Frame;

/// A still image ready to hand to a consumer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl EncodedImage {
    /// Write the encoded bytes as-is.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Encode a frame as 8-bit RGB PNG in memory.
pub fn encode_png(frame: &Frame) -> Result<EncodedImage> {
    let image = frame.to_rgb_image();
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(EncodedImage {
        bytes,
        width: image.width(),
        height: image.height(),
        format: ImageFormat::Png,
    })
}

/// Save a frame, choosing the format from the file extension (PNG by default).
pub fn save_image(frame: &Frame, path: &Path) -> Result<()> {
    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("tiff" | "tif") => ImageFormat::Tiff,
        Some("jpg" | "jpeg") => ImageFormat::Jpeg,
        _ => ImageFormat::Png,
    };
    frame.to_rgb_image().save_with_format(path, format)?;
    Ok(())
}
