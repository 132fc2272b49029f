use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlipstackError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Video source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Failed to decode frame at {time:.3}s: {reason}")]
    Seek { time: f64, reason: String },

    #[error("Invalid video duration: {0}s")]
    InvalidDuration(f64),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Decoder error: {0}")]
    Decoder(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, FlipstackError>;
