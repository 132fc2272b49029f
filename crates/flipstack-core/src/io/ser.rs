use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array3;
use tracing::debug;

use crate::consts::{CHANNELS, DEFAULT_SER_FRAME_RATE, SER_TICKS_PER_SECOND};
use crate::error::{FlipstackError, Result};
use crate::frame::{Frame, FrameSize};

use super::source::{frame_index_at, FrameSource};

pub const SER_HEADER_SIZE: usize = 178;
pub const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// SER color identifiers this reader understands.
pub const SER_COLOR_MONO: i32 = 0;
pub const SER_COLOR_RGB: i32 = 100;
pub const SER_COLOR_BGR: i32 = 101;

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
    pub date_time: u64,
    pub date_time_utc: u64,
}

impl SerHeader {
    /// Header for an 8-bit RGB recording.
    pub fn rgb8(width: u32, height: u32, frame_count: u32) -> Self {
        Self {
            color_id: SER_COLOR_RGB,
            little_endian: true,
            width,
            height,
            pixel_depth: 8,
            frame_count,
            observer: String::new(),
            instrument: String::new(),
            telescope: String::new(),
            date_time: 0,
            date_time_utc: 0,
        }
    }

    /// Bytes per pixel plane (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_pixel_plane(&self) -> usize {
        if self.pixel_depth <= 8 { 1 } else { 2 }
    }

    /// Number of planes per pixel (1 for mono/bayer, 3 for RGB/BGR).
    pub fn planes_per_pixel(&self) -> usize {
        match self.color_id {
            SER_COLOR_RGB | SER_COLOR_BGR => 3,
            _ => 1,
        }
    }

    /// Total bytes per frame, `None` on overflow.
    pub fn frame_byte_size(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.bytes_per_pixel_plane() * self.planes_per_pixel())
    }
}

enum SerBytes {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl AsRef<[u8]> for SerBytes {
    fn as_ref(&self) -> &[u8] {
        match self {
            Self::Owned(v) => v.as_slice(),
            Self::Mapped(m) => &m[..],
        }
    }
}

/// SER video reader. Bayer data is read as a single luminance plane.
pub struct SerSource {
    bytes: SerBytes,
    pub header: SerHeader,
    frame_size: usize,
    frame_rate: f64,
}

impl SerSource {
    /// Parse a SER recording held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_backing(SerBytes::Owned(bytes))
    }

    /// Memory-map a SER file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the map is read-only and lives as long as the source.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_backing(SerBytes::Mapped(mmap))
    }

    fn from_backing(bytes: SerBytes) -> Result<Self> {
        let buf = bytes.as_ref();
        if buf.len() < SER_HEADER_SIZE {
            return Err(FlipstackError::InvalidSer(
                "File too small for SER header".into(),
            ));
        }
        if !is_ser(buf) {
            return Err(FlipstackError::InvalidSer(
                "Missing LUCAM-RECORDER magic".into(),
            ));
        }

        let header = parse_header(&buf[..SER_HEADER_SIZE])?;
        let frame_size = header
            .frame_byte_size()
            .ok_or_else(|| FlipstackError::InvalidSer("Frame size overflows".into()))?;

        let expected = frame_size
            .checked_mul(header.frame_count as usize)
            .and_then(|n| n.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| FlipstackError::InvalidSer("Frame data size overflows".into()))?;
        if buf.len() < expected {
            return Err(FlipstackError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected,
                buf.len()
            )));
        }

        let mut source = Self {
            bytes,
            header,
            frame_size,
            frame_rate: DEFAULT_SER_FRAME_RATE,
        };
        if let Some(rate) = source.frame_rate_from_timestamps() {
            source.frame_rate = rate;
        }
        debug!(
            width = source.header.width,
            height = source.header.height,
            frames = source.frame_count(),
            frame_rate = source.frame_rate,
            "Opened SER source"
        );
        Ok(source)
    }

    /// Override the playback rate, e.g. for files without timestamps.
    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        if frame_rate.is_finite() && frame_rate > 0.0 {
            self.frame_rate = frame_rate;
        }
        self
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Raw bytes for a single frame, zero-copy.
    pub fn frame_raw(&self, index: usize) -> Option<&[u8]> {
        if index >= self.frame_count() {
            return None;
        }
        let offset = SER_HEADER_SIZE + index * self.frame_size;
        self.bytes.as_ref().get(offset..offset + self.frame_size)
    }

    /// Decode frame `index` at native resolution.
    pub fn read_frame(&self, index: usize) -> Result<Frame> {
        let raw = self.frame_raw(index).ok_or_else(|| FlipstackError::Seek {
            time: index as f64 / self.frame_rate,
            reason: format!("frame {} out of range (total: {})", index, self.frame_count()),
        })?;
        Ok(Frame::new(decode_rgb(raw, &self.header)))
    }

    /// Per-frame timestamp from the optional trailer.
    fn read_timestamp(&self, index: usize) -> Option<u64> {
        let trailer = SER_HEADER_SIZE + self.frame_size * self.frame_count();
        let offset = trailer + index * 8;
        let bytes = self.bytes.as_ref().get(offset..offset + 8)?;
        Some(u64::from_le_bytes(bytes.try_into().ok()?))
    }

    fn frame_rate_from_timestamps(&self) -> Option<f64> {
        let n = self.frame_count();
        if n < 2 {
            return None;
        }
        let first = self.read_timestamp(0)?;
        let last = self.read_timestamp(n - 1)?;
        if last <= first {
            return None;
        }
        let span = (last - first) as f64 / SER_TICKS_PER_SECOND;
        Some((n - 1) as f64 / span)
    }
}

impl FrameSource for SerSource {
    fn duration(&self) -> f64 {
        self.frame_count() as f64 / self.frame_rate
    }

    fn width(&self) -> u32 {
        self.header.width
    }

    fn height(&self) -> u32 {
        self.header.height
    }

    fn seek(&mut self, time_seconds: f64, size: FrameSize) -> Result<Frame> {
        let index = frame_index_at(time_seconds, self.frame_rate, self.frame_count());
        let frame = self.read_frame(index)?;
        Ok(frame.resized(size))
    }
}

/// Whether `buf` starts with the SER magic.
pub fn is_ser(buf: &[u8]) -> bool {
    buf.len() >= SER_MAGIC.len() && &buf[..SER_MAGIC.len()] == SER_MAGIC
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()?.max(0) as u32;
    let height = cursor.read_i32::<LittleEndian>()?.max(0) as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()?.clamp(1, 16) as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()?.max(0) as u32;

    let observer = read_fixed_string(&buf[42..82]);
    let instrument = read_fixed_string(&buf[82..122]);
    let telescope = read_fixed_string(&buf[122..162]);

    let mut cursor = std::io::Cursor::new(&buf[162..]);
    let date_time = cursor.read_u64::<LittleEndian>()?;
    let date_time_utc = cursor.read_u64::<LittleEndian>()?;

    if width == 0 || height == 0 {
        return Err(FlipstackError::InvalidDimensions { width, height });
    }

    // Siril convention: 0 means little-endian despite the field's name.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count,
        observer,
        instrument,
        telescope,
        date_time,
        date_time_utc,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

/// Decode one frame into 8-bit RGB, whatever the stored layout.
fn decode_rgb(raw: &[u8], header: &SerHeader) -> Array3<u8> {
    let h = header.height as usize;
    let w = header.width as usize;
    let bps = header.bytes_per_pixel_plane();
    let planes = header.planes_per_pixel();
    let shift = header.pixel_depth.saturating_sub(8);

    let sample = |idx: usize| -> u8 {
        if bps == 1 {
            raw[idx]
        } else {
            let pair = [raw[idx], raw[idx + 1]];
            let v = if header.little_endian {
                u16::from_le_bytes(pair)
            } else {
                u16::from_be_bytes(pair)
            };
            (v >> shift).min(255) as u8
        }
    };

    Array3::from_shape_fn((h, w, CHANNELS), |(row, col, c)| {
        let pixel = (row * w + col) * planes * bps;
        let plane = match (header.color_id, planes) {
            (_, 1) => 0,
            (SER_COLOR_BGR, _) => 2 - c,
            _ => c,
        };
        sample(pixel + plane * bps)
    })
}
