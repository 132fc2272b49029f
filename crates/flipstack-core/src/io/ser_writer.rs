use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::consts::SER_TICKS_PER_SECOND;
use crate::error::Result;
use crate::frame::Frame;
use crate::io::ser::{SerHeader, SER_HEADER_SIZE, SER_MAGIC};

/// Writes 8-bit RGB SER recordings.
pub struct SerWriter<W: Write> {
    writer: W,
    frames_written: u32,
}

impl SerWriter<BufWriter<File>> {
    /// Create a new SER file and write the header.
    pub fn create(path: &Path, header: &SerHeader) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), header)
    }
}

impl<W: Write> SerWriter<W> {
    pub fn new(mut writer: W, header: &SerHeader) -> Result<Self> {
        write_header(&mut writer, header)?;
        Ok(Self {
            writer,
            frames_written: 0,
        })
    }

    /// Append one frame as interleaved RGB.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        for row in 0..frame.height() {
            for col in 0..frame.width() {
                self.writer.write_all(&frame.pixel(row, col))?;
            }
        }
        self.frames_written += 1;
        Ok(())
    }

    /// Write the timestamp trailer for frames spaced `1 / frame_rate` apart.
    pub fn write_timestamps(&mut self, frame_rate: f64) -> Result<()> {
        let step = SER_TICKS_PER_SECOND / frame_rate;
        for i in 0..self.frames_written {
            let ts = (i as f64 * step).round() as u64;
            self.writer.write_all(&ts.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }

    /// Flush and hand back the underlying writer.
    pub fn finalize(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

fn write_header(w: &mut impl Write, header: &SerHeader) -> Result<()> {
    w.write_all(SER_MAGIC)?;
    // LuID
    w.write_all(&0i32.to_le_bytes())?;
    w.write_all(&header.color_id.to_le_bytes())?;
    // 0 = little-endian (Siril convention)
    let le_flag: i32 = if header.little_endian { 0 } else { 1 };
    w.write_all(&le_flag.to_le_bytes())?;
    w.write_all(&(header.width as i32).to_le_bytes())?;
    w.write_all(&(header.height as i32).to_le_bytes())?;
    w.write_all(&(header.pixel_depth as i32).to_le_bytes())?;
    w.write_all(&(header.frame_count as i32).to_le_bytes())?;
    write_fixed_string(w, &header.observer, 40)?;
    write_fixed_string(w, &header.instrument, 40)?;
    write_fixed_string(w, &header.telescope, 40)?;
    w.write_all(&header.date_time.to_le_bytes())?;
    w.write_all(&header.date_time_utc.to_le_bytes())?;

    debug_assert_eq!(
        14 + 4 + 4 + 4 + 4 + 4 + 4 + 4 + 40 + 40 + 40 + 8 + 8,
        SER_HEADER_SIZE
    );
    Ok(())
}

fn write_fixed_string(w: &mut impl Write, s: &str, len: usize) -> Result<()> {
    let bytes = s.as_bytes();
    let to_write = bytes.len().min(len);
    w.write_all(&bytes[..to_write])?;
    w.write_all(&vec![0u8; len - to_write])?;
    Ok(())
}
