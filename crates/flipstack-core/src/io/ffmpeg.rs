use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Deserialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::consts::CHANNELS;
use crate::error::{FlipstackError, Result};
use crate::frame::{Frame, FrameSize};

use super::source::FrameSource;

pub fn is_ffmpeg_on_path() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        Command::new(tool)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

enum Input {
    /// Spilled byte stream; removed from disk when dropped.
    Temp(NamedTempFile),
    Path(PathBuf),
}

impl Input {
    fn path(&self) -> &Path {
        match self {
            Self::Temp(f) => f.path(),
            Self::Path(p) => p,
        }
    }
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Any container/codec ffmpeg can read, decoded one frame per subprocess.
pub struct FfmpegSource {
    input: Input,
    duration: f64,
    width: u32,
    height: u32,
}

impl FfmpegSource {
    /// Spill `bytes` to a temporary file and probe it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut file = NamedTempFile::new()?;
        file.write_all(bytes)?;
        file.flush()?;
        Self::probe(Input::Temp(file))
    }

    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FlipstackError::SourceUnavailable(format!(
                "{} does not exist",
                path.display()
            )));
        }
        Self::probe(Input::Path(path.to_path_buf()))
    }

    fn probe(input: Input) -> Result<Self> {
        let output = Command::new("ffprobe")
            .args(["-v", "error", "-select_streams", "v:0"])
            .args(["-show_entries", "stream=width,height,duration:format=duration"])
            .args(["-of", "json"])
            .arg(input.path())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| FlipstackError::SourceUnavailable(format!("failed to run ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(FlipstackError::SourceUnavailable(format!(
                "ffprobe could not read the video: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let probe: ProbeOutput = serde_json::from_slice(&output.stdout)
            .map_err(|e| FlipstackError::Decoder(format!("unexpected ffprobe output: {e}")))?;
        let stream = probe.streams.first().ok_or_else(|| {
            FlipstackError::SourceUnavailable("no video stream found".into())
        })?;

        let duration = probe
            .format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .or(stream.duration.as_deref())
            .and_then(|d| d.trim().parse::<f64>().ok())
            .unwrap_or(0.0);

        let source = Self {
            input,
            duration,
            width: stream.width.unwrap_or(0),
            height: stream.height.unwrap_or(0),
        };
        info!(
            duration = source.duration,
            width = source.width,
            height = source.height,
            "Probed video with ffprobe"
        );
        Ok(source)
    }

    /// Decode from the input position given by `position` (input options such
    /// as `-ss`), stopping after `max_frames` when set.
    fn decode(
        &self,
        position: &[&str],
        max_frames: Option<u32>,
        size: FrameSize,
    ) -> Result<Vec<u8>> {
        let mut command = Command::new("ffmpeg");
        command
            .args(["-hide_banner", "-loglevel", "error", "-nostdin"])
            .args(position)
            .arg("-i")
            .arg(self.input.path())
            .args(["-an", "-vf"])
            .arg(format!("scale={}:{}:flags=bilinear", size.width, size.height));
        if let Some(n) = max_frames {
            command.arg("-frames:v").arg(n.to_string());
        }
        let output = command
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| FlipstackError::Decoder(format!("failed to run ffmpeg: {e}")))?;

        if !output.status.success() {
            return Err(FlipstackError::Decoder(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(output.stdout)
    }
}

/// Format a `-ss` argument that never lands after `time_seconds`.
///
/// ffmpeg drops every frame with a pts below the requested position, so the
/// value is floored to whole microseconds rather than rounded.
fn seek_timestamp(time_seconds: f64, duration: f64) -> String {
    let t = time_seconds.clamp(0.0, duration.max(0.0));
    format!("{:.6}", (t * 1e6).floor() / 1e6)
}

impl FrameSource for FfmpegSource {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn seek(&mut self, time_seconds: f64, size: FrameSize) -> Result<Frame> {
        let frame_bytes = size.pixel_count() * CHANNELS;
        let seek_error = |reason: String| FlipstackError::Seek {
            time: time_seconds,
            reason,
        };

        let ts = seek_timestamp(time_seconds, self.duration);
        let mut raw = self
            .decode(&["-ss", &ts], Some(1), size)
            .map_err(|e| seek_error(e.to_string()))?;

        if raw.is_empty() {
            // Past the last decodable frame: clamp to the final one.
            debug!(time = time_seconds, "Seek past end, decoding final frame");
            raw = self
                .decode(&["-sseof", "-1"], None, size)
                .map_err(|e| seek_error(e.to_string()))?;
            if raw.len() >= frame_bytes {
                let start = (raw.len() / frame_bytes - 1) * frame_bytes;
                raw = raw[start..start + frame_bytes].to_vec();
            }
        }

        if raw.len() != frame_bytes {
            return Err(seek_error(format!(
                "expected {} bytes of RGB data, got {}",
                frame_bytes,
                raw.len()
            )));
        }
        Frame::from_rgb_bytes(size.width, size.height, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_position_never_passes_the_target() {
        // 1/6 s rounds up to 0.167 at millisecond precision, past the
        // 30 fps frame at 5/30 s.
        let ts = seek_timestamp(1.0 / 6.0, 10.0);
        assert_eq!(ts, "0.166666");
        assert!(ts.parse::<f64>().unwrap() <= 5.0 / 30.0);

        // No 60 fps frame is ever skipped.
        for i in 0..600 {
            let pts = i as f64 / 60.0;
            let position: f64 = seek_timestamp(pts, 20.0).parse().unwrap();
            assert!(position <= pts + 1e-9, "{pts}");
            assert!(pts - position < 2e-6, "{pts}");
        }
    }

    #[test]
    fn seek_position_is_clamped_to_the_video() {
        assert_eq!(seek_timestamp(-1.0, 4.0), "0.000000");
        assert_eq!(seek_timestamp(9.5, 4.0), "4.000000");
        assert_eq!(seek_timestamp(0.5, -1.0), "0.000000");
    }
}
