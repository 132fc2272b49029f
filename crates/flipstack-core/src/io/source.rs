use crate::error::{FlipstackError, Result};
use crate::frame::{Frame, FrameSize};

/// A seekable, decodable video.
///
/// One instance is shared by every pass of a pipeline run, so frames are
/// requested strictly one at a time.
pub trait FrameSource {
    /// Length of the video in seconds.
    fn duration(&self) -> f64;

    /// Native frame width in pixels.
    fn width(&self) -> u32;

    /// Native frame height in pixels.
    fn height(&self) -> u32;

    /// Decode the nearest frame at or after `time_seconds` (clamped into the
    /// video), resampled to `size`.
    fn seek(&mut self, time_seconds: f64, size: FrameSize) -> Result<Frame>;

    fn native_size(&self) -> FrameSize {
        FrameSize::new(self.width(), self.height())
    }

    /// Reject videos the pipeline cannot sample.
    fn validate(&self) -> Result<()> {
        let duration = self.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return Err(FlipstackError::InvalidDuration(duration));
        }
        if self.width() == 0 || self.height() == 0 {
            return Err(FlipstackError::InvalidDimensions {
                width: self.width(),
                height: self.height(),
            });
        }
        Ok(())
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn duration(&self) -> f64 {
        (**self).duration()
    }

    fn width(&self) -> u32 {
        (**self).width()
    }

    fn height(&self) -> u32 {
        (**self).height()
    }

    fn seek(&mut self, time_seconds: f64, size: FrameSize) -> Result<Frame> {
        (**self).seek(time_seconds, size)
    }
}

/// Map a timestamp to the first frame index at or after it, for a source with
/// a constant frame interval.
pub(crate) fn frame_index_at(time_seconds: f64, frame_rate: f64, frame_count: usize) -> usize {
    if frame_count == 0 {
        return 0;
    }
    let t = time_seconds.max(0.0);
    // Tolerance keeps exact frame timestamps from rounding up a frame.
    let index = (t * frame_rate - 1e-6).ceil().max(0.0) as usize;
    index.min(frame_count - 1)
}

/// Decoded frames held in memory, played back at a constant frame rate.
#[derive(Clone, Debug)]
pub struct VecSource {
    frames: Vec<Frame>,
    frame_rate: f64,
    size: FrameSize,
    seeks: usize,
}

impl VecSource {
    /// All frames must share the first frame's size.
    pub fn new(frames: Vec<Frame>, frame_rate: f64) -> Result<Self> {
        let size = frames
            .first()
            .map(Frame::size)
            .unwrap_or(FrameSize::new(0, 0));
        if let Some(bad) = frames.iter().find(|f| f.size() != size) {
            return Err(FlipstackError::InvalidDimensions {
                width: bad.width() as u32,
                height: bad.height() as u32,
            });
        }
        if !(frame_rate.is_finite() && frame_rate > 0.0) {
            return Err(FlipstackError::SourceUnavailable(format!(
                "frame rate must be positive, got {frame_rate}"
            )));
        }
        Ok(Self {
            frames,
            frame_rate,
            size,
            seeks: 0,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Number of `seek` calls served so far.
    pub fn seek_count(&self) -> usize {
        self.seeks
    }
}

impl FrameSource for VecSource {
    fn duration(&self) -> f64 {
        self.frames.len() as f64 / self.frame_rate
    }

    fn width(&self) -> u32 {
        self.size.width
    }

    fn height(&self) -> u32 {
        self.size.height
    }

    fn seek(&mut self, time_seconds: f64, size: FrameSize) -> Result<Frame> {
        if self.frames.is_empty() {
            return Err(FlipstackError::Seek {
                time: time_seconds,
                reason: "source has no frames".into(),
            });
        }
        self.seeks += 1;
        let index = frame_index_at(time_seconds, self.frame_rate, self.frames.len());
        Ok(self.frames[index].resized(size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_index_rounds_up_between_frames() {
        assert_eq!(frame_index_at(0.0, 10.0, 5), 0);
        assert_eq!(frame_index_at(0.1, 10.0, 5), 1);
        assert_eq!(frame_index_at(0.15, 10.0, 5), 2);
        assert_eq!(frame_index_at(99.0, 10.0, 5), 4);
        assert_eq!(frame_index_at(-1.0, 10.0, 5), 0);
    }

    #[test]
    fn empty_source_fails_validation() {
        let source = VecSource::new(Vec::new(), 10.0).unwrap();
        assert!(source.validate().is_err());
    }
}
