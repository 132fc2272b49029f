use std::process::Command;

use approx::assert_relative_eq;
use flipstack_core::frame::FrameSize;
use flipstack_core::io::ffmpeg::{is_ffmpeg_on_path, FfmpegSource};
use flipstack_core::io::open_source;
use flipstack_core::io::source::FrameSource;
use flipstack_core::FlipstackError;

/// Render a short test pattern clip, or `None` when ffmpeg is not installed.
fn test_clip(dir: &std::path::Path) -> Option<std::path::PathBuf> {
    if !is_ffmpeg_on_path() {
        eprintln!("ffmpeg not found, skipping");
        return None;
    }
    let path = dir.join("clip.mp4");
    let status = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y"])
        .args(["-f", "lavfi", "-i", "testsrc=size=64x48:rate=10"])
        .args(["-t", "2", "-pix_fmt", "yuv420p"])
        .arg(&path)
        .status()
        .expect("run ffmpeg");
    assert!(status.success());
    Some(path)
}

#[test]
fn probes_and_seeks() {
    let dir = tempfile::tempdir().unwrap();
    let Some(path) = test_clip(dir.path()) else {
        return;
    };

    let mut source = FfmpegSource::open(&path).unwrap();
    assert_eq!(source.native_size(), FrameSize::new(64, 48));
    assert_relative_eq!(source.duration(), 2.0, epsilon = 0.1);

    let frame = source.seek(0.5, FrameSize::new(32, 24)).unwrap();
    assert_eq!(frame.size(), FrameSize::new(32, 24));

    // Past the end clamps to the last frame.
    let last = source.seek(10.0, FrameSize::new(16, 12)).unwrap();
    assert_eq!(last.size(), FrameSize::new(16, 12));
}

#[test]
fn opens_from_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let Some(path) = test_clip(dir.path()) else {
        return;
    };
    let bytes = std::fs::read(&path).unwrap();
    let source = open_source(bytes).unwrap();
    assert_eq!(source.width(), 64);
    source.validate().unwrap();
}

#[test]
fn garbage_is_not_a_video() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let err = FfmpegSource::from_bytes(b"definitely not a video").err();
    assert!(matches!(err, Some(FlipstackError::SourceUnavailable(_))));
}

#[test]
fn missing_file_is_unavailable() {
    let err = FfmpegSource::open(std::path::Path::new("/nonexistent/clip.mp4")).err();
    assert!(matches!(err, Some(FlipstackError::SourceUnavailable(_))));
}
