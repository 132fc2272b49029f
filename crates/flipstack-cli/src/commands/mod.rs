pub mod analyze;
pub mod config;
pub mod info;
pub mod pipeline;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flipstack_core::io::open_source;
use flipstack_core::io::source::FrameSource;
use flipstack_core::pipeline::config::PipelineConfig;

/// Read a video file fully and open a frame source over it.
pub fn open_video(path: &Path) -> Result<Box<dyn FrameSource>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    open_source(bytes).with_context(|| format!("Failed to open video {}", path.display()))
}

/// Load a TOML config, or the defaults when no path is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Invalid pipeline config {}", path.display())),
        None => Ok(PipelineConfig::default()),
    }
}
