use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use flipstack_core::pipeline::config::PipelineConfig;
use flipstack_core::pipeline::run_pipeline_reported;
use tracing::debug;

use super::{load_config, open_video};
use crate::progress::BarReporter;
use crate::summary::{print_pipeline_summary, print_report};

#[derive(Args)]
pub struct RunArgs {
    /// Input video (SER or anything ffmpeg reads)
    pub file: PathBuf,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Analysis frames per second of video
    #[arg(long)]
    pub fps: Option<f64>,

    /// Output resolution as a fraction of the source
    #[arg(long)]
    pub scale: Option<f32>,

    /// Grid rows
    #[arg(long)]
    pub rows: Option<usize>,

    /// Grid columns
    #[arg(long)]
    pub cols: Option<usize>,

    /// Split the frame evenly instead of using the card layout
    #[arg(long)]
    pub uniform: bool,

    /// Unsharp strength (0 disables)
    #[arg(long)]
    pub sharpen: Option<f32>,

    /// Disable sharpening
    #[arg(long)]
    pub no_sharpen: bool,

    /// Print per-cell diagnostics after the run
    #[arg(long)]
    pub report: bool,

    /// Output file path (png, tiff or jpeg by extension)
    #[arg(short, long, default_value = "cards.png")]
    pub output: PathBuf,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    apply_overrides(&mut config, args);
    config.validate().context("Invalid pipeline settings")?;
    debug!(?config, "Effective pipeline config");

    print_pipeline_summary(&config, &args.file, &args.output);

    let mut source = open_video(&args.file)?;
    let reporter = BarReporter::new()?;
    let output = run_pipeline_reported(&mut *source, &config, &reporter)?;
    reporter.finish();

    let is_png = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_none_or(|e| e.eq_ignore_ascii_case("png"));
    if is_png {
        output.image.save(&args.output)?;
    } else {
        flipstack_core::io::image_io::save_image(&output.composite, &args.output)?;
    }

    if args.report {
        print_report(&output.report);
    }
    println!("\nOutput saved to {}", args.output.display());

    Ok(())
}

fn apply_overrides(config: &mut PipelineConfig, args: &RunArgs) {
    if let Some(fps) = args.fps {
        config.sampling.fps = fps;
    }
    if let Some(scale) = args.scale {
        config.sampling.output_scale = scale;
    }
    if let Some(rows) = args.rows {
        config.grid.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.grid.cols = cols;
    }
    if args.uniform {
        config.grid.layout = None;
    }
    if let Some(strength) = args.sharpen {
        config.sharpening.strength = strength;
    }
    if args.no_sharpen {
        config.sharpening.strength = 0.0;
    }
}
