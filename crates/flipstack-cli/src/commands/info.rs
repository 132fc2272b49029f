use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use flipstack_core::analysis::SamplingPlan;

use super::{load_config, open_video};

#[derive(Args)]
pub struct InfoArgs {
    /// Input video (SER or anything ffmpeg reads)
    pub file: PathBuf,

    /// Pipeline config file (TOML), used for the sampling rate
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let source = open_video(&args.file)?;
    let plan = SamplingPlan::new(source.duration(), config.sampling.fps);

    println!("File:        {}", args.file.display());
    println!("Duration:    {:.2} s", source.duration());
    println!("Dimensions:  {}", source.native_size());
    println!(
        "Output:      {}",
        source.native_size().scaled(config.sampling.output_scale)
    );
    println!(
        "Analysis:    {}",
        source.native_size().scaled(config.sampling.analysis_scale)
    );
    println!(
        "Samples:     {} at {} fps",
        plan.frame_count, config.sampling.fps
    );

    if let Err(e) = source.validate() {
        println!("Unusable:    {e}");
    }

    Ok(())
}
