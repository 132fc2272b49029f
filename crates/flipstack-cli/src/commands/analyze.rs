use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use flipstack_core::analysis::{
    detect_active_range, merge_frame_indices, FrameAnalyzer, SamplingPlan,
};
use indicatif::{ProgressBar, ProgressStyle};

use super::{load_config, open_video};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input video (SER or anything ffmpeg reads)
    pub file: PathBuf,

    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Analysis frames per second of video
    #[arg(long)]
    pub fps: Option<f64>,

    /// Only print the frames with the highest baseline change
    #[arg(long)]
    pub top: Option<usize>,
}

pub fn run(args: &AnalyzeArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(fps) = args.fps {
        config.sampling.fps = fps;
    }
    config.validate()?;

    let mut source = open_video(&args.file)?;
    source.validate()?;
    let plan = SamplingPlan::new(source.duration(), config.sampling.fps);
    let size = source.native_size().scaled(config.sampling.analysis_scale);

    let pb = ProgressBar::new(plan.frame_count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("Analysing [{bar:40}] {pos}/{len} frames")?
            .progress_chars("=> "),
    );

    let analyzer = FrameAnalyzer {
        plan,
        size,
        thresholds: &config.thresholds,
        baseline_offset_secs: config.sampling.baseline_offset_secs,
        progress_interval: config.sampling.progress_interval,
    };
    let output = analyzer.run(&mut *source, |done| pb.set_position(done as u64))?;
    pb.finish_and_clear();

    let (range, range_tier) = detect_active_range(&output.metrics, &config.active_range);
    let (merge, merge_tier) = merge_frame_indices(&output.metrics, range, &config.active_range);

    println!(
        "Analysed {} frames at {} ({})",
        plan.frame_count, size, config.thresholds
    );
    println!("Active range:  {range} [{range_tier}]");
    println!("Merge frames:  {} [{merge_tier}]", merge.len());
    println!();

    let mut rows: Vec<usize> = (0..output.metrics.len()).collect();
    if let Some(top) = args.top {
        rows.sort_by(|&a, &b| {
            output.metrics[b]
                .baseline_ratio
                .total_cmp(&output.metrics[a].baseline_ratio)
                .then(a.cmp(&b))
        });
        rows.truncate(top);
    }

    println!(
        "{:>6}  {:>8}  {:>10}  {:>10}  {:>6}",
        "Frame", "Time", "Baseline", "Motion", "Merge"
    );
    for i in rows {
        let m = &output.metrics[i];
        println!(
            "{:>6}  {:>7.2}s  {:>10.4}  {:>10.4}  {:>6}",
            i,
            plan.timestamp(i),
            m.baseline_ratio,
            m.motion_ratio,
            if merge.binary_search(&i).is_ok() { "*" } else { "" }
        );
    }

    Ok(())
}
