use tracing::info;

use crate::analysis::{detect_active_range, merge_frame_indices, FrameAnalyzer, SamplingPlan};
use crate::composite::{composite_frames, fill_unresolved, CellCompositor, CellScorer, FrameCache};
use crate::error::Result;
use crate::grid::build_regions;
use crate::io::image_io::{encode_png, EncodedImage};
use crate::io::open_source;
use crate::io::source::FrameSource;
use crate::sharpen::sharpen;

use super::config::PipelineConfig;
use super::types::{
    CellSummary, FnReporter, NoOpReporter, PipelineOutput, PipelineReport, PipelineStage,
    ProgressReporter, ProgressTracker,
};

/// Turn a recorded video into one PNG showing every card face.
///
/// `on_progress` is called with `(current, total)`; see [`ProgressReporter`].
pub fn process_video_to_image<F>(
    video: Vec<u8>,
    config: &PipelineConfig,
    on_progress: F,
) -> Result<EncodedImage>
where
    F: FnMut(usize, usize) + Send,
{
    let reporter = FnReporter::new(on_progress);
    let mut source = open_source(video)?;
    let output = run_pipeline_reported(&mut source, config, &reporter)?;
    Ok(output.image)
}

/// Run the full pipeline on an already opened source without progress.
pub fn run_pipeline<S: FrameSource + ?Sized>(
    source: &mut S,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    run_pipeline_reported(source, config, &NoOpReporter)
}

/// Run the full pipeline with a progress reporter.
///
/// Two sequential passes share `source`: whole-frame analysis at the
/// analysis scale, then per-cell compositing at the output scale.
pub fn run_pipeline_reported<S: FrameSource + ?Sized>(
    source: &mut S,
    config: &PipelineConfig,
    reporter: &dyn ProgressReporter,
) -> Result<PipelineOutput> {
    config.validate()?;
    source.validate()?;

    let native = source.native_size();
    let output_size = native.scaled(config.sampling.output_scale);
    let analysis_size = native.scaled(config.sampling.analysis_scale);
    let plan = SamplingPlan::new(source.duration(), config.sampling.fps);
    info!(
        duration = plan.duration,
        frames = plan.frame_count,
        native = %native,
        output = %output_size,
        analysis = %analysis_size,
        "Starting pipeline"
    );

    let mut tracker = ProgressTracker::new(reporter, plan.frame_count);
    tracker.report(0);

    // Analysis
    reporter.begin_stage(PipelineStage::Analysis);
    let analyzer = FrameAnalyzer {
        plan,
        size: analysis_size,
        thresholds: &config.thresholds,
        baseline_offset_secs: config.sampling.baseline_offset_secs,
        progress_interval: config.sampling.progress_interval,
    };
    let analysis = analyzer.run(&mut *source, |done| tracker.analysis(done))?;
    reporter.finish_stage();

    // Gameplay window + merge frames
    reporter.begin_stage(PipelineStage::RangeDetection);
    let (active_range, range_tier) = detect_active_range(&analysis.metrics, &config.active_range);
    let (merge_frames, merge_tier) =
        merge_frame_indices(&analysis.metrics, active_range, &config.active_range);
    reporter.finish_stage();

    // Merge
    reporter.begin_stage(PipelineStage::Merging);
    let baseline = if analysis_size == output_size {
        analysis.baseline
    } else {
        let t = plan.baseline_timestamp(config.sampling.baseline_offset_secs);
        source.seek(t, output_size)?
    };
    let regions = build_regions(output_size, &config.grid);
    let scorer = CellScorer {
        thresholds: &config.thresholds,
        merge: &config.merge,
    };
    let compositor =
        CellCompositor::new(&regions, &baseline, scorer, config.merge.candidate_count);
    let merge_total = merge_frames.len();
    let merged = composite_frames(
        &mut *source,
        &plan,
        output_size,
        &merge_frames,
        &analysis.metrics,
        compositor,
        config.sampling.progress_interval,
        |done| tracker.merge(done, merge_total),
    )?;
    reporter.finish_stage();

    // Fallback fill
    reporter.begin_stage(PipelineStage::FallbackFill);
    let mut composite = merged.composite;
    let filled_pixels = {
        let mut cache = FrameCache::new(&mut *source, plan, output_size);
        fill_unresolved(
            &mut cache,
            &mut composite,
            &baseline,
            &regions,
            &merged.cells,
            config.thresholds.pixel_delta,
        )?
    };
    reporter.finish_stage();

    // Sharpen
    reporter.begin_stage(PipelineStage::Sharpening);
    let strength = config.sharpening.strength;
    let sharpened = strength > 0.0 && output_size.width >= 3 && output_size.height >= 3;
    let composite = sharpen(&composite, strength);
    reporter.finish_stage();

    // Encode
    reporter.begin_stage(PipelineStage::Encoding);
    let image = encode_png(&composite)?;
    info!(
        width = image.width,
        height = image.height,
        bytes = image.bytes.len(),
        "Composite encoded"
    );
    reporter.finish_stage();
    tracker.complete();

    let report = PipelineReport {
        frame_count: plan.frame_count,
        output_size,
        active_range,
        range_tier,
        merge_frames,
        merge_tier,
        cells: merged.cells.iter().map(CellSummary::from).collect(),
        filled_pixels,
        sharpened,
    };

    Ok(PipelineOutput {
        image,
        composite,
        report,
    })
}
