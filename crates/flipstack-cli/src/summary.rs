use std::path::Path;

use console::Style;
use flipstack_core::pipeline::config::PipelineConfig;
use flipstack_core::pipeline::PipelineReport;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_pipeline_summary(config: &PipelineConfig, input: &Path, output: &Path) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Flipstack"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(9)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output.display())
    );
    println!();

    println!("  {}", s.header.apply_to("Sampling"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Rate"),
        s.value.apply_to(format!("{} fps", config.sampling.fps))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Scale"),
        s.value.apply_to(format!(
            "{:.0}% output, {:.0}% analysis",
            config.sampling.output_scale * 100.0,
            config.sampling.analysis_scale * 100.0
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Thresholds"),
        s.value.apply_to(&config.thresholds)
    );
    println!();

    println!("  {}", s.header.apply_to("Grid"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Cells"),
        s.value
            .apply_to(format!("{} x {}", config.grid.rows, config.grid.cols))
    );
    match config.grid.layout {
        Some(ref layout) if layout.is_valid(config.grid.rows, config.grid.cols) => println!(
            "    {:<12}{}",
            s.label.apply_to("Layout"),
            s.method.apply_to(format!(
                "cards {:.0}% x {:.0}% from ({:.0}%, {:.0}%)",
                layout.card_width * 100.0,
                layout.card_height * 100.0,
                layout.left * 100.0,
                layout.top * 100.0
            ))
        ),
        Some(_) => println!(
            "    {:<12}{}",
            s.label.apply_to("Layout"),
            s.disabled.apply_to("invalid, falling back to uniform")
        ),
        None => println!(
            "    {:<12}{}",
            s.label.apply_to("Layout"),
            s.method.apply_to("uniform")
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Sharpening"));
    if config.sharpening.strength > 0.0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Strength"),
            s.value.apply_to(config.sharpening.strength)
        );
    } else {
        println!("    {}", s.disabled.apply_to("disabled"));
    }
    println!();
}

pub fn print_report(report: &PipelineReport) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(report.frame_count)
    );
    println!(
        "    {:<14}{} {}",
        s.label.apply_to("Active range"),
        s.value.apply_to(report.active_range),
        s.method.apply_to(format!("[{}]", report.range_tier))
    );
    println!(
        "    {:<14}{} {}",
        s.label.apply_to("Merged"),
        s.value.apply_to(report.merge_frames.len()),
        s.method.apply_to(format!("[{}]", report.merge_tier))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Resolved"),
        s.value
            .apply_to(format!("{}/{}", report.resolved_cells(), report.cells.len()))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Filled px"),
        s.value.apply_to(report.filled_pixels)
    );
    println!();

    for (i, cell) in report.cells.iter().enumerate() {
        match (cell.best_frame, cell.best_score) {
            (Some(frame), Some(score)) => {
                let others: Vec<String> = cell
                    .candidates
                    .iter()
                    .skip(1)
                    .map(|c| format!("{}:{:.3}", c.frame_index, c.score))
                    .collect();
                println!(
                    "    {:<6}{} {}",
                    s.label.apply_to(format!("#{i}")),
                    s.value.apply_to(format!("frame {frame} ({score:.3})")),
                    s.label.apply_to(others.join(" "))
                );
            }
            _ => println!(
                "    {:<6}{}",
                s.label.apply_to(format!("#{i}")),
                s.disabled.apply_to("unresolved")
            ),
        }
    }
}
